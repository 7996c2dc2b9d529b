//! The base reducer-driven state container.

use crate::action::{Action, StoreInit};
use std::fmt;

/// Pure reduction. `state` is `None` only while deriving the initial state.
pub type Reducer<S> = Box<dyn Fn(&dyn Action, Option<&S>) -> S>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<S> = Box<dyn FnMut(&S)>;

pub struct Store<S> {
    reducer: Reducer<S>,
    state: S,
    subscribers: Vec<(SubscriptionId, Subscriber<S>)>,
    next_subscription: u64,
}

impl<S> Store<S> {
    /// Without an explicit `state`, the initial state is `reducer(&StoreInit, None)`.
    pub fn new(reducer: impl Fn(&dyn Action, Option<&S>) -> S + 'static, state: Option<S>) -> Self {
        let reducer: Reducer<S> = Box::new(reducer);
        let state = match state {
            Some(state) => state,
            None => reducer(&StoreInit, None),
        };
        Self {
            reducer,
            state,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn dispatch(&mut self, action: &dyn Action) {
        let next = (self.reducer)(action, Some(&self.state));
        self.set_state(next);
    }

    /// Replace the current state without reducing, then notify subscribers.
    pub fn set_state(&mut self, state: S) {
        self.state = state;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.state);
        }
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&S) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
