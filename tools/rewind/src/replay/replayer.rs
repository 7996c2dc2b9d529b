//! The recording store: a [`Store`] wrapper that records every dispatch and
//! can rewind to any recorded step.
//!
//! # Dispatch
//!
//! While live (`action_count == 0`) a dispatch reduces state, caches the new
//! state, and, when the action has a canonical form, appends it to the action
//! history and rewrites the persisted log. While a replay is running
//! (`action_count > 0`) external dispatches are returned untouched.
//!
//! # Rewind
//!
//! `replay_to_state(actions, target)` restores a cached snapshot when one
//! exists. Otherwise it restarts from the initial state and re-executes
//! `actions[..target]`, rebuilding the persisted log and filling the snapshot
//! cache on the way.
//!
//! A rewind lasts until the next live dispatch, which first returns to the
//! latest snapshot so the history, the cache and the log keep describing the
//! same sequence.

use crate::action::{convert_to_standard_action, Action};
use crate::errors::RewindError;
use crate::registry::{TypeMap, TypeRegistry};
use crate::replay::recorder::RecordingLog;
use crate::replay::recording::RecordedAction;
use crate::store::{Store, SubscriptionId};

pub struct RecordingStore<S> {
    store: Store<S>,
    initial_state: S,
    action_history: Vec<Box<dyn Action>>,
    // Cache index of the state reached by each history entry.
    history_snapshots: Vec<usize>,
    computed_states: Vec<S>,
    rewound: bool,
    action_count: usize,
    recorded_actions: Vec<RecordedAction>,
    registry: TypeRegistry,
    log: RecordingLog,
}

impl<S: Clone + 'static> RecordingStore<S> {
    /// Build a store, optionally loading and replaying the recording named
    /// `recording` before returning.
    ///
    /// Fails only when a recorded typed action cannot be decoded.
    pub fn new(
        reducer: impl Fn(&dyn Action, Option<&S>) -> S + 'static,
        state: Option<S>,
        type_maps: Vec<TypeMap>,
        recording: Option<&str>,
        log: RecordingLog,
    ) -> Result<Self, RewindError> {
        let store = Store::new(reducer, state);
        let initial_state = store.state().clone();
        let mut recording_store = Self {
            store,
            computed_states: vec![initial_state.clone()],
            initial_state,
            action_history: Vec::new(),
            history_snapshots: Vec::new(),
            rewound: false,
            action_count: 0,
            recorded_actions: Vec::new(),
            registry: TypeRegistry::from_maps(type_maps),
            log,
        };

        if let Some(recording) = recording {
            let history = recording_store.load_actions(recording)?;
            let target = history.len();
            recording_store.replay_to_state(&history, target);
            recording_store.history_snapshots = (1..=target).collect();
            recording_store.action_history = history;
        }

        Ok(recording_store)
    }

    pub fn state(&self) -> &S {
        self.store.state()
    }

    pub fn initial_state(&self) -> &S {
        &self.initial_state
    }

    pub fn action_history(&self) -> &[Box<dyn Action>] {
        &self.action_history
    }

    pub fn computed_states(&self) -> &[S] {
        &self.computed_states
    }

    pub fn recorded_actions(&self) -> &[RecordedAction] {
        &self.recorded_actions
    }

    pub fn is_replaying(&self) -> bool {
        self.action_count > 0
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&S) + 'static) -> SubscriptionId {
        self.store.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Dispatch from outside the store. Ignored while a replay is running.
    pub fn dispatch<A: Action + Clone>(&mut self, action: A) -> A {
        if self.is_replaying() {
            tracing::debug!(?action, "ignoring dispatch during replay");
            return action;
        }

        if self.rewound {
            self.rewound = false;
            if let Some(latest) = self.computed_states.last().cloned() {
                tracing::debug!("returning to latest state before live dispatch");
                self.store.set_state(latest);
            }
        }

        self.store.dispatch(&action);
        self.computed_states.push(self.store.state().clone());

        if self.record_action(&action) {
            self.action_history.push(Box::new(action.clone()));
            self.history_snapshots.push(self.computed_states.len() - 1);
        }

        action
    }

    /// Restore the state after `target` actions.
    ///
    /// A cached snapshot is restored directly. Otherwise the store restarts
    /// from the initial state and re-executes `actions[..target]`; `target`
    /// is clamped to `actions.len()`.
    pub fn replay_to_state(&mut self, actions: &[Box<dyn Action>], target: usize) {
        if target < self.computed_states.len() {
            let snapshot = self.computed_states[target].clone();
            self.rewound = target + 1 < self.computed_states.len();
            self.store.set_state(snapshot);
            return;
        }

        let target = target.min(actions.len());
        tracing::info!(step = target, "rewinding from initial state");
        self.store.set_state(self.initial_state.clone());
        self.recorded_actions.clear();
        self.rewound = false;
        self.action_count = target;

        for (step, action) in actions[..target].iter().enumerate() {
            self.dispatch_recorded(&**action);
            self.action_count -= 1;
            let state = self.store.state().clone();
            match self.computed_states.get_mut(step + 1) {
                Some(slot) => *slot = state,
                None => self.computed_states.push(state),
            }
        }
    }

    /// Rewind to the state after the first `step` entries of this store's own
    /// action history.
    ///
    /// Snapshots left by non-recordable dispatches are skipped over, so
    /// `rewind_to(action_history().len())` lands on the latest recorded step.
    pub fn rewind_to(&mut self, step: usize) -> Result<(), RewindError> {
        let available = self.action_history.len();
        let index = match step {
            0 => Some(0),
            _ => self.history_snapshots.get(step - 1).copied(),
        }
        .filter(|index| *index < self.computed_states.len())
        .ok_or(RewindError::StepOutOfRange { step, available })?;

        let history = std::mem::take(&mut self.action_history);
        self.replay_to_state(&history, index);
        self.action_history = history;
        Ok(())
    }

    fn dispatch_recorded(&mut self, action: &dyn Action) {
        self.store.dispatch(action);
        self.record_action(action);
    }

    /// Append `action` to the persisted log. Returns `false` when it has no
    /// canonical form. Write failures only cost durability.
    fn record_action(&mut self, action: &dyn Action) -> bool {
        let Some(standard_action) = convert_to_standard_action(action) else {
            tracing::warn!(
                ?action,
                "could not record action because it has no standard action form"
            );
            return false;
        };

        self.recorded_actions
            .push(RecordedAction::new(standard_action, self.log.now()));
        if let Err(error) = self.log.store(&self.recorded_actions) {
            tracing::debug!(error = %error, "failed to persist recorded actions");
        }
        true
    }

    fn load_actions(&self, recording: &str) -> Result<Vec<Box<dyn Action>>, RewindError> {
        self.log
            .load(recording)
            .into_iter()
            .map(|entry| self.registry.decode(&entry.action))
            .collect()
    }
}
