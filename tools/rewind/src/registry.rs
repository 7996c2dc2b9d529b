//! Type registry: reconstructs typed actions from their canonical form.

use crate::action::{Action, StandardAction, StandardActionConvertible};
use crate::errors::RewindError;
use std::collections::HashMap;
use std::fmt;

pub type ActionDecoder = fn(&StandardAction) -> Result<Box<dyn Action>, RewindError>;

/// Type tag to decoder table. Several maps are merged into one registry.
pub type TypeMap = HashMap<String, ActionDecoder>;

fn decode_typed<T: StandardActionConvertible>(
    action: &StandardAction,
) -> Result<Box<dyn Action>, RewindError> {
    T::from_standard_action(action).map(|typed| Box::new(typed) as Box<dyn Action>)
}

/// Decoder entry for `T`, for building a [`TypeMap`] by hand.
pub fn decoder_for<T: StandardActionConvertible>() -> ActionDecoder {
    decode_typed::<T>
}

#[derive(Clone, Default)]
pub struct TypeRegistry {
    decoders: TypeMap,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `maps` in order; a later map wins when tags collide.
    pub fn from_maps(maps: impl IntoIterator<Item = TypeMap>) -> Self {
        let mut registry = Self::new();
        for map in maps {
            registry.decoders.extend(map);
        }
        registry
    }

    pub fn register(&mut self, type_tag: impl Into<String>, decoder: ActionDecoder) {
        self.decoders.insert(type_tag.into(), decoder);
    }

    pub fn register_typed<T: StandardActionConvertible>(&mut self, type_tag: impl Into<String>) {
        self.register(type_tag, decoder_for::<T>());
    }

    pub fn merge(&mut self, other: TypeRegistry) {
        self.decoders.extend(other.decoders);
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.decoders.contains_key(type_tag)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Untyped actions come back as themselves. A typed action without a
    /// registered decoder is a configuration error and is never dropped.
    pub fn decode(&self, action: &StandardAction) -> Result<Box<dyn Action>, RewindError> {
        if !action.is_typed_action {
            return Ok(Box::new(action.clone()));
        }
        let decoder = self
            .decoders
            .get(&action.action_type)
            .ok_or_else(|| RewindError::UnregisteredActionType(action.action_type.clone()))?;
        decoder(action)
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags = self.decoders.keys().collect::<Vec<_>>();
        tags.sort();
        f.debug_struct("TypeRegistry").field("tags", &tags).finish()
    }
}
