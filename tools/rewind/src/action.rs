//! Actions and their canonical, type-erased form.
//!
//! Any value dispatched to a store is an [`Action`]. Actions that can describe
//! themselves as a [`StandardAction`] are recordable; everything else is still
//! reduced but never reaches the recording.

use crate::errors::RewindError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt::Debug;

/// Marker written in place of an absent payload so the key is always present.
pub const NULL_PAYLOAD_SENTINEL: &str = "ReSwift_Null";

pub type Payload = Map<String, Value>;

pub trait Action: Any + Debug {
    /// Canonical form of this action, or `None` when it cannot be recorded.
    fn to_standard_action(&self) -> Option<StandardAction> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn Action {
    pub fn downcast_ref<T: Action>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Action>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Typed actions that round-trip through [`StandardAction`].
///
/// The produced `StandardAction` should carry `is_typed_action = true` and a
/// type tag that is registered with a [`crate::registry::TypeRegistry`].
pub trait StandardActionConvertible: Action + Sized {
    fn from_standard_action(action: &StandardAction) -> Result<Self, RewindError>;

    fn standard_action(&self) -> StandardAction;
}

/// Dispatched by the base store when it has to derive its own initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreInit;

impl Action for StoreInit {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A type-tagged, JSON-compatible action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "StandardActionRecord", from = "StandardActionRecord")]
pub struct StandardAction {
    pub action_type: String,
    pub payload: Option<Payload>,
    pub is_typed_action: bool,
}

impl StandardAction {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: None,
            is_typed_action: false,
        }
    }

    pub fn typed(action_type: impl Into<String>, payload: Option<Payload>) -> Self {
        Self {
            action_type: action_type.into(),
            payload,
            is_typed_action: true,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn payload_value(&self, key: &str) -> Option<&Value> {
        self.payload.as_ref().and_then(|payload| payload.get(key))
    }

    /// JSON object with `type`, `payload` and `isTypedAction` always present.
    pub fn dictionary_representation(&self) -> Result<Value, RewindError> {
        serde_json::to_value(self).map_err(|e| RewindError::Serialization(e.to_string()))
    }

    /// Returns `None` when `type` or `isTypedAction` is missing or mistyped.
    pub fn from_dictionary(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}

impl Action for StandardAction {
    fn to_standard_action(&self) -> Option<StandardAction> {
        Some(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StandardActionRecord {
    #[serde(rename = "type")]
    action_type: String,
    #[serde(default)]
    payload: Value,
    #[serde(rename = "isTypedAction")]
    is_typed_action: bool,
}

impl From<StandardAction> for StandardActionRecord {
    fn from(action: StandardAction) -> Self {
        Self {
            action_type: action.action_type,
            payload: action
                .payload
                .map(Value::Object)
                .unwrap_or_else(|| Value::String(NULL_PAYLOAD_SENTINEL.to_string())),
            is_typed_action: action.is_typed_action,
        }
    }
}

impl From<StandardActionRecord> for StandardAction {
    fn from(record: StandardActionRecord) -> Self {
        Self {
            action_type: record.action_type,
            payload: decode_payload(&record.payload),
            is_typed_action: record.is_typed_action,
        }
    }
}

// Anything other than an object, the sentinel included, is an absent payload.
fn decode_payload(value: &Value) -> Option<Payload> {
    match value {
        Value::Object(map) => Some(map.clone()),
        _ => None,
    }
}

/// Canonical form of `action`, if it has one.
pub fn convert_to_standard_action(action: &dyn Action) -> Option<StandardAction> {
    action.to_standard_action()
}
