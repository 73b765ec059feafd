//! Serializable dialog state: frames, the property bag, and the full
//! per-conversation document.
//!
//! Suspension is modeled as plain data rather than coroutines: a frame's
//! dialog id, step index, begin-time options and pending prompt are the
//! complete resumable state of one active dialog, so a conversation can
//! be picked up after minutes or days (and across process restarts) by
//! reloading this document from the state store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use std::fmt;

use crate::prompt::PromptRequest;

/// Names one waterfall definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogId(pub String);

impl DialogId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DialogId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// One entry on the dialog stack: an active (possibly suspended) dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogFrame {
    /// Which waterfall definition this frame runs.
    pub dialog: DialogId,
    /// Index of the next step to run. Monotonic until the frame is
    /// replaced; never decremented.
    pub step: usize,
    /// Options passed in when the frame was pushed.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,
    /// The prompt this frame is suspended on, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PromptRequest>,
}

impl DialogFrame {
    /// A fresh frame at step zero with no pending prompt.
    pub fn new(dialog: DialogId, options: Value) -> Self {
        Self {
            dialog,
            step: 0,
            options,
            pending: None,
        }
    }
}

/// Named, typed slots persisted across turns of one conversation.
///
/// Values are stored as JSON so the bag survives serialization of the
/// whole conversation state. A slot set by one step can be read by later
/// steps, possibly across dialog boundaries; the owning dialog deletes
/// its slots when it ends so stale values cannot leak into a different
/// flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(Map<String, Value>);

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a slot, deserializing it into `T`. Returns `None` when the
    /// slot is absent or holds a value of a different shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Write a slot, overwriting any previous value.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.0.insert(key.to_string(), value);
        Ok(())
    }

    /// Delete a slot. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The complete resumable state of one conversation.
///
/// Loaded at turn start, mutated in memory while the turn runs, and
/// written back once at turn end. A turn that aborts mid-way leaves the
/// previously persisted document untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Active dialogs, bottom of the stack first.
    #[serde(default)]
    pub stack: Vec<DialogFrame>,
    /// Persisted properties shared by the stacked dialogs.
    #[serde(default)]
    pub properties: PropertyBag,
}

impl ConversationState {
    /// Whether the conversation is idle (no active dialog).
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty()
    }
}
