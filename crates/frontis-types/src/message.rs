//! Outbound message variants handed to the transport.
//!
//! The engine may emit several messages in one turn (a typing indicator,
//! then one card per homework item, then a prompt). Rendering is the
//! transport's concern; a card is structured data here, not markup.

use serde::{Deserialize, Serialize};

/// One outbound message produced during a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Typing indicator, sent before slow or multi-part replies.
    Typing,
    /// Plain text.
    Text { text: String },
    /// Text accompanied by quick-reply suggestions.
    SuggestedActions { text: String, actions: Vec<String> },
    /// One homework assignment, rendered by the transport as a card.
    HomeworkCard { card: HomeworkCard },
}

impl Outbound {
    pub fn text(text: impl Into<String>) -> Self {
        Outbound::Text { text: text.into() }
    }
}

/// Structured contents of a homework card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeworkCard {
    pub exercise: String,
    pub book: String,
    pub page: u32,
    /// Present only for past lectures; "-" when no grade is recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    pub notes: String,
}
