//! Prompt request/result contract between the sequencer and the resolver.
//!
//! A `PromptRequest` is left on a suspended dialog frame and survives in
//! the persisted conversation state until the next inbound message. The
//! resolver turns that message into a `PromptResult` or signals a retry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One selectable option of a choice prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
}

impl Choice {
    /// A choice matched only by its label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            synonyms: Vec::new(),
        }
    }

    /// Attach an additional accepted spelling.
    pub fn with_synonym(mut self, synonym: impl Into<String>) -> Self {
        self.synonyms.push(synonym.into());
        self
    }
}

/// What kind of input the prompt is waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptKind {
    /// A closed set of valid choices, matched accent-insensitively.
    Choice { choices: Vec<Choice> },
    /// A free-form day/month date (no year), with suggested recent dates.
    DayMonth { suggestions: Vec<String> },
}

/// A prompt stored against a suspended frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    /// Message sent when the prompt is first issued.
    pub prompt: String,
    /// Message re-sent after each invalid reply.
    pub retry: String,
    #[serde(flatten)]
    pub kind: PromptKind,
}

impl PromptRequest {
    pub fn choice(
        prompt: impl Into<String>,
        retry: impl Into<String>,
        choices: Vec<Choice>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            retry: retry.into(),
            kind: PromptKind::Choice { choices },
        }
    }

    pub fn day_month(
        prompt: impl Into<String>,
        retry: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            retry: retry.into(),
            kind: PromptKind::DayMonth { suggestions },
        }
    }
}

/// A successfully validated prompt reply.
///
/// Serialized into the step input `Value` so that a waterfall step can
/// receive it across the turn boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptResult {
    /// The matched choice with its original index in the choice list.
    Choice { index: usize, label: String },
    /// A day/month input resolved into a concrete date.
    Date { date: NaiveDate },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_request_roundtrips_with_pending_choices() {
        let request = PromptRequest::choice(
            "Ναι ή Όχι;",
            "Παρακαλώ απάντησε με ένα Ναι ή Όχι:",
            vec![
                Choice::new("Ναι"),
                Choice::new("Όχι, ευχαριστώ").with_synonym("Όχι"),
            ],
        );
        let json = serde_json::to_string(&request).unwrap();
        let back: PromptRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn prompt_result_tags_variants() {
        let result = PromptResult::Choice {
            index: 1,
            label: "Όχι, ευχαριστώ".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "choice");
        assert_eq!(json["index"], 1);

        let result = PromptResult::Date {
            date: NaiveDate::from_ymd_opt(2024, 4, 24).unwrap(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "date");
    }
}
