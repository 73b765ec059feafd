//! Prompt resolution: one inbound message against one pending prompt.
//!
//! Choice matching is case- and accent-insensitive; the domain language
//! is polytonic Greek and users routinely omit accents, so "Ναι", "ναι"
//! and "ναί" must all hit the same choice. Date mode parses a day/month
//! pattern with no year. Invalid input never advances the dialog; the
//! caller re-sends the retry prompt and waits again.

use chrono::{Datelike, NaiveDate};
use frontis_types::prompt::{Choice, PromptKind, PromptRequest, PromptResult};

/// Validate `input` against a pending prompt.
///
/// `None` means the input is invalid and the retry loop stays active.
pub fn resolve(request: &PromptRequest, input: &str, today: NaiveDate) -> Option<PromptResult> {
    match &request.kind {
        PromptKind::Choice { choices } => match_choice(choices, input),
        PromptKind::DayMonth { .. } => {
            parse_day_month(input, today).map(|date| PromptResult::Date { date })
        }
    }
}

/// First exact match over labels and synonyms wins, reported with the
/// choice's original index.
fn match_choice(choices: &[Choice], input: &str) -> Option<PromptResult> {
    let needle = fold(input.trim());
    if needle.is_empty() {
        return None;
    }
    for (index, choice) in choices.iter().enumerate() {
        let hit = fold(&choice.label) == needle
            || choice.synonyms.iter().any(|s| fold(s) == needle);
        if hit {
            return Some(PromptResult::Choice {
                index,
                label: choice.label.clone(),
            });
        }
    }
    None
}

/// Lowercase and strip diacritics.
///
/// Greek tonos/dialytika and the common Latin accents are folded away;
/// final sigma maps to sigma so "εργασίες"/"ΕΡΓΑΣΙΕΣ" compare equal.
/// The domain alphabet is small enough that a char table covers it; no
/// Unicode normalization crate needed.
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'ά' => 'α',
            'έ' => 'ε',
            'ή' => 'η',
            'ί' | 'ϊ' | 'ΐ' => 'ι',
            'ό' => 'ο',
            'ύ' | 'ϋ' | 'ΰ' => 'υ',
            'ώ' => 'ω',
            'ς' => 'σ',
            'á' | 'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Parse `d/m` (also `d-m`, `d.m`), resolving against the current year.
fn parse_day_month(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ['/', '-', '.']);
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(today.year(), month, day)
}
