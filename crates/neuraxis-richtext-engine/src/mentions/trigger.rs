use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Range, Schema, Value};
use crate::query::{Unit, point_after, point_before, range_between, text_of};

/// An `@word` typed right before a collapsed cursor that sits on a token
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Covers the `@` and the word.
    pub target: Range,
    pub query: String,
}

pub fn detect_trigger(value: &Value, schema: &Schema) -> Option<Trigger> {
    static BEFORE: OnceLock<Regex> = OnceLock::new();
    static AFTER: OnceLock<Regex> = OnceLock::new();
    let before_regex =
        BEFORE.get_or_init(|| Regex::new(r"^@(\w+)$").expect("Invalid trigger regex"));
    let after_regex =
        AFTER.get_or_init(|| Regex::new(r"^(\s|$)").expect("Invalid boundary regex"));

    let selection = value.selection.as_ref()?;
    if selection.is_expanded() {
        return None;
    }
    let start = &selection.focus;
    let word_before = point_before(value, schema, start, Unit::Word)?;
    let before = point_before(value, schema, &word_before, Unit::Character)?;
    let target = range_between(value, &before, start)?;
    let before_text = text_of(value, &target);
    let query = before_regex.captures(&before_text)?.get(1)?.as_str().to_string();

    let after_text = match point_after(value, schema, start, Unit::Character) {
        Some(after) => range_between(value, start, &after)
            .map(|range| text_of(value, &range))
            .unwrap_or_default(),
        None => String::new(),
    };
    if !after_regex.is_match(&after_text) {
        return None;
    }
    Some(Trigger { target, query })
}
