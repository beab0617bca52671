//! Structured extraction of a JSON object from free-form model output.
//!
//! Model replies wrap JSON in prose, markdown fences, or nothing at all, so
//! extraction runs an explicit ordered list of strategies and reports which
//! one succeeded. The caller owns the final fallback.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which extraction strategy produced the object.
pub enum ExtractionStrategy {
    /// A ```json fenced code block.
    FencedBlock,
    /// The slice from the first `{` to the last `}`.
    BraceSlice,
    /// The whole reply parsed as JSON.
    WholeText,
}

/// Tries each strategy in order and returns the first JSON *object* found.
pub fn extract_json_object(text: &str) -> Option<(Value, ExtractionStrategy)> {
    if let Some(candidate) = fenced_block(text) {
        if let Some(value) = parse_object(candidate) {
            return Some((value, ExtractionStrategy::FencedBlock));
        }
    }
    if let Some(candidate) = brace_slice(text) {
        if let Some(value) = parse_object(candidate) {
            return Some((value, ExtractionStrategy::BraceSlice));
        }
    }
    parse_object(text).map(|value| (value, ExtractionStrategy::WholeText))
}

fn parse_object(candidate: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(candidate.trim()).ok()?;
    if value.is_object() {
        Some(value)
    } else {
        None
    }
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(&rest[..end])
}

fn brace_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
