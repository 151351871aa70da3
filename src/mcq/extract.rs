//! Locating a JSON value inside free-form model output.

use serde_json::Value;

use super::{MalformedResponse, Violation};

/// Parse the JSON value held in `text`.
///
/// Tried in order: the trimmed text as a whole, the span from the first `[`
/// to the last `]`, then the span from the first `{` to the last `}`. The
/// spans are greedy, so two separate arrays in the same text produce one
/// unparseable span and fall through to the next attempt.
pub fn extract_json(text: &str) -> Result<Value, MalformedResponse> {
    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Ok(value);
    }

    if let Some(value) = parse_span(text, '[', ']') {
        return Ok(value);
    }

    if let Some(value) = parse_span(text, '{', '}') {
        return Ok(value);
    }

    Err(MalformedResponse::new(Violation::NoJson, text))
}

fn parse_span(text: &str, open: char, close: char) -> Option<Value> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }

    serde_json::from_str(&text[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_direct_parse_ignores_surrounding_whitespace() {
        let value = extract_json("\n\n  [1, 2, 3]  \t").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_array_inside_fence() {
        let value = extract_json("```json\n[[\"q\", [], 0]]\n```").unwrap();
        assert_eq!(value, json!([["q", [], 0]]));
    }

    #[test]
    fn test_array_preferred_over_object() {
        let value = extract_json("Result: [{\"id\": \"a\"}] done").unwrap();
        assert_eq!(value, json!([{ "id": "a" }]));
    }

    #[test]
    fn test_object_fallback_when_array_span_is_broken() {
        let value = extract_json("see [note] then {\"answer\": 1}").unwrap();
        assert_eq!(value, json!({ "answer": 1 }));
    }

    #[test]
    fn test_brackets_in_wrong_order() {
        let err = extract_json("] nothing here [").unwrap_err();
        assert_eq!(err.violation, Violation::NoJson);
    }

    #[test]
    fn test_greedy_span_spanning_two_arrays_fails() {
        let err = extract_json("first [1, 2] and then [3, 4] later").unwrap_err();
        assert_eq!(err.violation, Violation::NoJson);
        assert_eq!(err.raw, "first [1, 2] and then [3, 4] later");
    }

    #[test]
    fn test_multibyte_prose_around_array() {
        let value = extract_json("Voilà — les questions : [\"é\"] ✓").unwrap();
        assert_eq!(value, json!(["é"]));
    }
}
