// src/analyze/parse.rs
//! Recovery of JSON objects from untrusted oracle text.
//!
//! Order: strict parse of the whole text, then the span from the first `{` to the
//! last `}`. Callers substitute a fixed default when both fail.

use serde_json::Value;

use crate::error::ParseError;

/// Parse `text` into a JSON object using the two-tier policy.
pub fn parse_json_object(text: &str) -> Result<Value, ParseError> {
    if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(text.trim()) {
        return Ok(v);
    }

    let span = extract_json_span(text).ok_or(ParseError::NoJsonSpan)?;
    match serde_json::from_str::<Value>(span) {
        Ok(v @ Value::Object(_)) => Ok(v),
        Ok(_) => Err(ParseError::NotAnObject),
        Err(e) => Err(ParseError::Malformed(e.to_string())),
    }
}

/// Slice from the first `{` to the last `}` inclusive, if both exist in that order.
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Parse and convert, reporting the first failure.
pub fn parse_with<T>(
    text: &str,
    convert: impl FnOnce(&Value) -> Result<T, ParseError>,
) -> Result<T, ParseError> {
    let value = parse_json_object(text)?;
    convert(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_parses() {
        let v = parse_json_object(r#"{"cta":{"observations":["ok"]}}"#).unwrap();
        assert_eq!(v["cta"]["observations"][0], "ok");
    }

    #[test]
    fn json_embedded_in_prose_is_recovered() {
        let text = r#"Sure! {"cta":{"observations":["ok"]},"visual_hierarchy":{"observations":[]}} Hope this helps."#;
        let v = parse_json_object(text).unwrap();
        assert_eq!(v["cta"]["observations"][0], "ok");
        assert!(v["visual_hierarchy"]["observations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn markdown_fenced_json_is_recovered() {
        let text = "```json\n{\"cta\": {\"observations\": [\"fenced\"]}}\n```";
        let v = parse_json_object(text).unwrap();
        assert_eq!(v["cta"]["observations"][0], "fenced");
    }

    #[test]
    fn plain_prose_has_no_span() {
        assert_eq!(
            parse_json_object("I cannot analyze this page.").unwrap_err(),
            ParseError::NoJsonSpan
        );
        assert_eq!(parse_json_object("} backwards {").unwrap_err(), ParseError::NoJsonSpan);
    }

    #[test]
    fn broken_span_is_malformed() {
        let err = parse_json_object("Here: {\"cta\": [unquoted]}").unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn top_level_array_is_not_an_object() {
        assert_eq!(
            parse_json_object("[1, 2, 3]").unwrap_err(),
            ParseError::NoJsonSpan
        );
        assert!(matches!(
            parse_json_object("[{\"a\": 1}, {\"b\": 2}]").unwrap_err(),
            ParseError::Malformed(_)
        ));
    }
}
