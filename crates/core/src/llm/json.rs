use crate::domain::contract::LlmStockAnalysis;
use crate::llm::error::AnalysisError;
use serde_json::Value;

/// Slice from the first `{` to the last `}` inclusive.
///
/// Only a missing brace is `MalformedResponse`. When the last `}` comes before the first `{` the
/// span between them is returned as-is and fails later as invalid JSON.
pub fn extract_json(text: &str) -> Result<&str, AnalysisError> {
    let malformed = || AnalysisError::MalformedResponse {
        raw_output: text.to_string(),
    };
    let start = text.find('{').ok_or_else(malformed)?;
    let end = text.rfind('}').ok_or_else(malformed)?;
    if end < start {
        return Ok(&text[end..=start]);
    }
    Ok(&text[start..=end])
}

/// Removes a surrounding Markdown fence (```json ... ``` or ``` ... ```), if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = match rest.split_once('\n') {
        Some((_lang, body)) => body,
        None => rest,
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Recovers the JSON object from a free-form model answer.
///
/// A strict parse of the whole answer is tried first, so braces inside string values of a clean
/// answer cannot confuse the delimiter scan. Only when that fails does the first-`{`/last-`}` slice
/// get parsed; a syntax error there is a `ParseError`.
pub fn parse_object(text: &str) -> Result<Value, AnalysisError> {
    if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(strip_code_fence(text)) {
        return Ok(v);
    }

    let slice = extract_json(text)?;
    let value = serde_json::from_str::<Value>(slice).map_err(|source| AnalysisError::ParseError {
        source,
        raw_output: text.to_string(),
    })?;

    match value {
        Value::Object(_) => Ok(value),
        _ => Err(AnalysisError::InvalidShape {
            detail: "top-level JSON value is not an object".to_string(),
        }),
    }
}

pub fn parse_payload(text: &str) -> Result<LlmStockAnalysis, AnalysisError> {
    let value = parse_object(text)?;
    serde_json::from_value::<LlmStockAnalysis>(value).map_err(|e| AnalysisError::InvalidShape {
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::error::AnalysisErrorKind;

    #[test]
    fn extract_json_slices_between_outer_braces() {
        let s = "Here is the result: {\"a\":1} Thanks!";
        assert_eq!(extract_json(s).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn extract_json_requires_both_braces() {
        for s in ["no json here", "only { open", "only } close"] {
            let err = extract_json(s).unwrap_err();
            assert_eq!(err.kind(), AnalysisErrorKind::MalformedResponse, "{s}");
        }
    }

    #[test]
    fn parse_object_prefers_strict_parse() {
        let clean = r#"{"note": "curly } inside a string"}"#;
        let v = parse_object(clean).unwrap();
        assert_eq!(v["note"], "curly } inside a string");
    }

    #[test]
    fn parse_object_handles_fenced_blocks() {
        let fenced = "```json\n{\"a\":1}\n```\n";
        assert_eq!(parse_object(fenced).unwrap()["a"], 1);
    }

    #[test]
    fn parse_object_falls_back_to_braces() {
        let s = "Sure! {\"a\": {\"b\": 2}} Hope this helps.";
        assert_eq!(parse_object(s).unwrap()["a"]["b"], 2);
    }

    #[test]
    fn invalid_json_between_braces_is_a_parse_error() {
        let err = parse_object("result: {\"a\": 1,} done").unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::ParseError);
        assert!(err.raw_output().unwrap().contains("result:"));
    }

    #[test]
    fn closing_brace_before_opening_is_a_parse_error() {
        let s = "Sorry } I cannot { comply";
        assert_eq!(extract_json(s).unwrap(), "} I cannot {");

        let err = parse_object(s).unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::ParseError);
        assert_eq!(err.raw_output(), Some(s));
    }

    #[test]
    fn no_braces_is_malformed_even_if_text_is_json() {
        let err = parse_object("42").unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::MalformedResponse);
    }

    #[test]
    fn missing_keys_are_a_shape_error() {
        let err = parse_payload("{\"recommendation\": \"GOOGL\"}").unwrap_err();
        assert_eq!(err.kind(), AnalysisErrorKind::InvalidShape);
    }
}
