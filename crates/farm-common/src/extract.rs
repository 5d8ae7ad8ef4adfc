/// Recovery of a JSON payload from free-form model output.
///
/// Models answer in one of three shapes: a fenced ```json block surrounded by prose,
/// a bare object embedded in prose, or the bare object alone. Matching order:
/// - first fenced block whose body is a `{...}` span; the body ends at the first `}`
///   followed by a closing fence, so later fences are never swallowed
/// - otherwise the first `{` through the last `}` in the text
///
/// The brace match is best-effort, not a balancer: text holding two separate objects
/// (`{..} and then {..}`) yields one span covering both, which fails to parse.
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::ExtractionError;

static FENCED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid regex"));
static BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// Extract the JSON payload from `text`.
///
/// When `envelope_key` is given and the parsed root is an object holding that key, the
/// value under the key is returned. Otherwise the root is returned as-is, so callers
/// accept enveloped and bare payloads alike.
pub fn extract(text: &str, envelope_key: Option<&str>) -> Result<Value, ExtractionError> {
    let candidate = find_candidate(text).ok_or(ExtractionError::NoJsonFound)?;

    let mut value: Value = serde_json::from_str(candidate)
        .map_err(|e| ExtractionError::InvalidJson(e.to_string()))?;

    if let Some(key) = envelope_key {
        if let Some(inner) = value.as_object_mut().and_then(|map| map.remove(key)) {
            debug!(envelope_key = key, "unwrapped enveloped payload");
            return Ok(inner);
        }
    }

    Ok(value)
}

/// Extract and deserialize into `T`. A payload that parses but does not fit `T` is
/// reported as `InvalidJson`.
pub fn extract_as<T: DeserializeOwned>(
    text: &str,
    envelope_key: Option<&str>,
) -> Result<T, ExtractionError> {
    let value = extract(text, envelope_key)?;
    serde_json::from_value(value).map_err(|e| ExtractionError::InvalidJson(e.to_string()))
}

fn find_candidate(text: &str) -> Option<&str> {
    if let Some(caps) = FENCED_RE.captures(text) {
        if let Some(body) = caps.get(1) {
            debug!(len = body.len(), "matched fenced JSON block");
            return Some(body.as_str());
        }
    }

    BARE_RE.find(text).map(|m| {
        debug!(start = m.start(), len = m.len(), "matched bare JSON span");
        m.as_str()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_block_ignores_surrounding_prose() {
        let text = "Here are my thoughts {not json}.\n```json\n{\"name\": \"Maize\", \"suitability\": 90}\n```\nHope this helps!";
        let value = extract(text, None).unwrap();
        assert_eq!(value, json!({"name": "Maize", "suitability": 90}));
    }

    #[test]
    fn fence_without_language_tag() {
        let text = "```\n{\"ok\": true}\n```";
        assert_eq!(extract(text, None).unwrap(), json!({"ok": true}));
    }

    #[test]
    fn fenced_block_keeps_nested_objects() {
        let text = "```json\n{\"pest\": {\"name\": \"Aphids\"}, \"crops\": [{\"name\": \"Tomato\"}]}\n```";
        let value = extract(text, None).unwrap();
        assert_eq!(value["pest"]["name"], "Aphids");
        assert_eq!(value["crops"][0]["name"], "Tomato");
    }

    #[test]
    fn first_of_several_fences_wins() {
        let text = "Example shape:\n```json\n{\"name\": \"Maize\"}\n```\nAlternative:\n```json\n{\"name\": \"Cassava\"}\n```";
        assert_eq!(extract(text, None).unwrap(), json!({"name": "Maize"}));
    }

    #[test]
    fn bare_object_in_prose() {
        let text = "Sure! {\"answer\": 42} is the result.";
        assert_eq!(extract(text, None).unwrap(), json!({"answer": 42}));
    }

    #[test]
    fn no_braces_is_no_json_found() {
        let err = extract("I could not find any crops for that region.", None).unwrap_err();
        assert_eq!(err, ExtractionError::NoJsonFound);
    }

    #[test]
    fn empty_text_is_no_json_found() {
        assert_eq!(extract("", None).unwrap_err(), ExtractionError::NoJsonFound);
    }

    #[test]
    fn invalid_brace_span_is_invalid_json() {
        let err = extract("result: {name: Maize, suitability: high}", None).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidJson(_)));
    }

    #[test]
    fn two_separate_objects_fail_as_invalid_json() {
        let err = extract("first {\"a\": 1} then {\"b\": 2}", None).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidJson(_)));
    }

    #[test]
    fn envelope_key_unwraps_payload() {
        let text = r#"{"recommendations":[{"name":"Maize"}]}"#;
        let value = extract(text, Some("recommendations")).unwrap();
        assert_eq!(value, json!([{"name": "Maize"}]));
    }

    #[test]
    fn missing_envelope_key_returns_root() {
        let text = r#"{"name":"Maize","suitability":90}"#;
        let value = extract(text, Some("recommendations")).unwrap();
        assert_eq!(value, json!({"name": "Maize", "suitability": 90}));
    }

    #[test]
    fn extract_as_reports_shape_mismatch_as_invalid_json() {
        #[derive(Debug, serde::Deserialize)]
        struct Crop {
            #[allow(dead_code)]
            name: String,
        }

        let err = extract_as::<Vec<Crop>>(r#"{"name": 5}"#, None).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidJson(_)));

        let crops: Vec<Crop> =
            extract_as(r#"{"recommendations":[{"name":"Yam"}]}"#, Some("recommendations")).unwrap();
        assert_eq!(crops.len(), 1);
    }
}
