use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::ops::Range;

/// ```json ... ``` fenced block; the tag is matched case-insensitively
static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?si)```json\b(.*?)```").expect("valid fence regex"));

/// Where the structured span was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSource {
    Fenced,
    Braces,
}

/// Locate the structured span in model output as a byte range of `text`.
///
/// The last tagged fence wins (range covers the trimmed body). Without any
/// tagged fence, fall back to the span from the first `{` to the last `}`.
pub fn locate_structured_block(text: &str) -> Option<(BlockSource, Range<usize>)> {
    if let Some(caps) = JSON_FENCE.captures_iter(text).last() {
        let body = caps.get(1)?;
        let raw = body.as_str();
        let start = body.start() + (raw.len() - raw.trim_start().len());
        return Some((BlockSource::Fenced, start..start + raw.trim().len()));
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some((BlockSource::Braces, start..end + 1))
}

/// Same as [`locate_structured_block`], returning the span itself
pub fn extract_structured_block(text: &str) -> Option<(BlockSource, &str)> {
    locate_structured_block(text).map(|(source, range)| (source, &text[range]))
}

/// Decode the structured span as a JSON object.
///
/// Syntax errors and non-object payloads yield `None`; the caller falls
/// back to defaults field by field.
pub fn parse_structured(text: &str) -> Option<Map<String, Value>> {
    let (source, block) = extract_structured_block(text)?;

    match serde_json::from_str::<Value>(block) {
        Ok(Value::Object(map)) => {
            tracing::debug!("Decoded structured block ({:?}, {} keys)", source, map.len());
            Some(map)
        }
        Ok(other) => {
            tracing::warn!(
                "Structured block ({:?}) is not an object: {}",
                source,
                json_kind(&other)
            );
            None
        }
        Err(e) => {
            tracing::warn!("Failed to parse prediction JSON ({:?}): {}", source, e);
            None
        }
    }
}

/// Prose left once structured data is taken out.
///
/// Every tagged fence is removed. Without fences, a brace span is removed
/// only when it decodes as an object; otherwise the text is kept whole.
pub fn strip_structured_blocks(text: &str) -> String {
    match locate_structured_block(text) {
        Some((BlockSource::Braces, range)) if is_object(&text[range.clone()]) => {
            format!("{}{}", &text[..range.start], &text[range.end..])
        }
        _ => JSON_FENCE.replace_all(text, "").into_owned(),
    }
}

fn is_object(block: &str) -> bool {
    matches!(serde_json::from_str::<Value>(block), Ok(Value::Object(_)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_fenced_block_wins() {
        let text = "Draft:\n```json\n{\"matchName\":\"X\"}\n```\nFinal:\n```json\n{\"matchName\":\"Y\"}\n```";

        let parsed = parse_structured(text).unwrap();
        assert_eq!(parsed["matchName"], "Y");
    }

    #[test]
    fn test_fence_without_trailing_newline() {
        let text = "Analysis\n```JSON {\"confidence\": 71}```";

        let (source, block) = extract_structured_block(text).unwrap();
        assert_eq!(source, BlockSource::Fenced);
        assert_eq!(block, "{\"confidence\": 71}");
    }

    #[test]
    fn test_untagged_fence_is_not_structured() {
        let text = "```\nnot data\n```";
        assert!(extract_structured_block(text).is_none());
    }

    #[test]
    fn test_brace_fallback_spans_first_to_last() {
        let text = "The model said {\"matchName\": \"A vs B\", \"confidence\": 64} and nothing else.";

        let (source, block) = extract_structured_block(text).unwrap();
        assert_eq!(source, BlockSource::Braces);
        assert_eq!(block, "{\"matchName\": \"A vs B\", \"confidence\": 64}");
        assert_eq!(parse_structured(text).unwrap()["confidence"], 64);
    }

    #[test]
    fn test_brace_fallback_with_trailing_braces_is_swallowed() {
        // prose JSON followed by unrelated braces produces an undecodable span
        let text = "{\"matchName\": \"A vs B\"} then later {oops}";
        assert!(parse_structured(text).is_none());
    }

    #[test]
    fn test_fenced_block_takes_precedence_over_braces() {
        let text = "{\"matchName\": \"prose\"}\n```json\n{\"matchName\": \"fenced\"}\n```\n{ignored}";
        assert_eq!(parse_structured(text).unwrap()["matchName"], "fenced");
    }

    #[test]
    fn test_malformed_block_is_swallowed() {
        let text = "```json\n{\"matchName\": \"A vs B\",,}\n```";
        assert!(parse_structured(text).is_none());
    }

    #[test]
    fn test_non_object_payload_is_none() {
        assert!(parse_structured("```json\n[1, 2, 3]\n```").is_none());
    }

    #[test]
    fn test_no_structure_at_all() {
        assert!(parse_structured("").is_none());
        assert!(parse_structured("Just prose } with { reversed braces").is_none());
    }

    #[test]
    fn test_parsing_is_repeatable() {
        let text = "intro\n```json\n{\"matchName\":\"A\",\"confidence\":55}\n```";
        assert_eq!(parse_structured(text), parse_structured(text));
    }

    #[test]
    fn test_strip_structured_blocks() {
        let text = "Form looks strong.\n```json\n{\"a\":1}\n```\nMore prose.\n```json\n{\"b\":2}\n```";
        assert_eq!(
            strip_structured_blocks(text),
            "Form looks strong.\n\nMore prose.\n"
        );
    }

    #[test]
    fn test_strip_decoded_brace_span() {
        let text = "Hosts look strong. {\"matchName\":\"A vs B\",\"confidence\":70} Back them.";
        assert_eq!(strip_structured_blocks(text), "Hosts look strong.  Back them.");
    }

    #[test]
    fn test_strip_keeps_undecodable_braces() {
        let text = "Set pieces {corners, free kicks} decide this one.";
        assert_eq!(strip_structured_blocks(text), text);
    }

    #[test]
    fn test_fenced_range_covers_trimmed_body() {
        let text = "x\n```json\n  {\"a\":1}  \n```";
        let (source, range) = locate_structured_block(text).unwrap();
        assert_eq!(source, BlockSource::Fenced);
        assert_eq!(&text[range], "{\"a\":1}");
    }
}
