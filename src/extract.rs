use std::sync::OnceLock;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::ClassifyError,
    model::DdcRecord
};

// How deep the wrapper walk descends before giving up on a candidate.
const MAX_SEARCH_DEPTH: u32 = 6;

// Longest slice of the raw response echoed back in extraction errors.
const ERROR_PREVIEW_LEN: usize = 120;

/// Recover a classification from untrusted model output. The instruction
/// asks for a bare JSON object, but observed responses wrap it in code
/// fences, debug-scope objects, or surrounding prose. Recovery strategies
/// run in order from cheapest to most permissive:
///
/// 1. strip a Markdown code fence, if any
/// 2. parse the whole payload and validate it, unwrapping known wrapper
///    shapes (objects, arrays, and JSON-encoded string payloads)
/// 3. parse every balanced `{...}` substring the same way
pub fn extract_record(content: &str) -> Result<DdcRecord, ClassifyError> {
    let text = strip_code_fence(content);

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if let Some(record) = search_value(&value, 0) {
            return normalize_record(record);
        }
    }

    for candidate in brace_candidates(text) {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            if let Some(record) = search_value(&value, 0) {
                debug!("recovered classification from embedded object");
                return normalize_record(record);
            }
        }
    }

    Err(ClassifyError::Extraction(format!(
        "no valid classification object in response: {}",
        preview(content)
    )))
}

/// Canonicalize a DDC number to `DDD.DD`: everything but digits and dots
/// is stripped, the integer part left-pads to three digits, the fraction
/// pads or truncates to exactly two.
pub fn normalize_number(raw: &str) -> Result<String, ClassifyError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(ClassifyError::Format(format!("no digits in {:?}", raw)));
    }

    let mut parts = cleaned.split('.');
    let integer = parts.next().unwrap_or("");
    let mut fraction = parts.next().unwrap_or("").to_string();
    fraction.truncate(2);

    Ok(format!("{:0>3}.{:0<2}", integer, fraction))
}

fn normalize_record(record: DdcRecord) -> Result<DdcRecord, ClassifyError> {
    let number = normalize_number(&record.number)?;
    Ok(DdcRecord { number, ..record })
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fence regex")
    })
}

fn strip_code_fence(content: &str) -> &str {
    match fence_re().captures(content).and_then(|c| c.get(1)) {
        Some(matched) => matched.as_str(),
        None => content.trim()
    }
}

// Walk a parsed value for an object with the expected keys. Wrapper
// shapes seen in the wild nest the object under arbitrary keys, inside
// arrays, or as a JSON-encoded string payload; the walk covers all three
// without naming any particular wrapper spelling.
fn search_value(value: &Value, depth: u32) -> Option<DdcRecord> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => {
            if let Some(record) = validate(map) {
                return Some(record);
            }
            map.values().find_map(|v| search_value(v, depth + 1))
        }
        Value::Array(items) => items.iter().find_map(|v| search_value(v, depth + 1)),
        Value::String(s) => {
            let inner: Value = serde_json::from_str(s).ok()?;
            search_value(&inner, depth + 1)
        }
        _ => None
    }
}

// A candidate passes when it has a string number with at least one digit
// and non-empty category/description. Numbers missing the decimal point
// are accepted here and repaired by normalization.
fn validate(map: &Map<String, Value>) -> Option<DdcRecord> {
    let number = map.get("number")?.as_str()?;
    let category = map.get("category")?.as_str()?.trim();
    let description = map.get("description")?.as_str()?.trim();
    if !number.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if category.is_empty() || description.is_empty() {
        return None;
    }
    Some(DdcRecord::new(
        number.to_string(),
        category.to_string(),
        description.to_string()
    ))
}

// Every balanced-brace substring, widest first, skipping braces inside
// string literals. Byte indexing is safe: slices start and end on ASCII
// brace bytes.
fn brace_candidates(text: &str) -> Vec<&str> {
    let mut candidates = Vec::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => stack.push(i),
            b'}' => {
                if let Some(start) = stack.pop() {
                    candidates.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    candidates.sort_by_key(|c| std::cmp::Reverse(c.len()));
    candidates
}

fn preview(content: &str) -> String {
    let mut out: String = content.chars().take(ERROR_PREVIEW_LEN).collect();
    if out.len() < content.len() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_scenarios() {
        assert_eq!(normalize_number("5").unwrap(), "005.00");
        assert_eq!(normalize_number("123.4").unwrap(), "123.40");
        assert_eq!(normalize_number("900").unwrap(), "900.00");
        assert_eq!(normalize_number("330.0724").unwrap(), "330.07");
        assert_eq!(normalize_number(".5").unwrap(), "000.50");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["5", "123.4", "020.50", "999.99"] {
            let once = normalize_number(raw).unwrap();
            assert_eq!(normalize_number(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_normalize_strips_junk() {
        assert_eq!(normalize_number("DDC 123.4!").unwrap(), "123.40");
        assert_eq!(normalize_number(" 020.50 ").unwrap(), "020.50");
    }

    #[test]
    fn test_normalize_rejects_digitless_input() {
        assert!(matches!(normalize_number("N/A"), Err(ClassifyError::Format(_))));
        assert!(matches!(normalize_number("..."), Err(ClassifyError::Format(_))));
        assert!(matches!(normalize_number(""), Err(ClassifyError::Format(_))));
    }

    #[test]
    fn test_extracts_direct_json() {
        let content = r#"{"number": "330.07", "category": "Economics", "description": "x"}"#;
        let record = extract_record(content).unwrap();
        assert_eq!(record.number, "330.07");
        assert_eq!(record.category, "Economics");
    }

    #[test]
    fn test_extracts_fenced_json() {
        let content = "```json\n{\"number\": \"5\", \"category\": \"Computer science\", \"description\": \"General works\"}\n```";
        let record = extract_record(content).unwrap();
        assert_eq!(record.number, "005.00");
    }

    #[test]
    fn test_extracts_fenced_json_without_language_tag() {
        let content = "```\n{\"number\": \"900\", \"category\": \"History\", \"description\": \"x\"}\n```";
        assert_eq!(extract_record(content).unwrap().number, "900.00");
    }

    #[test]
    fn test_extracts_block_scope_wrapper() {
        // observed malformed shape: the object arrives JSON-encoded inside
        // an enclosing debug object.
        let content = r#"Block Scope: {"n": ["{\"number\":\"330.0724\",\"category\":\"Economics\",\"description\":\"x\"}"]}"#;
        let record = extract_record(content).unwrap();
        assert_eq!(record.number, "330.07");
        assert_eq!(record.category, "Economics");
        assert_eq!(record.description, "x");
    }

    #[test]
    fn test_extracts_object_embedded_in_prose() {
        let content = r#"Sure! Here is the classification you asked for:
            {"number": "123.4", "category": "Philosophy", "description": "Determinism"} hope it helps."#;
        let record = extract_record(content).unwrap();
        assert_eq!(record.number, "123.40");
    }

    #[test]
    fn test_extracts_nested_wrapper_object() {
        let content = r#"{"result": {"number": "020.5", "category": "Library science", "description": "x"}}"#;
        assert_eq!(extract_record(content).unwrap().number, "020.50");
    }

    #[test]
    fn test_rejects_numeric_number_field() {
        let content = r#"{"number": 330.07, "category": "Economics", "description": "x"}"#;
        assert!(matches!(extract_record(content), Err(ClassifyError::Extraction(_))));
    }

    #[test]
    fn test_rejects_missing_fields() {
        let content = r#"{"number": "330.07", "category": "Economics"}"#;
        assert!(matches!(extract_record(content), Err(ClassifyError::Extraction(_))));

        let content = r#"{"number": "330.07", "category": "", "description": "x"}"#;
        assert!(matches!(extract_record(content), Err(ClassifyError::Extraction(_))));
    }

    #[test]
    fn test_rejects_digitless_number_field() {
        let content = r#"{"number": "N/A", "category": "Economics", "description": "x"}"#;
        assert!(matches!(extract_record(content), Err(ClassifyError::Extraction(_))));
    }

    #[test]
    fn test_rejects_empty_content() {
        assert!(matches!(extract_record(""), Err(ClassifyError::Extraction(_))));
        assert!(matches!(extract_record("no json here"), Err(ClassifyError::Extraction(_))));
    }
}
