use serde_json::Value;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("payload is not parseable JSON after repair: {0}")]
    Unparseable(#[from] serde_json::Error),
    #[error("payload root is not an array")]
    RootNotArray,
}

/// Best-effort rewrite of a near-valid upstream payload into parseable JSON.
///
/// The steps run in a fixed order; later steps assume earlier normalization
/// already happened (bracket counting in particular must see the payload
/// after trailing commas are gone):
/// 1. trim surrounding whitespace
/// 2. replace literal `NaN` tokens with `null`
/// 3. drop trailing commas before a closing `]` or `}`
/// 4. balance square brackets, appending missing `]` or prepending missing
///    `[`, which recovers payloads truncated at either end
pub fn repair(raw: &str) -> String {
    let trimmed = raw.trim().replace("NaN", "null");
    balance_brackets(strip_trailing_commas(&trimmed))
}

/// Strict parse of a repaired payload. The root must be an array; anything
/// else means the hour's data is unrecoverable.
pub fn parse_snapshot(text: &str) -> Result<Vec<Value>, RepairError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(items),
        _ => Err(RepairError::RootNotArray),
    }
}

fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(',') {
        let after = &rest[pos + 1..];
        let next = after.trim_start();
        if next.starts_with(']') || next.starts_with('}') {
            out.push_str(&rest[..pos]);
        } else {
            out.push_str(&rest[..=pos]);
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

fn balance_brackets(text: String) -> String {
    let opens = text.matches('[').count();
    let closes = text.matches(']').count();
    match opens.cmp(&closes) {
        Ordering::Greater => {
            let mut balanced = text;
            balanced.push_str(&"]".repeat(opens - closes));
            balanced
        }
        Ordering::Less => {
            let mut balanced = "[".repeat(closes - opens);
            balanced.push_str(&text);
            balanced
        }
        Ordering::Equal => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repair_is_a_no_op_on_valid_payloads() {
        let valid = r#"[[1.0,2.0,3.0],[4.0,5.0,6.0]]"#;
        let repaired = repair(valid);
        assert_eq!(
            serde_json::from_str::<Value>(&repaired).unwrap(),
            serde_json::from_str::<Value>(valid).unwrap()
        );
    }

    #[test]
    fn appends_missing_closing_brackets() {
        let repaired = repair("[[1.0,2.0,3.0]");
        let parsed: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed, json!([[1.0, 2.0, 3.0]]));
    }

    #[test]
    fn prepends_missing_opening_brackets() {
        let repaired = repair("1.0,2.0,3.0]]");
        let parsed: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed, json!([[1.0, 2.0, 3.0]]));
    }

    #[test]
    fn replaces_nan_tokens_with_null() {
        let repaired = repair("[[1.0,NaN,3.0]]");
        let parsed: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed, json!([[1.0, null, 3.0]]));
    }

    #[test]
    fn strips_trailing_commas_before_closing_delimiters() {
        let repaired = repair("[[1.0,2.0,3.0], ]");
        let parsed: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed, json!([[1.0, 2.0, 3.0]]));

        let repaired = repair(r#"[{"a":1, }]"#);
        let parsed: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed, json!([{ "a": 1 }]));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_before_balancing() {
        // The stray newline must not end up behind the appended bracket.
        let repaired = repair("\n  [[1.0,2.0,3.0]  \n");
        assert!(serde_json::from_str::<Value>(&repaired).is_ok());
    }

    #[test]
    fn parse_rejects_non_array_roots() {
        assert!(matches!(
            parse_snapshot(r#"{"positions": []}"#),
            Err(RepairError::RootNotArray)
        ));
        assert!(matches!(
            parse_snapshot("not json at all"),
            Err(RepairError::Unparseable(_))
        ));
    }
}
