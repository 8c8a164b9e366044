use serde_json::Value;

use super::errors::TranslationError;
use crate::ingestion::Payload;

// ============================================================================
// Payload Field Access
// ============================================================================

/// Scalar field rendered as text. Null and blank strings read as absent.
pub(super) fn text(payload: &Payload, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Passthrough list; absent or null becomes empty
pub(super) fn list(payload: &Payload, key: &str) -> Result<Vec<Value>, TranslationError> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(_) => Err(TranslationError::InvalidField {
            field: key.to_string(),
            reason: "expected a list".to_string(),
        }),
    }
}

/// Numeric user id, sent either as a JSON number or as a numeric string
pub(super) fn user_id(payload: &Payload, key: &'static str) -> Result<i64, TranslationError> {
    let invalid = |reason: String| TranslationError::InvalidField {
        field: key.to_string(),
        reason,
    };

    match payload.get(key) {
        None | Some(Value::Null) => Err(TranslationError::MissingUserId(key)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(TranslationError::MissingUserId(key)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("'{}' is not a numeric id", s))),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| invalid(format!("{} is not an integer id", n))),
        Some(other) => Err(invalid(format!("unexpected value {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_text_renders_scalars_and_skips_blanks() {
        let p = payload(json!({ "s": "abc", "n": 100, "b": true, "blank": "  ", "null": null }));

        assert_eq!(text(&p, "s").as_deref(), Some("abc"));
        assert_eq!(text(&p, "n").as_deref(), Some("100"));
        assert_eq!(text(&p, "b").as_deref(), Some("true"));
        assert_eq!(text(&p, "blank"), None);
        assert_eq!(text(&p, "null"), None);
        assert_eq!(text(&p, "absent"), None);
    }

    #[test]
    fn test_list_defaults_to_empty_and_rejects_scalars() {
        let p = payload(json!({ "zones": ["north"], "skills": "plumbing" }));

        assert_eq!(list(&p, "zones").unwrap(), vec![json!("north")]);
        assert!(list(&p, "absent").unwrap().is_empty());
        assert!(matches!(
            list(&p, "skills"),
            Err(TranslationError::InvalidField { ref field, .. }) if field == "skills"
        ));
    }

    #[test]
    fn test_user_id_accepts_number_and_numeric_string() {
        assert_eq!(user_id(&payload(json!({ "id": 42 })), "id").unwrap(), 42);
        assert_eq!(user_id(&payload(json!({ "id": " 42 " })), "id").unwrap(), 42);
    }

    #[test]
    fn test_user_id_missing_or_garbage() {
        assert!(matches!(
            user_id(&payload(json!({})), "id"),
            Err(TranslationError::MissingUserId("id"))
        ));
        assert!(matches!(
            user_id(&payload(json!({ "id": "abc" })), "id"),
            Err(TranslationError::InvalidField { .. })
        ));
        assert!(matches!(
            user_id(&payload(json!({ "id": 4.5 })), "id"),
            Err(TranslationError::InvalidField { .. })
        ));
    }
}
