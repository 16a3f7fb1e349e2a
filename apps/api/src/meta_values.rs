//! Helpers for reading loosely-typed values out of the meta side table.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::PgPool;

pub async fn fetch_meta_value(pool: &PgPool, key: &str) -> Result<Option<Value>, sqlx::Error> {
    sqlx::query_scalar("SELECT value FROM meta WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await
}

/// Meta values are either plain JSON strings or objects wrapping one under a
/// `value` key; anything else yields None.
pub fn extract_string_meta_value(meta_value: Option<&Value>) -> Option<String> {
    match meta_value? {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => match map.get("value") {
            Some(Value::String(text)) => Some(text.clone()),
            _ => None,
        },
        _ => None,
    }
}

pub fn to_iso_string(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_plain_string_values() {
        let value = json!("2026-02-20T00:00:00.000Z");
        assert_eq!(
            extract_string_meta_value(Some(&value)),
            Some("2026-02-20T00:00:00.000Z".to_string())
        );
    }

    #[test]
    fn extracts_wrapped_string_values() {
        let value = json!({ "value": "hello" });
        assert_eq!(extract_string_meta_value(Some(&value)), Some("hello".to_string()));
    }

    #[test]
    fn rejects_non_string_shapes() {
        assert_eq!(extract_string_meta_value(Some(&json!(42))), None);
        assert_eq!(extract_string_meta_value(Some(&json!({ "value": 42 }))), None);
        assert_eq!(extract_string_meta_value(None), None);
    }

    #[test]
    fn iso_strings_carry_millisecond_precision() {
        let timestamp: DateTime<Utc> = "2026-02-20T00:00:00Z".parse().unwrap();
        assert_eq!(to_iso_string(timestamp), "2026-02-20T00:00:00.000Z");
    }
}
