//! Pure echo transforms. The caller supplies the clock reading, so every
//! function here is deterministic and independently testable.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::TransformError;

/// Wall-clock format used on the WebSocket path: 24-hour, zero-padded,
/// second precision, no timezone indicator.
pub const WALL_CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// WebSocket-path transform: append the formatted wall-clock time to the
/// payload. Total over all input strings.
pub fn stamp_text(payload: &str, at: DateTime<Local>) -> String {
    format!("{} - {}", payload, at.format(WALL_CLOCK_FORMAT))
}

/// HTTP-path transform: parse the payload as a JSON object and inject
/// `status` and `timestamp` fields, overwriting them if already present.
pub fn annotate_json(payload: &str, epoch_ms: i64) -> Result<String, TransformError> {
    let mut object: Map<String, Value> =
        serde_json::from_str(payload).map_err(|source| TransformError::InvalidPayload { source })?;
    object.insert("status".into(), Value::String("received".into()));
    object.insert("timestamp".into(), Value::String(epoch_ms.to_string()));
    serde_json::to_string(&object).map_err(|source| TransformError::Serialize { source })
}

#[derive(Serialize)]
struct FallbackBody {
    status: &'static str,
    timestamp: String,
}

/// The fixed response for payloads that are not JSON objects. Failure here
/// is the one unrecoverable condition in the system.
pub fn fallback_payload(epoch_ms: i64) -> Result<String, TransformError> {
    let body = FallbackBody {
        status: "failed",
        timestamp: epoch_ms.to_string(),
    };
    serde_json::to_string(&body).map_err(|source| TransformError::FallbackSerialization { source })
}

/// The composed HTTP-path operation: annotate the payload, substituting the
/// fallback body when the payload cannot be treated as a JSON object.
pub fn json_echo(payload: &str, epoch_ms: i64) -> Result<String, TransformError> {
    match annotate_json(payload, epoch_ms) {
        Ok(body) => Ok(body),
        Err(err) if err.is_recoverable() => fallback_payload(epoch_ms),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 7, 9, 30, 5).unwrap()
    }

    #[test]
    fn stamp_text_appends_formatted_time() {
        assert_eq!(stamp_text("ping", at()), "ping - 2026-08-07 09:30:05");
    }

    #[test]
    fn stamp_text_zero_pads() {
        let at = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(stamp_text("x", at), "x - 2026-01-02 03:04:05");
    }

    #[test]
    fn stamp_text_accepts_any_string() {
        assert_eq!(stamp_text("", at()), " - 2026-08-07 09:30:05");
        assert!(stamp_text("{\"not\": \"parsed\"}", at()).starts_with("{\"not\": \"parsed\"} - "));
    }

    #[test]
    fn annotate_preserves_keys_and_injects_fields() {
        let out = annotate_json(r#"{"a":1,"b":"x"}"#, 1754550000000).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["a"], json!(1));
        assert_eq!(value["b"], json!("x"));
        assert_eq!(value["status"], json!("received"));
        assert_eq!(value["timestamp"], json!("1754550000000"));
    }

    #[test]
    fn annotate_overwrites_existing_status_and_timestamp() {
        let out = annotate_json(r#"{"status":"stale","timestamp":"0"}"#, 42).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], json!("received"));
        assert_eq!(value["timestamp"], json!("42"));
    }

    #[test]
    fn annotate_rejects_invalid_json() {
        let err = annotate_json("hello", 1).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn annotate_rejects_non_object_json() {
        assert!(annotate_json("42", 1).is_err());
        assert!(annotate_json("[1,2]", 1).is_err());
        assert!(annotate_json(r#""quoted""#, 1).is_err());
    }

    #[test]
    fn fallback_payload_shape() {
        let out = fallback_payload(1754550000000).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, json!({"status": "failed", "timestamp": "1754550000000"}));
    }

    #[test]
    fn json_echo_passes_objects_through() {
        let out = json_echo(r#"{"a":1}"#, 7).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["a"], json!(1));
        assert_eq!(value["status"], json!("received"));
    }

    #[test]
    fn json_echo_falls_back_for_non_json() {
        let out = json_echo("hello", 7).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, json!({"status": "failed", "timestamp": "7"}));
    }

    #[test]
    fn json_echo_falls_back_for_get_default_message() {
        // "GET request" is not valid JSON, so a parameterless GET lands here.
        let out = json_echo("GET request", 7).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], json!("failed"));
    }

    #[test]
    fn json_echo_timestamp_is_integer_string() {
        let out = json_echo(r#"{"a":1}"#, 1754550000000).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        let ts = value["timestamp"].as_str().unwrap();
        assert!(ts.parse::<i64>().is_ok());
    }
}
