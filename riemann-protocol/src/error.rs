//! Protocol error types.

use thiserror::Error;

/// Errors raised while encoding, decoding or building protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("encode error: {0}")]
    Encode(#[from] prost::EncodeError),

    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: u64, max: u64 },

    #[error("'attributes' must be a mapping, got {0}")]
    InvalidAttributes(&'static str),

    #[error("invalid value for field '{field}': expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("event parameters must be an object, got {0}")]
    InvalidParams(&'static str),
}

/// Names the JSON type of a value for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::FrameTooLarge { size: 100, max: 50 };
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("50"));

        let err = ProtocolError::InvalidAttributes("array");
        assert!(err.to_string().contains("mapping"));
        assert!(err.to_string().contains("array"));

        let err = ProtocolError::InvalidField {
            field: "ttl",
            expected: "number",
        };
        let msg = err.to_string();
        assert!(msg.contains("ttl"));
        assert!(msg.contains("number"));
    }

    #[test]
    fn test_json_type_name() {
        assert_eq!(json_type_name(&serde_json::json!(null)), "null");
        assert_eq!(json_type_name(&serde_json::json!([1, 2])), "array");
        assert_eq!(json_type_name(&serde_json::json!({"a": 1})), "object");
        assert_eq!(json_type_name(&serde_json::json!("s")), "string");
    }
}
