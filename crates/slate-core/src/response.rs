//! Uniform response envelope.
//!
//! Every JSON endpoint (everything except raw file downloads) wraps its
//! payload in `{code, message, data}`. `code` is `0` on success; error
//! responses carry the HTTP status code instead (see [`crate::errors`]).

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Success envelope wrapping a payload.
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// Success envelope with a message and no payload.
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            code: 0,
            message: msg.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let envelope = Envelope::ok(42);
        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.message, "success");
        assert_eq!(envelope.data, Some(42));
    }

    #[test]
    fn test_message_envelope() {
        let envelope = Envelope::message("deleted");
        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.message, "deleted");
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_envelope_serializes_null_data() {
        let envelope = Envelope::message("ok");
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains(r#""data":null"#));
    }

    #[test]
    fn test_envelope_round_trip() {
        let envelope = Envelope::ok(vec![1, 2, 3]);
        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: Envelope<Vec<i32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.code, 0);
        assert_eq!(parsed.data, Some(vec![1, 2, 3]));
    }
}
