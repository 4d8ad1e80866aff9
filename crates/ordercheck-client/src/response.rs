//! Turning raw HTTP responses into typed results.

use ordercheck_model::{ApiError, ErrorBody};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a response body.
///
/// Any non-2xx status is a failure: with a parseable error body it becomes
/// [`ApiError::Server`], otherwise [`ApiError::Network`]. A 2xx body carrying
/// `"success": false` is also a server error.
pub fn parse_response<T: DeserializeOwned>(
    status: u16,
    text: &str,
    fallback: &str,
) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        return Err(error_response(status, text, fallback));
    }

    let value: Value = serde_json::from_str(text)?;
    if value.get("success") == Some(&Value::Bool(false)) {
        let body: ErrorBody = serde_json::from_value(value)?;
        return Err(ApiError::server(status, body, fallback));
    }
    Ok(serde_json::from_value(value)?)
}

/// Error for a non-2xx response.
pub fn error_response(status: u16, text: &str, fallback: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => ApiError::server(status, body, fallback),
        Err(_) => ApiError::Network(format!("HTTP {status}: {fallback}")),
    }
}

/// Map a transport failure.
pub fn network(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Network(format!("request timed out: {err}"))
    } else if err.is_connect() {
        ApiError::Network(format!("could not connect to the server: {err}"))
    } else {
        ApiError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use ordercheck_model::{ConfirmAck, ErrorFeedback, Suggestion};

    use super::*;

    #[test]
    fn success_body_decodes() {
        let ack: ConfirmAck = parse_response(
            200,
            r#"{"success": true, "spec_id": "s-9", "record_count": 3}"#,
            "confirm failed",
        )
        .unwrap();
        assert_eq!(ack.record_count, Some(3));
    }

    #[test]
    fn success_false_is_server_error() {
        let err = parse_response::<ConfirmAck>(
            200,
            r#"{"success": false, "message": "映射失败"}"#,
            "confirm failed",
        )
        .unwrap_err();
        match err {
            ApiError::Server {
                status, message, ..
            } => {
                assert_eq!(status, 200);
                assert_eq!(message, "映射失败");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_body_keeps_feedback() {
        let text = r#"{
            "success": false,
            "error": "规格表数据验证失败",
            "error_code": "DATA_VALIDATION_ERROR",
            "data_errors": {
                "item_id": {"type": "null_values", "message": "empty", "rows": [3, 7]}
            },
            "suggestions": {
                "item_id_null": {"message": "fill item ids", "rows": [3, 7]}
            }
        }"#;
        let err = parse_response::<ConfirmAck>(400, text, "confirm failed").unwrap_err();
        assert_eq!(err.user_message(), "规格表数据验证失败");

        let feedback = ErrorFeedback::from_body(err.body().unwrap());
        assert_eq!(feedback.error_code.as_deref(), Some("DATA_VALIDATION_ERROR"));
        assert_eq!(feedback.data_errors[0].rows, vec!["3", "7"]);
        assert!(matches!(
            &feedback.suggestions[0],
            Suggestion::NullValues { column, .. } if column == "item_id"
        ));
    }

    #[test]
    fn unparseable_error_is_network_failure() {
        let err =
            parse_response::<ConfirmAck>(502, "<html>Bad Gateway</html>", "confirm failed")
                .unwrap_err();
        assert!(matches!(err, ApiError::Network(ref m) if m == "HTTP 502: confirm failed"));
    }

    #[test]
    fn error_without_message_uses_fallback() {
        let err = parse_response::<ConfirmAck>(500, "{}", "preview failed").unwrap_err();
        assert_eq!(err.user_message(), "preview failed");
    }
}
