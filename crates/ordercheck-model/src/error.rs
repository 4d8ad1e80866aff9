use thiserror::Error;

use crate::feedback::ErrorBody;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid file id: {0:?}")]
    InvalidFileId(String),
    #[error("invalid spec id: {0:?}")]
    InvalidSpecId(String),
    #[error("invalid result id: {0:?}")]
    InvalidResultId(String),
}

/// Failure of a call against the spec server.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The request never produced a usable response: connection failure,
    /// unreadable body, or a non-2xx status without a parseable error body.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with an error body (non-2xx or `success: false`).
    #[error("server error ({status}): {message}")]
    Server {
        status: u16,
        message: String,
        body: Box<ErrorBody>,
    },
}

impl ApiError {
    /// Build a server error, taking the message from `error`, then `message`,
    /// then `fallback`.
    pub fn server(status: u16, body: ErrorBody, fallback: &str) -> Self {
        let message = body.headline().unwrap_or(fallback).to_string();
        Self::Server {
            status,
            message,
            body: Box::new(body),
        }
    }

    /// Message suitable for a status banner.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Network(message) | Self::Server { message, .. } => message,
        }
    }

    /// The structured error body, when the server sent one.
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Network(_) => None,
            Self::Server { body, .. } => Some(body),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Network(format!("unreadable response: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_prefers_error_field() {
        let body = ErrorBody {
            error: Some("找不到上传的文件".to_string()),
            message: Some("可能已过期".to_string()),
            ..ErrorBody::default()
        };
        let err = ApiError::server(404, body, "preview failed");
        assert_eq!(err.user_message(), "找不到上传的文件");
        assert!(err.body().is_some());
    }

    #[test]
    fn server_message_falls_back() {
        let err = ApiError::server(500, ErrorBody::default(), "preview failed");
        assert_eq!(err.user_message(), "preview failed");
        assert_eq!(err.to_string(), "server error (500): preview failed");
        assert!(ApiError::Network("refused".to_string()).body().is_none());
    }
}
