//! Error types for mapping sessions.

use ordercheck_model::ApiError;
use thiserror::Error;

use crate::session::{RequestKind, SessionPhase};

/// A local precondition failed; nothing was sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Custom mapping leaves required standard columns unassigned.
    #[error("select a source column for required columns: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    /// Automatic mapping was not complete on the server side.
    #[error(
        "automatic mapping is incomplete (missing: {}); switch to a custom mapping",
        .missing.join(", ")
    )]
    AutoMappingIncomplete { missing: Vec<String> },

    /// Override key outside the configured standard columns.
    #[error("unknown standard column: {0}")]
    UnknownStandardColumn(String),

    /// Override value that is not a column of the uploaded file.
    #[error("column {0:?} is not present in the uploaded file")]
    UnknownOriginalColumn(String),
}

/// Errors from session operations.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// Another request for this session is still outstanding.
    #[error("session busy: {0} request still pending")]
    Busy(RequestKind),

    /// The operation needs loaded mapping data.
    #[error("session not ready (currently {0})")]
    NotReady(SessionPhase),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SessionError {
    /// Returns a message suitable for display in the dialog.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Busy(_) => "Please wait for the current request to finish.".to_string(),
            Self::NotReady(_) => "The mapping preview has not been loaded yet.".to_string(),
            Self::Validation(err) => err.to_string(),
            Self::Api(err) => err.user_message().to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_list_columns() {
        let err = ValidationError::MissingRequired(vec![
            "item_id".to_string(),
            "product_name".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "select a source column for required columns: item_id, product_name"
        );

        let err = SessionError::from(ValidationError::AutoMappingIncomplete {
            missing: vec!["product_name".to_string()],
        });
        assert!(err.is_validation());
        assert!(err.user_message().contains("custom mapping"));
    }

    #[test]
    fn api_errors_surface_server_message() {
        let err = SessionError::from(ApiError::Network("connection refused".to_string()));
        assert_eq!(err.user_message(), "connection refused");
        assert!(!err.is_validation());
    }
}
