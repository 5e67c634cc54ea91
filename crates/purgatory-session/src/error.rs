//! Session-specific error types.

use purgatory_types::{SessionId, StoreError};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The identifier was never reserved (or is malformed).
    #[error("{id} doesn't exist")]
    NotFound { id: SessionId },

    #[error("Incorrect API key")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// JSON body returned to callers for an unknown identifier.
#[derive(Debug, Serialize)]
pub struct NotFoundBody {
    pub message: String,
}

impl SessionError {
    pub fn not_found(id: &SessionId) -> Self {
        Self::NotFound { id: id.clone() }
    }

    /// `{"message": "<id> doesn't exist"}` for `NotFound`, `None` otherwise.
    pub fn not_found_body(&self) -> Option<NotFoundBody> {
        match self {
            Self::NotFound { .. } => Some(NotFoundBody {
                message: self.to_string(),
            }),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_body_message() {
        let err = SessionError::not_found(&SessionId::from("abc"));
        let body = serde_json::to_string(&err.not_found_body().unwrap()).unwrap();
        assert_eq!(body, r#"{"message":"abc doesn't exist"}"#);
    }

    #[test]
    fn store_errors_have_no_not_found_body() {
        let err = SessionError::from(StoreError::unavailable("down"));
        assert!(err.not_found_body().is_none());
        assert!(!err.is_not_found());
    }
}
