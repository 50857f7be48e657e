//! Error types for notekeeper.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using notekeeper's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for notekeeper operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No registered user with this email
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// No note with this id owned by the caller
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    /// Registration with an email that is already taken
    #[error("Email already in use: {0}")]
    DuplicateUser(String),

    /// Password did not match on explicit login
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token structure or signature could not be verified
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Credential hashing failed
    #[error("Credential error: {0}")]
    Credential(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    /// True for the not-found family (`UserNotFound`, `NoteNotFound`).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::UserNotFound(_) | Error::NoteNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_user_not_found() {
        let err = Error::UserNotFound("a@b.io".to_string());
        assert_eq!(err.to_string(), "User not found: a@b.io");
    }

    #[test]
    fn test_error_display_note_not_found() {
        let id = Uuid::nil();
        let err = Error::NoteNotFound(id);
        assert_eq!(err.to_string(), format!("Note not found: {}", id));
    }

    #[test]
    fn test_error_display_duplicate_user() {
        let err = Error::DuplicateUser("a@b.io".to_string());
        assert_eq!(err.to_string(), "Email already in use: a@b.io");
    }

    #[test]
    fn test_error_display_malformed_token() {
        let err = Error::MalformedToken("bad signature".to_string());
        assert_eq!(err.to_string(), "Malformed token: bad signature");
    }

    #[test]
    fn test_error_display_invalid_credentials() {
        assert_eq!(Error::InvalidCredentials.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::UserNotFound("x".into()).is_not_found());
        assert!(Error::NoteNotFound(Uuid::nil()).is_not_found());
        assert!(!Error::InvalidCredentials.is_not_found());
        assert!(!Error::DuplicateUser("x".into()).is_not_found());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Serialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
