use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the account layer.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("the {0} field must be set")]
    MissingField(&'static str),

    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("user {0} not found")]
    NotFound(Uuid),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl AccountError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::DuplicateEmail(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PasswordHash(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, AccountError>;
