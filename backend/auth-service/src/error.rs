use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;
use token_security::{RevocationError, TokenError};

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("email already registered")]
    AlreadyExists,

    #[error("principal not found")]
    NotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("token already revoked")]
    AlreadyRevoked,

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::AlreadyExists => StatusCode::CONFLICT,
            // NotFound renders identically to InvalidCredentials so
            // responses never reveal whether an email is registered.
            AuthError::NotFound => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::AlreadyRevoked => StatusCode::CONFLICT,
            AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error, message) = match self {
            AuthError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone()),
            AuthError::AlreadyExists => ("ALREADY_EXISTS", "email already registered".to_string()),
            AuthError::NotFound | AuthError::InvalidCredentials => {
                ("INVALID_CREDENTIALS", "invalid email or password".to_string())
            }
            AuthError::Unauthenticated => {
                ("UNAUTHENTICATED", "invalid, expired or revoked token".to_string())
            }
            AuthError::AlreadyRevoked => {
                ("ALREADY_REVOKED", "token already revoked".to_string())
            }
            AuthError::Unavailable(msg) => {
                tracing::error!("store failure: {}", msg);
                ("UNAVAILABLE", "service temporarily unavailable".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse { error, message })
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Unavailable(err.to_string())
    }
}

impl From<RevocationError> for AuthError {
    fn from(err: RevocationError) -> Self {
        let RevocationError::Unavailable(msg) = err;
        AuthError::Unavailable(msg)
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => AuthError::Unavailable(msg),
            _ => AuthError::Unauthenticated,
        }
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::InvalidInput(errors.to_string())
    }
}
