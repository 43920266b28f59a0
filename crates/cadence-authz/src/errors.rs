use thiserror::Error;

/// Authentication and authorization failures.
///
/// Each variant is a distinct, stable category so callers can tell bad
/// credentials, expired sessions, and forbidden actions apart without parsing
/// messages.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("token expired")]
    TokenExpired,
    #[error("token malformed: {0}")]
    TokenMalformed(String),
    #[error("signing error: {0}")]
    SigningError(String),
    #[error("not authorized")]
    NotAuthorized,
}

impl AuthError {
    /// Stable machine-readable category for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenMalformed(_) => "token_malformed",
            AuthError::SigningError(_) => "signing_error",
            AuthError::NotAuthorized => "forbidden",
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Failure reported by a node-ownership lookup collaborator.
#[derive(Debug, Error)]
#[error("node lookup failed: {0}")]
pub struct LookupError(pub String);
