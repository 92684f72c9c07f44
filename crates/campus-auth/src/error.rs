//! Authentication error types.

use campus_core::error::CampusError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is deactivated")]
    AccountDeactivated,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("token issued before last credential change")]
    TokenStale,

    #[error("password shorter than {0} characters")]
    PasswordTooShort(usize),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for CampusError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken
            | AuthError::InvalidCredentials
            | AuthError::AccountDeactivated
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_)
            | AuthError::TokenStale => CampusError::Unauthenticated {
                reason: err.to_string(),
            },
            AuthError::PasswordTooShort(_) => CampusError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => CampusError::Crypto(msg),
        }
    }
}
