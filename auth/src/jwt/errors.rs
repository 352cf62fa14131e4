use thiserror::Error;

use crate::config::ConfigurationError;

/// Error type for token operations.
///
/// Messages describe the failure class only; they never include token or
/// signature bytes.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token is malformed: {0}")]
    MalformedToken(&'static str),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    TokenExpired,

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}
