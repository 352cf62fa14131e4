use thiserror::Error;

use crate::config::ConfigurationError;

/// Error type for password operations.
///
/// A credential that simply does not match is not an error: verification
/// reports it as `Ok(false)`, together with malformed stored hashes.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password must not be empty")]
    EmptyPassword,

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}
