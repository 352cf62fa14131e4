//! Credential and session-token core for the study group finder.
//!
//! Provides:
//! - Password hashing (Argon2id, self-describing `cost:saltHex:keyHex` hashes)
//! - Signed session tokens (HMAC-SHA256, JWT-shaped, time bounded)
//! - Layered configuration and session cookie headers
//! - Authentication coordination for the request handlers
//!
//! Both components are stateless: they read immutable configuration and the
//! clock, so a single instance can serve any number of concurrent requests.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use sgf_auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new(4).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! assert!(!hasher.verify("other_password", &hash).unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use sgf_auth::{ExtraClaims, JwtHandler, Ttl};
//!
//! let handler =
//!     JwtHandler::new(b"secret_key_at_least_32_bytes_long!", "7d".parse().unwrap()).unwrap();
//! let token = handler
//!     .issue_with_ttl("user-123", ExtraClaims::new(), "1h".parse::<Ttl>().unwrap())
//!     .unwrap();
//! let claims = handler.verify(&token).unwrap();
//! assert_eq!(claims.sub, "user-123");
//! assert_eq!(claims.exp - claims.iat, 3600);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use sgf_auth::{AuthConfig, Authenticator, ExtraClaims};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut config = AuthConfig::default();
//! config.password.cost_factor = 4;
//! let auth = Authenticator::new(&config).unwrap();
//!
//! // Signup: hash password
//! let hash = auth.hash_password("password123").await.unwrap();
//!
//! // Login: verify and generate token
//! let result = auth
//!     .authenticate("password123", &hash, "user123", ExtraClaims::new())
//!     .await
//!     .unwrap();
//! let set_cookie = auth.session_cookie(&result.access_token);
//!
//! // Later requests: validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! # let _ = set_cookie;
//! # });
//! ```

pub mod authenticator;
pub mod clock;
pub mod config;
pub mod cookie;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::SystemClock;
pub use config::AuthConfig;
pub use config::ConfigurationError;
pub use config::RunMode;
pub use cookie::SessionCookie;
pub use jwt::Claims;
pub use jwt::ExtraClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::Ttl;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::StoredHash;
