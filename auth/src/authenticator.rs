use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::config::AuthConfig;
use crate::config::ConfigurationError;
use crate::cookie::SessionCookie;
use crate::jwt::Claims;
use crate::jwt::ExtraClaims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::Ttl;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Key derivation is CPU-bound, so the async password operations run it on
/// tokio's blocking pool and leave the request-dispatch threads free.
pub struct Authenticator<C = SystemClock> {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler<C>,
    session_cookie: SessionCookie,
}

/// Result of successful authentication.
#[derive(Debug)]
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator<SystemClock> {
    /// Create a new authenticator.
    ///
    /// Validates the whole configuration up front, so a bad cost factor,
    /// lifetime or secret fails at startup rather than on the first request.
    pub fn new(config: &AuthConfig) -> Result<Self, ConfigurationError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Authenticator<C> {
    pub fn with_clock(config: &AuthConfig, clock: C) -> Result<Self, ConfigurationError> {
        config.validate()?;

        Ok(Self {
            password_hasher: PasswordHasher::from_config(&config.password)?,
            jwt_handler: JwtHandler::with_clock(
                config.jwt.secret.as_bytes(),
                config.jwt.default_ttl()?,
                clock,
            )?,
            session_cookie: SessionCookie::new(&config.cookie, config.run_mode),
        })
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `EmptyPassword` - plaintext is empty
    /// * `HashingFailed` - key derivation failed
    pub async fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = self.password_hasher;
        let password = password.to_owned();

        run_blocking(move || hasher.hash(&password)).await
    }

    /// Check a password against a stored hash.
    ///
    /// Wrong passwords and malformed hashes are both `Ok(false)`.
    pub async fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<bool, PasswordError> {
        let hasher = self.password_hasher;
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();

        run_blocking(move || hasher.verify(&password, &stored_hash)).await
    }

    /// Verify credentials and generate a session token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub async fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
        extra: ExtraClaims,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.verify_password(password, stored_hash).await? {
            tracing::debug!(subject = %subject, "Credential check failed");
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.jwt_handler.issue(subject, extra)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Generate a session token without password verification.
    ///
    /// Used right after signup, when the caller has just stored the hash.
    pub fn issue_token(&self, subject: &str, extra: ExtraClaims) -> Result<String, JwtError> {
        self.jwt_handler.issue(subject, extra)
    }

    pub fn issue_token_with_ttl(
        &self,
        subject: &str,
        extra: ExtraClaims,
        ttl: Ttl,
    ) -> Result<String, JwtError> {
        self.jwt_handler.issue_with_ttl(subject, extra, ttl)
    }

    /// Validate a session token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.verify(token).inspect_err(|e| {
            tracing::warn!(reason = %e, "Token rejected");
        })
    }

    /// `Set-Cookie` header value carrying `token`.
    pub fn session_cookie(&self, token: &str) -> String {
        self.session_cookie.set_header(token)
    }

    /// `Set-Cookie` header value that ends the session in the browser.
    pub fn clear_session_cookie(&self) -> String {
        self.session_cookie.clear_header()
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, PasswordError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        tracing::error!(error = %e, "Key derivation worker failed");
        PasswordError::HashingFailed(e.to_string())
    })?
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicI64;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::clock::MockClock;
    use crate::config::RunMode;

    fn test_config() -> AuthConfig {
        let mut config = AuthConfig::default();
        config.run_mode = RunMode::Test;
        config.password.cost_factor = 4;
        config.jwt.secret = "test_secret_key_at_least_32_bytes!".to_string();
        config.jwt.expires_in = "1h".to_string();
        config
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let authenticator = Authenticator::new(&test_config()).unwrap();

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .await
            .expect("Failed to hash password");

        let result = authenticator
            .authenticate(password, &hash, "user123", ExtraClaims::new())
            .await
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());

        let claims = authenticator
            .validate_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[tokio::test]
    async fn test_authenticate_invalid_password() {
        let authenticator = Authenticator::new(&test_config()).unwrap();

        let hash = authenticator.hash_password("my_password").await.unwrap();

        let result = authenticator
            .authenticate("wrong_password", &hash, "user123", ExtraClaims::new())
            .await;
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_malformed_hash_is_invalid_credentials() {
        let authenticator = Authenticator::new(&test_config()).unwrap();

        let result = authenticator
            .authenticate("my_password", "not-a-hash", "user123", ExtraClaims::new())
            .await;
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_hash_empty_password() {
        let authenticator = Authenticator::new(&test_config()).unwrap();

        let result = authenticator.hash_password("").await;
        assert!(matches!(result, Err(PasswordError::EmptyPassword)));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = test_config();
        config.password.cost_factor = 2;
        assert!(matches!(
            Authenticator::new(&config),
            Err(ConfigurationError::InvalidCostFactor(2))
        ));

        let mut config = test_config();
        config.run_mode = RunMode::Production;
        config.jwt.secret = crate::config::PLACEHOLDER_SECRET.to_string();
        assert!(matches!(
            Authenticator::new(&config),
            Err(ConfigurationError::PlaceholderSecret)
        ));

        let mut config = test_config();
        config.jwt.expires_in = "soon".to_string();
        assert!(matches!(
            Authenticator::new(&config),
            Err(ConfigurationError::InvalidTtl(_))
        ));
    }

    #[test]
    fn test_issue_token_with_ttl_override() {
        let now = Arc::new(AtomicI64::new(5_000));
        let reading = Arc::clone(&now);
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(move || reading.load(Ordering::SeqCst));

        let authenticator = Authenticator::with_clock(&test_config(), clock).unwrap();

        let mut extra = ExtraClaims::new();
        extra.insert("university".to_string(), json!("ETH"));
        let token = authenticator
            .issue_token_with_ttl("user123", extra, "1m".parse().unwrap())
            .unwrap();

        let claims = authenticator.validate_token(&token).unwrap();
        assert_eq!(claims.exp, 5_060);
        assert_eq!(claims.extra_str("university"), Some("ETH"));

        now.store(5_060, Ordering::SeqCst);
        assert!(matches!(
            authenticator.validate_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = Authenticator::new(&test_config()).unwrap();

        let result = authenticator.validate_token("invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_session_cookie_uses_config() {
        let authenticator = Authenticator::new(&test_config()).unwrap();
        let token = authenticator
            .issue_token("user123", ExtraClaims::new())
            .unwrap();

        let header = authenticator.session_cookie(&token);
        assert!(header.starts_with(&format!("sgf_session={token};")));
        assert!(header.contains("Max-Age=604800;"));
        assert!(header.contains("SameSite=Lax"));

        let cleared = authenticator.clear_session_cookie();
        assert!(cleared.starts_with("sgf_session=;"));
        assert!(cleared.contains("Max-Age=0;"));
    }
}
