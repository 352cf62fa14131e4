use std::collections::HashMap;
use std::sync::Mutex;

use sgf_auth::AuthConfig;
use sgf_auth::AuthenticationError;
use sgf_auth::Authenticator;
use sgf_auth::ExtraClaims;
use sgf_auth::RunMode;

/// Minimal stand-in for the request handlers: an in-memory user table in
/// front of the authenticator.
pub struct TestApp {
    pub authenticator: Authenticator,
    users: Mutex<HashMap<String, StoredUser>>,
}

#[derive(Clone)]
pub struct StoredUser {
    pub id: String,
    pub password_hash: String,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_secret("integration_secret_at_least_32_bytes!")
    }

    pub fn with_secret(secret: &str) -> Self {
        let mut config = AuthConfig::default();
        config.run_mode = RunMode::Test;
        config.password.cost_factor = 4;
        config.jwt.secret = secret.to_string();

        Self {
            authenticator: Authenticator::new(&config).expect("Failed to build authenticator"),
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Store a new user and return their session token.
    pub async fn signup(&self, email: &str, password: &str) -> String {
        let password_hash = self
            .authenticator
            .hash_password(password)
            .await
            .expect("Failed to hash password");

        let id = format!("user-{}", self.users.lock().unwrap().len() + 1);
        self.users.lock().unwrap().insert(
            email.to_string(),
            StoredUser {
                id: id.clone(),
                password_hash,
            },
        );

        self.authenticator
            .issue_token(&id, ExtraClaims::new())
            .expect("Failed to issue token")
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthenticationError> {
        let user = self
            .users
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or(AuthenticationError::InvalidCredentials)?;

        let result = self
            .authenticator
            .authenticate(password, &user.password_hash, &user.id, ExtraClaims::new())
            .await?;

        Ok(result.access_token)
    }

    pub fn user(&self, email: &str) -> Option<StoredUser> {
        self.users.lock().unwrap().get(email).cloned()
    }
}
