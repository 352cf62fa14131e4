use std::env;

use config::builder::DefaultState;
use config::Config as ConfigBuilder;
use config::ConfigBuilder as SourceBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use thiserror::Error;

use crate::jwt::Ttl;

/// Smallest cost factor accepted for key derivation.
pub const MIN_COST_FACTOR: u32 = 4;

/// Largest cost factor accepted, for new hashes and stored ones alike.
pub const MAX_COST_FACTOR: u32 = 64;

pub const DEFAULT_COST_FACTOR: u32 = 12;

/// Well-known signing secret used when none is configured.
///
/// Accepted outside production only.
pub const PLACEHOLDER_SECRET: &str = "development-secret-change-me";

pub const DEFAULT_EXPIRES_IN: &str = "7d";

pub const DEFAULT_COOKIE_NAME: &str = "sgf_session";

pub const DEFAULT_COOKIE_MAX_AGE_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Error for invalid or unloadable configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Cost factor must be an integer between 4 and 64, got {0}")]
    InvalidCostFactor(u32),

    #[error("Unsupported token lifetime: {0:?}")]
    InvalidTtl(String),

    #[error("Token signing secret must be defined")]
    MissingSecret,

    #[error("Placeholder token signing secret is not allowed in production")]
    PlaceholderSecret,

    #[error("Cookie max age must be a positive number of milliseconds")]
    InvalidCookieMaxAge,

    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
}

pub(crate) fn validate_cost_factor(cost: u32) -> Result<u32, ConfigurationError> {
    if !(MIN_COST_FACTOR..=MAX_COST_FACTOR).contains(&cost) {
        return Err(ConfigurationError::InvalidCostFactor(cost));
    }
    Ok(cost)
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Development,
    Production,
    Test,
}

impl RunMode {
    /// Unknown names fall back to development.
    pub fn from_name(name: &str) -> Self {
        match name {
            "production" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default)]
    pub run_mode: RunMode,
    pub password: PasswordConfig,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub cost_factor: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub max_age_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::default(),
            password: PasswordConfig {
                cost_factor: DEFAULT_COST_FACTOR,
            },
            jwt: JwtConfig {
                secret: PLACEHOLDER_SECRET.to_string(),
                expires_in: DEFAULT_EXPIRES_IN.to_string(),
            },
            cookie: CookieConfig {
                name: DEFAULT_COOKIE_NAME.to_string(),
                max_age_ms: DEFAULT_COOKIE_MAX_AGE_MS,
            },
        }
    }
}

impl AuthConfig {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH__JWT__SECRET, AUTH__PASSWORD__COST_FACTOR, etc.)
    /// 2. Environment-specific config file (config/{run_mode}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigurationError> {
        let run_mode = RunMode::from_name(&env::var("RUN_MODE").unwrap_or_default());

        let builder = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode.as_str())).required(false))
            // Example: AUTH__JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("AUTH").separator("__"))
            .set_override("run_mode", run_mode.as_str())?;

        Self::from_builder(builder)
    }

    /// Build, deserialize and validate configuration from prepared sources.
    ///
    /// Built-in defaults are layered underneath whatever the builder holds.
    pub fn from_builder(
        builder: SourceBuilder<DefaultState>,
    ) -> Result<Self, ConfigurationError> {
        let defaults = Self::default();

        let configuration = builder
            .set_default("run_mode", defaults.run_mode.as_str())?
            .set_default("password.cost_factor", defaults.password.cost_factor)?
            .set_default("jwt.secret", defaults.jwt.secret)?
            .set_default("jwt.expires_in", defaults.jwt.expires_in)?
            .set_default("cookie.name", defaults.cookie.name)?
            .set_default("cookie.max_age_ms", defaults.cookie.max_age_ms)?
            .build()?;

        let config: AuthConfig = configuration.try_deserialize()?;
        config.validate()?;

        tracing::debug!(
            run_mode = config.run_mode.as_str(),
            cost_factor = config.password.cost_factor,
            expires_in = %config.jwt.expires_in,
            cookie_name = %config.cookie.name,
            "Auth configuration loaded"
        );

        Ok(config)
    }

    /// Check every setting that would otherwise fail later, per request.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate_cost_factor(self.password.cost_factor)?;
        self.jwt.default_ttl()?;

        self.jwt.validate_secret(self.run_mode)?;

        if self.cookie.max_age_ms == 0 {
            return Err(ConfigurationError::InvalidCookieMaxAge);
        }

        Ok(())
    }
}

impl JwtConfig {
    pub fn default_ttl(&self) -> Result<Ttl, ConfigurationError> {
        self.expires_in.parse()
    }

    /// The secret must be set, and production never signs with the placeholder.
    pub fn validate_secret(&self, run_mode: RunMode) -> Result<(), ConfigurationError> {
        if self.secret.is_empty() {
            return Err(ConfigurationError::MissingSecret);
        }
        if run_mode.is_production() && self.secret == PLACEHOLDER_SECRET {
            return Err(ConfigurationError::PlaceholderSecret);
        }
        Ok(())
    }
}
