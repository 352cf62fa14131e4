use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;
use super::ttl::Ttl;
use crate::config::ConfigurationError;

/// Claim names owned by the token codec. Extension claims can never set them.
pub const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// Caller-supplied claims carried opaquely alongside the reserved ones.
pub type ExtraClaims = BTreeMap<String, serde_json::Value>;

/// Session token payload.
///
/// A fixed set of reserved claims plus an extension map flattened beside them
/// on the wire: `{"sub": .., "iat": .., "exp": .., <extra>...}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Additional caller claims; never contains a reserved name
    #[serde(flatten)]
    extra: ExtraClaims,
}

impl Claims {
    /// Create claims for a subject, valid for `ttl` starting at `issued_at`.
    ///
    /// Reserved names are dropped from `extra`, so the subject and timestamps
    /// always win over caller claims.
    pub fn new(
        subject: impl ToString,
        extra: ExtraClaims,
        issued_at: i64,
        ttl: Ttl,
    ) -> Result<Self, ConfigurationError> {
        let exp = issued_at
            .checked_add(ttl.as_secs())
            .ok_or_else(|| ConfigurationError::InvalidTtl(ttl.as_secs().to_string()))?;

        Ok(Self {
            sub: subject.to_string(),
            iat: issued_at,
            exp,
            extra: strip_reserved(extra),
        })
    }

    /// Add a custom field. Reserved names are ignored.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        let key = key.to_string();
        if is_reserved(&key) {
            return self;
        }
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key, json_value);
        }
        self
    }

    pub fn extra(&self) -> &ExtraClaims {
        &self.extra
    }

    /// Get a custom string field.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// A token is valid only strictly before its expiration.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }
}

/// Payload as it appears in an untrusted token, before structural checks.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    sub: String,
    iat: Option<i64>,
    exp: Option<i64>,
    #[serde(flatten)]
    extra: ExtraClaims,
}

impl RawClaims {
    pub(crate) fn into_claims(self, current_timestamp: i64) -> Result<Claims, JwtError> {
        let iat = self
            .iat
            .ok_or(JwtError::MalformedToken("missing issued-at claim"))?;
        let exp = self.exp.ok_or(JwtError::TokenExpired)?;

        let claims = Claims {
            sub: self.sub,
            iat,
            exp,
            extra: self.extra,
        };

        if claims.is_expired(current_timestamp) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}

fn is_reserved(key: &str) -> bool {
    RESERVED_CLAIMS.contains(&key)
}

fn strip_reserved(mut extra: ExtraClaims) -> ExtraClaims {
    extra.retain(|key, _| !is_reserved(key));
    extra
}
