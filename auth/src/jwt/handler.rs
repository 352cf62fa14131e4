use std::fmt;

use hmac::Hmac;
use hmac::Mac;
use serde::Serialize;
use sha2::Sha256;

use super::claims::Claims;
use super::claims::ExtraClaims;
use super::claims::RawClaims;
use super::encoding::decode_segment;
use super::encoding::encode_segment;
use super::errors::JwtError;
use super::ttl::Ttl;
use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::config::ConfigurationError;
use crate::config::JwtConfig;
use crate::config::RunMode;

type HmacSha256 = Hmac<Sha256>;

/// The only header this codec writes. There is no algorithm negotiation.
#[derive(Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: Header = Header {
    alg: "HS256",
    typ: "JWT",
};

/// Session token codec.
///
/// Issues `header.payload.signature` tokens where every segment is unpadded
/// base64url and the signature is HMAC-SHA256 over `header.payload`, keyed by
/// the process-wide secret. Holds no per-request state and can be shared
/// freely between threads.
pub struct JwtHandler<C = SystemClock> {
    mac: HmacSha256,
    default_ttl: Ttl,
    clock: C,
}

impl JwtHandler<SystemClock> {
    /// Create a handler that reads the wall clock.
    ///
    /// # Errors
    /// * `MissingSecret` - secret is empty
    pub fn new(secret: &[u8], default_ttl: Ttl) -> Result<Self, ConfigurationError> {
        Self::with_clock(secret, default_ttl, SystemClock)
    }

    /// Create a handler from the loaded configuration.
    ///
    /// # Errors
    /// * `MissingSecret` - secret is empty
    /// * `PlaceholderSecret` - production is still using the placeholder secret
    /// * `InvalidTtl` - default lifetime does not parse
    pub fn from_config(config: &JwtConfig, run_mode: RunMode) -> Result<Self, ConfigurationError> {
        config.validate_secret(run_mode)?;
        Self::new(config.secret.as_bytes(), config.default_ttl()?)
    }
}

impl<C: Clock> JwtHandler<C> {
    pub fn with_clock(
        secret: &[u8],
        default_ttl: Ttl,
        clock: C,
    ) -> Result<Self, ConfigurationError> {
        if secret.is_empty() {
            return Err(ConfigurationError::MissingSecret);
        }
        let mac =
            HmacSha256::new_from_slice(secret).map_err(|_| ConfigurationError::MissingSecret)?;

        Ok(Self {
            mac,
            default_ttl,
            clock,
        })
    }

    pub fn default_ttl(&self) -> Ttl {
        self.default_ttl
    }

    /// Issue a token for `subject` with the default lifetime.
    pub fn issue(&self, subject: &str, extra: ExtraClaims) -> Result<String, JwtError> {
        self.issue_with_ttl(subject, extra, self.default_ttl)
    }

    /// Issue a token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    /// * `Configuration` - expiry would overflow the timestamp range
    /// * `EncodingFailed` - claims could not be serialized
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        extra: ExtraClaims,
        ttl: Ttl,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(subject, extra, self.clock.now(), ttl)?;
        let token = self.encode(&claims)?;

        tracing::debug!(subject = %claims.sub, expires_at = claims.exp, "Token issued");

        Ok(token)
    }

    /// Sign already-built claims.
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = serde_json::to_vec(&HEADER)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;
        let payload =
            serde_json::to_vec(claims).map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        let signing_input = format!("{}.{}", encode_segment(header), encode_segment(payload));
        let signature = self.sign(&signing_input);

        Ok(format!("{}.{}", signing_input, encode_segment(signature)))
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    /// * `MalformedToken` - not three non-empty segments, or payload is not a
    ///   claims object with a string subject
    /// * `InvalidSignature` - signature does not match under this secret
    /// * `TokenExpired` - expiry missing or not in the future
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let segments: Vec<&str> = token.split('.').collect();
        let [header, payload, signature] = segments[..] else {
            return Err(JwtError::MalformedToken("expected three segments"));
        };
        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(JwtError::MalformedToken("empty segment"));
        }

        let provided = decode_segment(signature).ok_or(JwtError::InvalidSignature)?;

        let mut mac = self.mac.clone();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        // Constant time; a length mismatch fails before comparing.
        mac.verify_slice(&provided)
            .map_err(|_| JwtError::InvalidSignature)?;

        let payload = decode_segment(payload)
            .ok_or(JwtError::MalformedToken("payload is not base64url"))?;
        let raw: RawClaims = serde_json::from_slice(&payload)
            .map_err(|_| JwtError::MalformedToken("payload is not a claims object"))?;

        raw.into_claims(self.clock.now())
    }

    fn sign(&self, signing_input: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

impl<C> fmt::Debug for JwtHandler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtHandler")
            .field("algorithm", &HEADER.alg)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}
