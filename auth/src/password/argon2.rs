use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;

use super::encoded::StoredHash;
use super::encoded::KEY_LENGTH;
use super::encoded::SALT_LENGTH;
use super::errors::PasswordError;
use crate::config::validate_cost_factor;
use crate::config::ConfigurationError;
use crate::config::PasswordConfig;
use crate::config::DEFAULT_COST_FACTOR;

/// Memory cost in KiB, fixed so stored hashes stay verifiable.
const MEMORY_COST_KIB: u32 = Params::DEFAULT_M_COST;

const PARALLELISM: u32 = 1;

const MIN_SALT_LENGTH: usize = 8;

const MIN_KEY_LENGTH: usize = Params::MIN_OUTPUT_LEN;

/// Password hashing implementation.
///
/// Derives keys with raw Argon2id where the cost factor is the number of
/// passes over memory. Hashes are self-describing (`cost:saltHex:keyHex`), so
/// a hash created under one cost keeps verifying after the configured cost
/// changes.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a password hasher with the given default cost factor.
    ///
    /// # Errors
    /// * `InvalidCostFactor` - cost is below the accepted minimum
    pub fn new(cost: u32) -> Result<Self, ConfigurationError> {
        Ok(Self {
            cost: validate_cost_factor(cost)?,
        })
    }

    /// Create a password hasher from the loaded configuration.
    pub fn from_config(config: &PasswordConfig) -> Result<Self, ConfigurationError> {
        Self::new(config.cost_factor)
    }

    /// Default cost factor used by `hash`.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with the configured cost.
    ///
    /// # Returns
    /// Encoded hash `cost:saltHex:keyHex` with a fresh 16-byte salt
    ///
    /// # Errors
    /// * `EmptyPassword` - plaintext is empty
    /// * `HashingFailed` - the key derivation itself failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        self.hash_with_cost(password, self.cost)
    }

    /// Hash a plaintext password with an explicit cost factor.
    ///
    /// # Errors
    /// * `EmptyPassword` - plaintext is empty
    /// * `Configuration` - cost factor is below the accepted minimum
    /// * `HashingFailed` - the key derivation itself failed
    pub fn hash_with_cost(&self, password: &str, cost: u32) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::EmptyPassword);
        }
        let cost = validate_cost_factor(cost)?;

        let mut salt = vec![0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);

        let key = derive_key(password.as_bytes(), &salt, cost, KEY_LENGTH)?;

        Ok(StoredHash { cost, salt, key }.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// Malformed stored hashes and wrong passwords both yield `Ok(false)`;
    /// the caller never learns which one it was.
    ///
    /// # Errors
    /// * `HashingFailed` - the key derivation itself failed
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let Some(stored) = StoredHash::parse(hash) else {
            return Ok(false);
        };

        if validate_cost_factor(stored.cost).is_err()
            || stored.salt.len() < MIN_SALT_LENGTH
            || stored.key.len() < MIN_KEY_LENGTH
        {
            return Ok(false);
        }

        let derived = derive_key(password.as_bytes(), &stored.salt, stored.cost, stored.key.len())?;

        Ok(constant_time_eq(&derived, &stored.key))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_COST_FACTOR,
        }
    }
}

fn derive_key(
    password: &[u8],
    salt: &[u8],
    cost: u32,
    key_length: usize,
) -> Result<Vec<u8>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, cost, PARALLELISM, Some(key_length))
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = vec![0u8; key_length];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(key)
}

/// Byte equality whose running time does not depend on the contents.
/// Buffers of different length are unequal without comparing.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
