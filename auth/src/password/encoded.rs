use std::fmt;

/// Length of the random salt generated for every new hash.
pub const SALT_LENGTH: usize = 16;

/// Length of the derived key produced for every new hash.
pub const KEY_LENGTH: usize = 64;

/// Decoded form of a persisted credential hash.
///
/// The persisted text is `cost:saltHex:keyHex`, with the cost in decimal and
/// both byte strings in lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredHash {
    pub cost: u32,
    pub salt: Vec<u8>,
    pub key: Vec<u8>,
}

impl StoredHash {
    /// Parse a persisted hash.
    ///
    /// Returns `None` unless the input has exactly three non-empty
    /// colon-separated segments, a decimal cost and two hex segments.
    pub fn parse(encoded: &str) -> Option<Self> {
        let mut segments = encoded.split(':');
        let (cost, salt, key) = match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(cost), Some(salt), Some(key), None) => (cost, salt, key),
            _ => return None,
        };

        if cost.is_empty() || salt.is_empty() || key.is_empty() {
            return None;
        }
        if !cost.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(Self {
            cost: cost.parse().ok()?,
            salt: hex::decode(salt).ok()?,
            key: hex::decode(key).ok()?,
        })
    }
}

impl fmt::Display for StoredHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.cost,
            hex::encode(&self.salt),
            hex::encode(&self.key)
        )
    }
}
