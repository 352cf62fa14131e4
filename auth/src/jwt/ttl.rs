use std::str::FromStr;

use crate::config::ConfigurationError;

/// Token lifetime in whole seconds. Always positive.
///
/// Parsed from either a plain integer (`"3600"`) or a count with a unit
/// suffix: `s`, `m`, `h` or `d` (`"15m"`, `"7d"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ttl(i64);

impl Ttl {
    pub fn from_secs(secs: u64) -> Result<Self, ConfigurationError> {
        match i64::try_from(secs) {
            Ok(secs) if secs > 0 => Ok(Self(secs)),
            _ => Err(ConfigurationError::InvalidTtl(secs.to_string())),
        }
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }
}

impl TryFrom<u64> for Ttl {
    type Error = ConfigurationError;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::from_secs(secs)
    }
}

impl FromStr for Ttl {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::InvalidTtl(value.to_string());

        let (amount, multiplier) = match value.char_indices().last() {
            Some((_, c)) if c.is_ascii_digit() => (value, 1),
            Some((index, unit)) => {
                let multiplier = match unit {
                    's' => 1,
                    'm' => 60,
                    'h' => 60 * 60,
                    'd' => 24 * 60 * 60,
                    _ => return Err(invalid()),
                };
                (&value[..index], multiplier)
            }
            None => return Err(invalid()),
        };

        if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        amount
            .parse::<u64>()
            .ok()
            .and_then(|amount| amount.checked_mul(multiplier))
            .ok_or_else(invalid)
            .and_then(|secs| Self::from_secs(secs).map_err(|_| invalid()))
    }
}
