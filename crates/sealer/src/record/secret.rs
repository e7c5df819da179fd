//! [`Secret`]: the caller-held sealing passphrase.

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use common::SealError;

/// Shortest secret accepted for sealing, in Unicode scalar values.
///
/// Characters outside the Basic Multilingual Plane count once each. Stores
/// that measured length in UTF-16 units counted them twice, so a secret of
/// eight such characters passed their check and fails this one.
pub const MIN_SECRET_CHARS: usize = 16;

/// Sealing passphrase. Overwritten with zeroes on drop and never printed.
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// # Errors
    ///
    /// [`SealError::Config`] if the secret is shorter than [`MIN_SECRET_CHARS`].
    pub fn check_strength(&self) -> Result<(), SealError> {
        let chars = self.0.chars().count();
        if chars < MIN_SECRET_CHARS {
            return Err(SealError::Config(format!(
                "encryption secret must be at least {MIN_SECRET_CHARS} characters, got {chars}"
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}
