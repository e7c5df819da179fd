//! Record sealing: wraps the cipher in the stored `{"v","n","d"}` document.
//!
//! # Lifecycle
//!
//! 1. [`seal_record`] draws a fresh random nonce, encrypts the text, and returns
//!    a [`CiphertextBlob`] carrying the nonce next to the payload.
//! 2. [`open_record`] re-derives key and IV from the stored nonce and the
//!    caller's secret, verifies the tag, and returns the text.
//! 3. [`RecordStore`] persists either form on disk and decides on load whether
//!    a document is sealed or plaintext.
//!
//! # Security invariants
//!
//! - A nonce is never reused: every seal draws a new one from the OS RNG.
//! - Secrets, derived keys, and plaintext never reach logs.

pub mod secret;
pub mod store;

pub use secret::Secret;
pub use store::RecordStore;

use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use tracing::debug;

use common::{protocol::DEFAULT_BLOB_VERSION, CiphertextBlob, SealError};

use crate::crypto::{self, CipherError};

/// Length of a generated record nonce, in characters.
pub const NONCE_LEN: usize = 16;

impl From<CipherError> for SealError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::Format(f) => SealError::Format(f.to_string()),
            CipherError::Auth => SealError::Auth,
        }
    }
}

/// Fresh alphanumeric nonce from the OS RNG.
pub fn generate_nonce() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Sealing parameters for records written by this process.
#[derive(Debug, Clone)]
pub struct Sealing {
    secret: Secret,
    version: u32,
}

impl Sealing {
    /// # Errors
    ///
    /// [`SealError::Config`] if the secret is too short to seal with.
    pub fn new(secret: Secret, version: u32) -> Result<Self, SealError> {
        secret.check_strength()?;
        Ok(Self { secret, version })
    }

    pub fn with_default_version(secret: Secret) -> Result<Self, SealError> {
        Self::new(secret, DEFAULT_BLOB_VERSION)
    }

    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

/// Encrypt `plaintext` under a freshly generated nonce.
pub fn seal_record(plaintext: &str, secret: &Secret, version: u32) -> CiphertextBlob {
    let nonce = generate_nonce();
    let data = crypto::encrypt(plaintext, secret.expose(), &nonce);
    debug!(version, payload_len = data.len(), "record sealed");
    CiphertextBlob::new(version, nonce, data)
}

/// Verify and decrypt a stored blob.
///
/// The version field is informational; every known version uses the same
/// construction.
///
/// # Errors
///
/// - [`SealError::Format`] for undecodable or truncated payloads.
/// - [`SealError::Auth`] when the tag does not verify.
pub fn open_record(blob: &CiphertextBlob, secret: &Secret) -> Result<String, SealError> {
    let text = crypto::decrypt(&blob.data, secret.expose(), &blob.nonce)?;
    debug!(version = blob.version, "record opened");
    Ok(text)
}
