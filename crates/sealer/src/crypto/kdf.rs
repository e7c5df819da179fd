//! Per-record key and IV derivation.
//!
//! ```text
//! key = HMAC-SHA512(secret, "key:" ‖ nonce)[0..32]
//! iv  = HMAC-SHA512(secret, "iv:"  ‖ nonce)[0..12]
//! ```
//!
//! Derivation is deterministic so that opening a record needs only the stored
//! nonce and the caller-held secret.

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::aes::KEY_LEN;
use super::ctr::IV_LEN;
use super::hmac::HmacSha512;
use super::utf8;

/// Derived per-record AES-256 key. Overwritten with zeroes on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey(pub [u8; KEY_LEN]);

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key bytes never reach logs.
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Key and IV derived for one `(secret, nonce)` pair; lives for a single call.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    pub key: DerivedKey,
    pub iv: [u8; IV_LEN],
}

fn labelled_mac(secret: &[u8], label: &str, nonce: &str) -> [u8; 64] {
    let mut mac = HmacSha512::new(secret);
    mac.update(label.as_bytes());
    mac.update(&utf8::encode(nonce));
    mac.finalize()
}

/// Derive the record key and IV from the secret and the record nonce.
pub fn derive_key_and_iv(secret: &str, nonce: &str) -> KeyMaterial {
    let mut secret_bytes = utf8::encode(secret);

    let mut key_mac = labelled_mac(&secret_bytes, "key:", nonce);
    let mut iv_mac = labelled_mac(&secret_bytes, "iv:", nonce);

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&key_mac[..KEY_LEN]);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&iv_mac[..IV_LEN]);

    secret_bytes.zeroize();
    key_mac.zeroize();
    iv_mac.zeroize();

    KeyMaterial {
        key: DerivedKey(key),
        iv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef";

    #[test]
    fn matches_hmac_with_prefixed_nonce() {
        let km = derive_key_and_iv(SECRET, "testnonce1");
        let key_mac = HmacSha512::mac(SECRET.as_bytes(), b"key:testnonce1");
        let iv_mac = HmacSha512::mac(SECRET.as_bytes(), b"iv:testnonce1");
        assert_eq!(km.key.0[..], key_mac[..KEY_LEN]);
        assert_eq!(km.iv[..], iv_mac[..IV_LEN]);
    }

    #[test]
    fn deterministic() {
        let a = derive_key_and_iv(SECRET, "n1");
        let b = derive_key_and_iv(SECRET, "n1");
        assert_eq!(a.key.0, b.key.0);
        assert_eq!(a.iv, b.iv);
    }

    #[test]
    fn nonce_and_secret_both_matter() {
        let base = derive_key_and_iv(SECRET, "n1");
        let other_nonce = derive_key_and_iv(SECRET, "n2");
        let other_secret = derive_key_and_iv("fedcba9876543210", "n1");
        assert_ne!(base.key.0, other_nonce.key.0);
        assert_ne!(base.iv, other_nonce.iv);
        assert_ne!(base.key.0, other_secret.key.0);
    }

    #[test]
    fn key_and_iv_use_distinct_labels() {
        let km = derive_key_and_iv(SECRET, "n1");
        assert_ne!(km.key.0[..IV_LEN], km.iv[..]);
    }

    #[test]
    fn debug_is_redacted() {
        let km = derive_key_and_iv(SECRET, "n1");
        let shown = format!("{km:?}");
        assert!(shown.contains("REDACTED"));
    }
}
