//! AES-256-GCM sealing and opening of text records under nonce-derived keys.
//!
//! **Key handling:** every call derives a fresh key and IV from
//! `(secret, nonce)` (see [`super::kdf`]). Reusing a nonce with the same secret
//! reuses the keystream, which breaks both confidentiality and authentication.
//! Callers must generate a fresh random nonce per encryption.
//!
//! **Framing:** the base64 payload is `J0 (16) ‖ ciphertext (N) ‖ tag (16)`.
//! New payloads use `J0 = IV ‖ 00000000` and start the keystream at counter 1.
//! Opening trusts the stored J0 for both the tag mask and the keystream start
//! (`inc32(J0)`), which also covers payloads written with `J0 = IV ‖ 00000001`.

use subtle::ConstantTimeEq;
use thiserror::Error;

use super::aes::{Aes256, Block, BLOCK_LEN};
use super::b64;
use super::ctr::{apply_keystream, counter_block, inc32, J0_COUNTER};
use super::ghash::GHash;
use super::kdf::derive_key_and_iv;
use super::utf8;

/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Length of the J0 block stored in front of the ciphertext.
pub const J0_LEN: usize = BLOCK_LEN;

/// Smallest decoded payload: J0 and tag around an empty ciphertext.
pub const MIN_PAYLOAD_LEN: usize = J0_LEN + TAG_LEN;

/// Malformed sealed payloads, detected before any cryptographic work.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The payload is not decodable base64.
    #[error("payload is not valid base64: {0}")]
    InvalidBase64(#[from] b64::DecodeError),

    /// The decoded payload cannot hold J0 and a tag.
    #[error("payload too short: {len} bytes, need at least {MIN_PAYLOAD_LEN}")]
    Truncated { len: usize },
}

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("invalid ciphertext format: {0}")]
    Format(#[from] FormatError),

    /// Tag mismatch: tampering, corruption, or the wrong secret or nonce.
    #[error("authentication tag mismatch")]
    Auth,
}

/// GCM tag over `(aad, ciphertext)` masked with `E_K(J0)`.
fn compute_tag(cipher: &Aes256, j0: &Block, aad: &[u8], ciphertext: &[u8]) -> Block {
    let mut ghash = GHash::with_cipher(cipher);
    ghash.update(aad);
    ghash.update(ciphertext);
    let mut tag = ghash.finalize(aad.len(), ciphertext.len());
    let mask = cipher.encrypt_block(j0);
    for (t, m) in tag.iter_mut().zip(mask.iter()) {
        *t ^= m;
    }
    tag
}

/// Encrypt `plaintext` under an expanded key and explicit J0.
///
/// Returns `(ciphertext, tag)`. The keystream starts at `inc32(J0)`, so with
/// `J0 = IV ‖ 00000001` this is standard AES-256-GCM with a 96-bit IV.
pub fn seal(cipher: &Aes256, j0: &Block, aad: &[u8], plaintext: &[u8]) -> (Vec<u8>, Block) {
    let mut ciphertext = plaintext.to_vec();
    apply_keystream(cipher, &inc32(j0), &mut ciphertext);
    let tag = compute_tag(cipher, j0, aad, &ciphertext);
    (ciphertext, tag)
}

/// Verify `tag` and decrypt. Nothing is decrypted unless the tag matches.
///
/// # Errors
///
/// Returns [`CipherError::Auth`] on tag mismatch.
pub fn open(
    cipher: &Aes256,
    j0: &Block,
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
) -> Result<Vec<u8>, CipherError> {
    let expected = compute_tag(cipher, j0, aad, ciphertext);
    if !bool::from(expected.ct_eq(tag)) {
        return Err(CipherError::Auth);
    }
    let mut plaintext = ciphertext.to_vec();
    apply_keystream(cipher, &inc32(j0), &mut plaintext);
    Ok(plaintext)
}

/// Encrypt a text record with associated data, returning the base64 payload.
pub fn encrypt_with_aad(plaintext: &str, aad: &[u8], secret: &str, nonce: &str) -> String {
    let km = derive_key_and_iv(secret, nonce);
    let cipher = Aes256::new(&km.key.0);
    let j0 = counter_block(&km.iv, J0_COUNTER);

    let (ciphertext, tag) = seal(&cipher, &j0, aad, &utf8::encode(plaintext));

    let mut framed = Vec::with_capacity(J0_LEN + ciphertext.len() + TAG_LEN);
    framed.extend_from_slice(&j0);
    framed.extend_from_slice(&ciphertext);
    framed.extend_from_slice(&tag);
    b64::encode(&framed)
}

/// Verify and decrypt a base64 payload with associated data.
///
/// # Errors
///
/// - [`CipherError::Format`] if the payload is not base64 or is shorter than
///   [`MIN_PAYLOAD_LEN`] bytes once decoded. No key derivation happens first.
/// - [`CipherError::Auth`] if the tag does not verify.
pub fn decrypt_with_aad(
    payload: &str,
    aad: &[u8],
    secret: &str,
    nonce: &str,
) -> Result<String, CipherError> {
    let framed = b64::decode(payload).map_err(FormatError::from)?;
    if framed.len() < MIN_PAYLOAD_LEN {
        return Err(FormatError::Truncated { len: framed.len() }.into());
    }

    let (j0_bytes, rest) = framed.split_at(J0_LEN);
    let (ciphertext, tag_bytes) = rest.split_at(rest.len() - TAG_LEN);
    let mut j0 = [0u8; J0_LEN];
    j0.copy_from_slice(j0_bytes);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(tag_bytes);

    let km = derive_key_and_iv(secret, nonce);
    let cipher = Aes256::new(&km.key.0);
    let plaintext = open(&cipher, &j0, aad, ciphertext, &tag)?;
    Ok(utf8::decode(&plaintext))
}

/// Encrypt a text record. Record sealing never uses associated data.
pub fn encrypt(plaintext: &str, secret: &str, nonce: &str) -> String {
    encrypt_with_aad(plaintext, &[], secret, nonce)
}

/// Verify and decrypt a payload produced by [`encrypt`].
///
/// # Errors
///
/// See [`decrypt_with_aad`].
pub fn decrypt(payload: &str, secret: &str, nonce: &str) -> Result<String, CipherError> {
    decrypt_with_aad(payload, &[], secret, nonce)
}
