//! Authenticated record encryption built from first principles.
//!
//! The layers stack bottom-up: text codecs ([`utf8`], [`b64`]), hashing
//! ([`sha512`], [`hmac`]), per-record derivation ([`kdf`]), the block cipher
//! ([`aes`]) and its modes ([`ctr`], [`ghash`]), and finally the AEAD
//! orchestration in [`cipher`].
//!
//! # Payload format
//!
//! ```text
//! base64( J0 (16 bytes) ‖ ciphertext (N bytes) ‖ tag (16 bytes) )
//! ```
//!
//! Key and IV are derived from `(secret, nonce)`; the nonce travels next to
//! the payload in the stored record (see [`crate::record`]).
//!
//! Every function here is synchronous and free of shared mutable state.

pub mod aes;
pub mod b64;
pub mod cipher;
pub mod ctr;
pub mod ghash;
pub mod hmac;
pub mod kdf;
pub mod sha512;
pub mod utf8;

pub use aes::KEY_LEN;
pub use cipher::{decrypt, decrypt_with_aad, encrypt, encrypt_with_aad, CipherError, FormatError};
pub use ctr::IV_LEN;
pub use kdf::{derive_key_and_iv, KeyMaterial};
