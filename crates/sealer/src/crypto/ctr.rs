//! Counter-mode keystream over [`Aes256`].
//!
//! Counter block = 12-byte IV ‖ 32-bit big-endian counter. Counter 0 is J0 and
//! masks the tag only; payload keystream starts at counter 1.

use super::aes::{Aes256, Block, BLOCK_LEN};

/// IV length in bytes (96-bit GCM convention).
pub const IV_LEN: usize = 12;

/// Counter value of the J0 block.
pub const J0_COUNTER: u32 = 0;

/// Build `iv ‖ counter` (counter big-endian).
pub fn counter_block(iv: &[u8; IV_LEN], counter: u32) -> Block {
    let mut block = [0u8; BLOCK_LEN];
    block[..IV_LEN].copy_from_slice(iv);
    block[IV_LEN..].copy_from_slice(&counter.to_be_bytes());
    block
}

/// Increment the low 32 bits of a counter block, wrapping, with no carry into the IV.
pub fn inc32(block: &Block) -> Block {
    let mut out = *block;
    let low = u32::from_be_bytes([block[12], block[13], block[14], block[15]]);
    out[IV_LEN..].copy_from_slice(&low.wrapping_add(1).to_be_bytes());
    out
}

/// XOR `data` in place with the keystream starting at counter block `first`.
///
/// The same call encrypts and decrypts.
pub fn apply_keystream(cipher: &Aes256, first: &Block, data: &mut [u8]) {
    let mut counter = *first;
    for chunk in data.chunks_mut(BLOCK_LEN) {
        let keystream = cipher.encrypt_block(&counter);
        for (b, k) in chunk.iter_mut().zip(keystream.iter()) {
            *b ^= k;
        }
        counter = inc32(&counter);
    }
}
