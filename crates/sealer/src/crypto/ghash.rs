//! GHASH over GF(2^128) for the GCM tag.
//!
//! Blocks are read as big-endian `u128`, so bit 0 of the GCM bit order is the
//! most significant bit of the integer. Reduction is by R = 0xE1 ‖ 0^120.

use super::aes::{Aes256, Block, BLOCK_LEN};

const R: u128 = 0xe1 << 120;

/// `x · y` in GF(2^128), 128-step shift-and-add.
///
/// Bit tests become all-ones/all-zeros masks so neither operand drives a branch.
pub fn gf128_mul(x: u128, y: u128) -> u128 {
    let mut z = 0u128;
    let mut v = y;
    for i in 0..128 {
        let bit = (x >> (127 - i)) & 1;
        z ^= v & bit.wrapping_neg();
        let lsb = v & 1;
        v = (v >> 1) ^ (R & lsb.wrapping_neg());
    }
    z
}

/// Incremental GHASH keyed by the subkey H.
#[derive(Clone)]
pub struct GHash {
    h: u128,
    state: u128,
}

impl GHash {
    pub fn new(h: &Block) -> Self {
        Self {
            h: u128::from_be_bytes(*h),
            state: 0,
        }
    }

    /// Derive `H = AES_K(0^128)` and start a hash under it.
    pub fn with_cipher(cipher: &Aes256) -> Self {
        Self::new(&cipher.encrypt_block(&[0u8; BLOCK_LEN]))
    }

    /// Fold `data` as zero-padded 16-byte blocks.
    ///
    /// Padding is per call: AAD and ciphertext must each be passed in a single
    /// `update` for the standard GCM layout.
    pub fn update(&mut self, data: &[u8]) {
        for chunk in data.chunks(BLOCK_LEN) {
            let mut block = [0u8; BLOCK_LEN];
            block[..chunk.len()].copy_from_slice(chunk);
            self.state = gf128_mul(self.state ^ u128::from_be_bytes(block), self.h);
        }
    }

    /// Fold the length block (`len(A)` ‖ `len(C)` in bits) and return the hash.
    pub fn finalize(mut self, aad_len: usize, ciphertext_len: usize) -> Block {
        let lengths = ((aad_len as u128 * 8) << 64) | (ciphertext_len as u128 * 8);
        self.state = gf128_mul(self.state ^ lengths, self.h);
        self.state.to_be_bytes()
    }
}

/// `GHASH_H(A, C)` in one call.
pub fn ghash(h: &Block, aad: &[u8], ciphertext: &[u8]) -> Block {
    let mut g = GHash::new(h);
    g.update(aad);
    g.update(ciphertext);
    g.finalize(aad.len(), ciphertext.len())
}
