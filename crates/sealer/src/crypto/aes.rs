//! AES-256 forward cipher (FIPS 197): key schedule and single-block encryption.
//!
//! Only the encryption direction exists. The cipher is used purely as a
//! keystream generator (CTR) and to derive the GHASH subkey, so a block
//! decryption routine would be dead code.
//!
//! The state is kept column-major, `s[row + 4 * col]`, which is the input byte order.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES block length in bytes.
pub const BLOCK_LEN: usize = 16;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

const ROUNDS: usize = 14;
const NK: usize = 8;
const SCHEDULE_WORDS: usize = 4 * (ROUNDS + 1);

/// A 16-byte cipher block.
pub type Block = [u8; BLOCK_LEN];

#[rustfmt::skip]
const SBOX: [u8; 256] = [
    0x63, 0x7c, 0x77, 0x7b, 0xf2, 0x6b, 0x6f, 0xc5, 0x30, 0x01, 0x67, 0x2b, 0xfe, 0xd7, 0xab, 0x76,
    0xca, 0x82, 0xc9, 0x7d, 0xfa, 0x59, 0x47, 0xf0, 0xad, 0xd4, 0xa2, 0xaf, 0x9c, 0xa4, 0x72, 0xc0,
    0xb7, 0xfd, 0x93, 0x26, 0x36, 0x3f, 0xf7, 0xcc, 0x34, 0xa5, 0xe5, 0xf1, 0x71, 0xd8, 0x31, 0x15,
    0x04, 0xc7, 0x23, 0xc3, 0x18, 0x96, 0x05, 0x9a, 0x07, 0x12, 0x80, 0xe2, 0xeb, 0x27, 0xb2, 0x75,
    0x09, 0x83, 0x2c, 0x1a, 0x1b, 0x6e, 0x5a, 0xa0, 0x52, 0x3b, 0xd6, 0xb3, 0x29, 0xe3, 0x2f, 0x84,
    0x53, 0xd1, 0x00, 0xed, 0x20, 0xfc, 0xb1, 0x5b, 0x6a, 0xcb, 0xbe, 0x39, 0x4a, 0x4c, 0x58, 0xcf,
    0xd0, 0xef, 0xaa, 0xfb, 0x43, 0x4d, 0x33, 0x85, 0x45, 0xf9, 0x02, 0x7f, 0x50, 0x3c, 0x9f, 0xa8,
    0x51, 0xa3, 0x40, 0x8f, 0x92, 0x9d, 0x38, 0xf5, 0xbc, 0xb6, 0xda, 0x21, 0x10, 0xff, 0xf3, 0xd2,
    0xcd, 0x0c, 0x13, 0xec, 0x5f, 0x97, 0x44, 0x17, 0xc4, 0xa7, 0x7e, 0x3d, 0x64, 0x5d, 0x19, 0x73,
    0x60, 0x81, 0x4f, 0xdc, 0x22, 0x2a, 0x90, 0x88, 0x46, 0xee, 0xb8, 0x14, 0xde, 0x5e, 0x0b, 0xdb,
    0xe0, 0x32, 0x3a, 0x0a, 0x49, 0x06, 0x24, 0x5c, 0xc2, 0xd3, 0xac, 0x62, 0x91, 0x95, 0xe4, 0x79,
    0xe7, 0xc8, 0x37, 0x6d, 0x8d, 0xd5, 0x4e, 0xa9, 0x6c, 0x56, 0xf4, 0xea, 0x65, 0x7a, 0xae, 0x08,
    0xba, 0x78, 0x25, 0x2e, 0x1c, 0xa6, 0xb4, 0xc6, 0xe8, 0xdd, 0x74, 0x1f, 0x4b, 0xbd, 0x8b, 0x8a,
    0x70, 0x3e, 0xb5, 0x66, 0x48, 0x03, 0xf6, 0x0e, 0x61, 0x35, 0x57, 0xb9, 0x86, 0xc1, 0x1d, 0x9e,
    0xe1, 0xf8, 0x98, 0x11, 0x69, 0xd9, 0x8e, 0x94, 0x9b, 0x1e, 0x87, 0xe9, 0xce, 0x55, 0x28, 0xdf,
    0x8c, 0xa1, 0x89, 0x0d, 0xbf, 0xe6, 0x42, 0x68, 0x41, 0x99, 0x2d, 0x0f, 0xb0, 0x54, 0xbb, 0x16,
];

/// Round constants for the key schedule; only the first seven are needed for Nk = 8.
const RCON: [u32; 7] = [
    0x0100_0000, 0x0200_0000, 0x0400_0000, 0x0800_0000, 0x1000_0000, 0x2000_0000, 0x4000_0000,
];

#[inline(always)]
fn sub_word(w: u32) -> u32 {
    let [a, b, c, d] = w.to_be_bytes();
    u32::from_be_bytes([
        SBOX[a as usize],
        SBOX[b as usize],
        SBOX[c as usize],
        SBOX[d as usize],
    ])
}

/// Multiply by x in GF(2^8) modulo x^8 + x^4 + x^3 + x + 1, without branching on the byte.
#[inline(always)]
fn xtime(a: u8) -> u8 {
    (a << 1) ^ (0x1b & (a >> 7).wrapping_neg())
}

fn sub_bytes(s: &mut Block) {
    for b in s.iter_mut() {
        *b = SBOX[*b as usize];
    }
}

/// Row r rotates left by r columns.
fn shift_rows(s: &mut Block) {
    let t = *s;
    for col in 0..4 {
        for row in 1..4 {
            s[row + 4 * col] = t[row + 4 * ((col + row) % 4)];
        }
    }
}

fn mix_columns(s: &mut Block) {
    for col in s.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
        let all = a0 ^ a1 ^ a2 ^ a3;
        col[0] = a0 ^ all ^ xtime(a0 ^ a1);
        col[1] = a1 ^ all ^ xtime(a1 ^ a2);
        col[2] = a2 ^ all ^ xtime(a2 ^ a3);
        col[3] = a3 ^ all ^ xtime(a3 ^ a0);
    }
}

/// Expanded AES-256 key: 15 round keys of 16 bytes. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Aes256 {
    round_keys: [Block; ROUNDS + 1],
}

impl Aes256 {
    /// Run the Rijndael key expansion over a 32-byte key.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        let mut w = [0u32; SCHEDULE_WORDS];
        for (i, chunk) in key.chunks_exact(4).enumerate() {
            w[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        for i in NK..SCHEDULE_WORDS {
            let mut temp = w[i - 1];
            if i % NK == 0 {
                temp = sub_word(temp.rotate_left(8)) ^ RCON[i / NK - 1];
            } else if i % NK == 4 {
                temp = sub_word(temp);
            }
            w[i] = w[i - NK] ^ temp;
        }

        let mut round_keys = [[0u8; BLOCK_LEN]; ROUNDS + 1];
        for (rk, words) in round_keys.iter_mut().zip(w.chunks_exact(4)) {
            for (dst, word) in rk.chunks_exact_mut(4).zip(words) {
                dst.copy_from_slice(&word.to_be_bytes());
            }
        }
        w.zeroize();

        Self { round_keys }
    }

    fn add_round_key(&self, s: &mut Block, round: usize) {
        for (b, k) in s.iter_mut().zip(self.round_keys[round].iter()) {
            *b ^= k;
        }
    }

    /// Encrypt one 16-byte block.
    pub fn encrypt_block(&self, input: &Block) -> Block {
        let mut s = *input;
        self.add_round_key(&mut s, 0);
        for round in 1..ROUNDS {
            sub_bytes(&mut s);
            shift_rows(&mut s);
            mix_columns(&mut s);
            self.add_round_key(&mut s, round);
        }
        sub_bytes(&mut s);
        shift_rows(&mut s);
        self.add_round_key(&mut s, ROUNDS);
        s
    }
}

impl std::fmt::Debug for Aes256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Aes256([REDACTED])")
    }
}
