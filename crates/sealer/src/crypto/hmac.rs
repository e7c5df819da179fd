//! HMAC-SHA512 (RFC 2104 over a 128-byte block).

use super::sha512::{Sha512, BLOCK_LEN, DIGEST_LEN};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// Streaming HMAC-SHA512.
///
/// Holds both keyed hash states; `finalize` consumes the MAC.
#[derive(Clone)]
pub struct HmacSha512 {
    inner: Sha512,
    outer: Sha512,
}

impl HmacSha512 {
    pub fn new(key: &[u8]) -> Self {
        let mut block = [0u8; BLOCK_LEN];
        if key.len() > BLOCK_LEN {
            block[..DIGEST_LEN].copy_from_slice(&Sha512::digest(key));
        } else {
            block[..key.len()].copy_from_slice(key);
        }

        let mut ipad = [0u8; BLOCK_LEN];
        let mut opad = [0u8; BLOCK_LEN];
        for (i, b) in block.iter().enumerate() {
            ipad[i] = b ^ IPAD;
            opad[i] = b ^ OPAD;
        }

        let mut inner = Sha512::new();
        inner.update(&ipad);
        let mut outer = Sha512::new();
        outer.update(&opad);

        block.fill(0);
        ipad.fill(0);
        opad.fill(0);

        Self { inner, outer }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    pub fn finalize(self) -> [u8; DIGEST_LEN] {
        let Self { inner, mut outer } = self;
        outer.update(&inner.finalize());
        outer.finalize()
    }

    /// One-shot `HMAC-SHA512(key, message)`.
    pub fn mac(key: &[u8], message: &[u8]) -> [u8; DIGEST_LEN] {
        let mut h = Self::new(key);
        h.update(message);
        h.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::hmac::Mac as _;

    fn reference(key: &[u8], msg: &[u8]) -> Vec<u8> {
        let mut mac = ::hmac::Hmac::<sha2::Sha512>::new_from_slice(key).unwrap();
        mac.update(msg);
        mac.finalize().into_bytes().to_vec()
    }

    #[test]
    fn rfc4231_case_2() {
        let tag = HmacSha512::mac(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(tag),
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn key_lengths_match_reference() {
        // Short, exactly one block, and longer than a block (hashed first).
        for key_len in [0usize, 16, 127, 128, 129, 300] {
            let key: Vec<u8> = (0..key_len).map(|i| (i as u8).wrapping_mul(7)).collect();
            let msg = b"key:testnonce1";
            assert_eq!(
                HmacSha512::mac(&key, msg).to_vec(),
                reference(&key, msg),
                "key length {key_len}"
            );
        }
    }

    #[test]
    fn streaming_matches_one_shot() {
        let mut h = HmacSha512::new(b"0123456789abcdef");
        h.update(b"iv:");
        h.update(b"nonce");
        assert_eq!(h.finalize(), HmacSha512::mac(b"0123456789abcdef", b"iv:nonce"));
    }
}
