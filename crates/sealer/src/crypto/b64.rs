//! Base64 transport encoding for sealed payloads (RFC 4648, standard alphabet).
//!
//! Encoding always pads with `=`. Decoding first strips every character outside
//! `A–Z a–z 0–9 + / =` (line breaks, whitespace, stray punctuation), then
//! decodes with or without padding. The decoded length is exactly the one the
//! padding implies.

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
        DecodePaddingMode,
    },
    Engine as _,
};

pub use base64::DecodeError;

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

fn in_alphabet(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// # Errors
///
/// Returns [`DecodeError`] when the filtered input is still not valid base64
/// (impossible length, misplaced padding).
pub fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    let filtered: String = text.chars().filter(|&c| in_alphabet(c)).collect();
    LENIENT.decode(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4648_vectors() {
        let cases = [
            ("", ""),
            ("f", "Zg=="),
            ("fo", "Zm8="),
            ("foo", "Zm9v"),
            ("foob", "Zm9vYg=="),
            ("fooba", "Zm9vYmE="),
            ("foobar", "Zm9vYmFy"),
        ];
        for (plain, encoded) in cases {
            assert_eq!(encode(plain.as_bytes()), encoded);
            assert_eq!(decode(encoded).unwrap(), plain.as_bytes());
        }
    }

    #[test]
    fn decode_strips_foreign_characters() {
        assert_eq!(decode("Zm9v\nYmFy\r\n").unwrap(), b"foobar");
        assert_eq!(decode(" Zm 9v-Yg== ").unwrap(), b"foob");
    }

    #[test]
    fn decode_accepts_missing_padding() {
        assert_eq!(decode("Zm9vYg").unwrap(), b"foob");
    }

    #[test]
    fn decode_rejects_impossible_length() {
        assert!(decode("Zm9vY").is_err());
    }

    #[test]
    fn decode_rejects_interior_padding() {
        assert!(decode("Zg==Zm9v").is_err());
    }

    #[test]
    fn binary_round_trip() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
    }
}
