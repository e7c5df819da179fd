//! Text ⇄ byte codec used before hashing and after decryption.
//!
//! `encode` emits standard UTF-8. `decode` is lenient: besides standard UTF-8
//! it accepts the legacy per-unit form in which each UTF-16 surrogate half was
//! written as its own 3-byte sequence, and recombines the pair. Malformed,
//! truncated, or unpaired sequences decode to U+FFFD instead of failing.

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Encode `text` as UTF-8 bytes.
pub fn encode(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Legacy encoder: each 16-bit unit is encoded on its own (1–3 bytes; the
/// 4-byte form is only reachable for values above 0xFFFF, which a `u16` never
/// holds). Surrogate halves therefore come out as separate 3-byte sequences.
pub fn encode_units(units: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(units.len() * 3);
    for &unit in units {
        push_scalar(&mut out, u32::from(unit));
    }
    out
}

fn push_scalar(out: &mut Vec<u8>, c: u32) {
    if c < 0x80 {
        out.push(c as u8);
    } else if c < 0x800 {
        out.push(0xc0 | (c >> 6) as u8);
        out.push(0x80 | (c & 0x3f) as u8);
    } else if c < 0x10000 {
        out.push(0xe0 | (c >> 12) as u8);
        out.push(0x80 | ((c >> 6) & 0x3f) as u8);
        out.push(0x80 | (c & 0x3f) as u8);
    } else {
        out.push(0xf0 | (c >> 18) as u8);
        out.push(0x80 | ((c >> 12) & 0x3f) as u8);
        out.push(0x80 | ((c >> 6) & 0x3f) as u8);
        out.push(0x80 | (c & 0x3f) as u8);
    }
}

/// Read one sequence starting at `bytes[0]`: `(value, width)`, or `None` if
/// the leading byte is invalid or a continuation byte is missing.
fn sequence(bytes: &[u8]) -> Option<(u32, usize)> {
    let lead = *bytes.first()?;
    let (width, bits) = match lead {
        0x00..=0x7f => return Some((u32::from(lead), 1)),
        0xc0..=0xdf => (2, lead & 0x1f),
        0xe0..=0xef => (3, lead & 0x0f),
        0xf0..=0xf7 => (4, lead & 0x07),
        _ => return None,
    };
    let tail = bytes.get(1..width)?;
    let mut value = u32::from(bits);
    for &b in tail {
        if b & 0xc0 != 0x80 {
            return None;
        }
        value = (value << 6) | u32::from(b & 0x3f);
    }
    Some((value, width))
}

/// Decode bytes back into text.
pub fn decode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut pending_high: Option<u32> = None;
    let mut i = 0;

    while i < bytes.len() {
        let Some((value, width)) = sequence(&bytes[i..]) else {
            if pending_high.take().is_some() {
                out.push(REPLACEMENT);
            }
            out.push(REPLACEMENT);
            i += 1;
            continue;
        };
        i += width;

        match value {
            0xd800..=0xdbff => {
                if pending_high.replace(value).is_some() {
                    out.push(REPLACEMENT);
                }
            }
            0xdc00..=0xdfff => match pending_high.take() {
                Some(high) => {
                    let c = 0x10000 + ((high - 0xd800) << 10) + (value - 0xdc00);
                    out.push(char::from_u32(c).unwrap_or(REPLACEMENT));
                }
                None => out.push(REPLACEMENT),
            },
            _ => {
                if pending_high.take().is_some() {
                    out.push(REPLACEMENT);
                }
                out.push(char::from_u32(value).unwrap_or(REPLACEMENT));
            }
        }
    }

    if pending_high.is_some() {
        out.push(REPLACEMENT);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_width() {
        for text in ["plain ascii", "café", "€100", "emoji 😀 here", "{\"ok\":true}", ""] {
            assert_eq!(decode(&encode(text)), text);
        }
    }

    #[test]
    fn encode_is_standard_utf8() {
        assert_eq!(encode("é€😀"), "é€😀".as_bytes());
    }

    #[test]
    fn legacy_units_match_standard_in_the_bmp() {
        let text = "Grüße, Κόσμε, 世界";
        let units: Vec<u16> = text.encode_utf16().collect();
        assert_eq!(encode_units(&units), encode(text));
    }

    #[test]
    fn legacy_surrogate_halves_recombine() {
        let units: Vec<u16> = "a😀b".encode_utf16().collect();
        let legacy = encode_units(&units);
        assert_eq!(legacy, [b'a', 0xed, 0xa0, 0xbd, 0xed, 0xb8, 0x80, b'b']);
        assert_eq!(decode(&legacy), "a😀b");
    }

    #[test]
    fn unpaired_surrogates_are_replaced() {
        // lone high, lone low
        assert_eq!(decode(&[0xed, 0xa0, 0xbd, b'x']), "\u{fffd}x");
        assert_eq!(decode(&[0xed, 0xb8, 0x80]), "\u{fffd}");
        // two highs in a row, then end of input
        assert_eq!(decode(&[0xed, 0xa0, 0xbd, 0xed, 0xa0, 0xbd]), "\u{fffd}\u{fffd}");
    }

    #[test]
    fn truncated_and_invalid_bytes_are_replaced() {
        assert_eq!(decode(&[b'o', b'k', 0xe2, 0x82]), "ok\u{fffd}\u{fffd}");
        assert_eq!(decode(&[0xff, b'a']), "\u{fffd}a");
        assert_eq!(decode(&[0x80]), "\u{fffd}");
    }
}
