//! Base-32 alternative names for Ed25519 public keys.
//!
//! The 32-octet key is read as a little-endian 256-bit integer and written
//! as 52 base-32 digits, most significant digit first, over the lowercase
//! RFC-4648 alphabet. A leading `e` marks the encoding, giving a
//! 53-character name matching `/^e[a-z2-7]{52}$/`.

const ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";
const NAME_DIGITS: usize = 52;

/// Derive the textual identity of a public key.
pub fn alternative_name(key: &[u8; 32]) -> String {
    let mut name = String::with_capacity(1 + NAME_DIGITS);
    name.push('e');
    for digit in 0..NAME_DIGITS {
        let offset = 5 * (NAME_DIGITS - 1 - digit);
        name.push(ALPHABET[five_bits_at(key, offset)] as char);
    }
    name
}

/// The 5-bit group starting at `offset` in the key's little-endian integer
/// interpretation. Bits past 255 read as zero.
fn five_bits_at(key: &[u8; 32], offset: usize) -> usize {
    let mut acc = 0usize;
    for i in 0..5 {
        let bit = offset + i;
        let byte = bit / 8;
        if byte >= key.len() {
            break;
        }
        acc |= ((key[byte] >> (bit % 8)) as usize & 1) << i;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_from_hex(s: &str) -> [u8; 32] {
        let bytes = hex::decode(s).unwrap();
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        out
    }

    #[test]
    fn known_names() {
        let cases = [
            (
                "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
                "eahy6duobwgqzdalrmfiucmjbceapbygqycykbeeaobqfaqbqeaia",
            ),
            (
                "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
                "eb777777777777777777777777777777777777777777777777777",
            ),
            (
                "3ec5e40e8463329addbacfecf2e66ca7fe6fdb1f8990eb9b73096b18133b2ed9",
                "ebwjohmjrq2yjoon6xeejd7nw77vhnttpf3gpxlozumtdqqhojrj6",
            ),
        ];
        for (key_hex, expected) in cases {
            assert_eq!(alternative_name(&key_from_hex(key_hex)), expected);
        }
    }

    #[test]
    fn shape_and_determinism() {
        for fill in [0u8, 1, 0x42, 0x80, 0xFF] {
            let key = [fill; 32];
            let name = alternative_name(&key);
            assert_eq!(name.len(), 53);
            assert!(name.starts_with('e'));
            assert!(name[1..]
                .bytes()
                .all(|b| b.is_ascii_lowercase() || (b'2'..=b'7').contains(&b)));
            assert_eq!(alternative_name(&key), name);
        }
    }

    #[test]
    fn zero_key_is_all_a() {
        let name = alternative_name(&[0u8; 32]);
        assert_eq!(name, format!("e{}", "a".repeat(52)));
    }

    #[test]
    fn top_bit_drives_the_first_digit() {
        // the first digit carries only bit 255 of the key
        let mut key = [0u8; 32];
        key[31] = 0x80;
        assert!(alternative_name(&key).starts_with("eb"));
        key[31] = 0x7F;
        assert!(alternative_name(&key).starts_with("ea"));
    }

    #[test]
    fn distinct_keys_have_distinct_names() {
        let mut key_a = [5u8; 32];
        let key_b = [5u8; 32];
        key_a[0] ^= 1;
        assert_ne!(alternative_name(&key_a), alternative_name(&key_b));
    }
}
