//! The bcrypt base64 variant.
//!
//! bcrypt does not invent a new encoding; it reuses standard base64 and then
//! substitutes characters position-for-position into its own alphabet
//! (`./A-Za-z0-9` ordering, no padding). This module holds the two alphabet
//! tables, the bijective remap in both directions, and the standard-base64
//! engine used for the binary leg of the conversion.

use base64::alphabet::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::BcryptError;

/// The standard base64 alphabet, in table order.
pub const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// The bcrypt base64 alphabet, in table order.
pub const BASE64_ALPHABET_BCRYPT: &[u8; 64] =
    b"./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Standard base64, no padding on encode, lenient on decode (padding
/// optional, trailing bits ignored). Matches how the reference treats the
/// 22-character salt field, which carries 132 bits for a 128-bit value.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

fn remap(s: &str, from: &[u8; 64], to: &[u8; 64]) -> Result<String, BcryptError> {
    s.bytes()
        .map(|c| match from.iter().position(|&a| a == c) {
            Some(idx) => Ok(to[idx] as char),
            None => Err(BcryptError::InvalidSaltEncoding(format!(
                "unexpected character {:?}",
                c as char
            ))),
        })
        .collect()
}

/// Substitutes a standard-base64 string into the bcrypt alphabet.
pub fn base64_to_base64_bcrypt(s: &str) -> Result<String, BcryptError> {
    remap(s, BASE64_ALPHABET, BASE64_ALPHABET_BCRYPT)
}

/// Substitutes a bcrypt-base64 string back into the standard alphabet.
pub fn base64_bcrypt_to_base64(s: &str) -> Result<String, BcryptError> {
    remap(s, BASE64_ALPHABET_BCRYPT, BASE64_ALPHABET)
}

/// Encodes raw bytes into bcrypt base64.
pub fn encode_base64_bcrypt(bytes: &[u8]) -> Result<String, BcryptError> {
    base64_to_base64_bcrypt(&STANDARD_LENIENT.encode(bytes))
}

/// Decodes a bcrypt-base64 string to raw bytes, rejecting any character
/// outside the bcrypt alphabet.
pub fn decode_base64_bcrypt(s: &str) -> Result<Vec<u8>, BcryptError> {
    let standard = base64_bcrypt_to_base64(s)?;
    STANDARD_LENIENT
        .decode(standard)
        .map_err(|e| BcryptError::InvalidSaltEncoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remap_reference_salt() {
        let b = base64_to_base64_bcrypt("T84/9HGuysKzz/EoKSDbnQ").unwrap();
        assert_eq!(b, "R6297FEswqIxx9CmIQBZlO");
        let bb = base64_bcrypt_to_base64(&b).unwrap();
        assert_eq!(bb, "T84/9HGuysKzz/EoKSDbnQ");
    }

    #[test]
    fn remap_round_trips_whole_alphabet() {
        let all: String = BASE64_ALPHABET_BCRYPT.iter().map(|&c| c as char).collect();
        let std = base64_bcrypt_to_base64(&all).unwrap();
        assert_eq!(base64_to_base64_bcrypt(&std).unwrap(), all);
    }

    #[test]
    fn remap_rejects_foreign_characters() {
        assert!(matches!(
            base64_bcrypt_to_base64("abc$def"),
            Err(BcryptError::InvalidSaltEncoding(_))
        ));
        // '+' belongs to the standard alphabet only
        assert!(base64_bcrypt_to_base64("ab+cd").is_err());
        assert!(base64_to_base64_bcrypt("ab.cd").is_err());
    }

    #[test]
    fn encode_decode_salt_bytes() {
        let salt = [
            0x4f, 0xce, 0x3f, 0xf4, 0x71, 0xae, 0xca, 0xc2, 0xb3, 0xcf, 0xf1, 0x28, 0x29, 0x20,
            0xdb, 0x9d,
        ];
        let encoded = encode_base64_bcrypt(&salt).unwrap();
        assert_eq!(encoded, "R6297FEswqIxx9CmIQBZlO");
        assert_eq!(encoded.len(), 22);
        assert_eq!(decode_base64_bcrypt(&encoded).unwrap(), salt);
    }

    #[test]
    fn decode_tolerates_nonzero_trailing_bits() {
        // 22 characters carry 132 bits; the final 4 are discarded on decode
        // whether or not they are zero, like the reference does.
        let decoded = decode_base64_bcrypt("R6297FEswqIxx9CmIQBZlP").unwrap();
        assert_eq!(decoded.len(), 16);
    }
}
