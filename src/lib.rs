//! bcrypt password hashing in Rust from scratch.
//!
//! bcrypt is an adaptive password-hashing scheme built on the Blowfish
//! cipher: an expensive, salt-dependent key schedule (EksBlowfish) is
//! repeated `2^cost` times and the resulting state encrypts a fixed
//! plaintext 64 times. Doubling the cost doubles the work, which is the
//! knob that keeps brute force expensive as hardware improves.
//!
//! This crate produces and verifies hashes in the classic `$2a$` format:
//!
//! ```
//! let hashed = bcrypt_rust::hash("correct horse", 4, None).unwrap();
//! assert_eq!(hashed.len(), 60);
//! assert!(bcrypt_rust::verify("correct horse", &hashed));
//! assert!(!bcrypt_rust::verify("incorrect horse", &hashed));
//! ```

mod alphabet;
mod constants;
mod crypt;
mod error;
mod salt;

pub use crate::alphabet::{
    base64_bcrypt_to_base64, base64_to_base64_bcrypt, decode_base64_bcrypt, encode_base64_bcrypt,
    BASE64_ALPHABET, BASE64_ALPHABET_BCRYPT,
};
pub use crate::constants::{
    ALG, BLOWFISH_NUM_ROUNDS, C_ORIG, DEFAULT_COST, MAX_COST, MIN_COST, P_ORIG, SALT_LENGTH,
    S_ORIG,
};
pub use crate::crypt::{crypt, ekskey, encipher, key, stream2word};
pub use crate::error::BcryptError;
pub use crate::salt::generate_salt;

/// Validates the cost exponent and renders it as the two-digit,
/// zero-padded field of the hash string.
fn cost_field(cost: u32) -> Result<String, BcryptError> {
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(BcryptError::InvalidCost(format!(
            "cost must be between {} and {}, got {}",
            MIN_COST, MAX_COST, cost
        )));
    }
    Ok(format!("{:02}", cost))
}

/// Hashes a password with the bcrypt algorithm.
///
/// `cost` is the base-2 exponent of the round count and must be between 4
/// and 31 ([`DEFAULT_COST`] is the usual choice). `salt`, when supplied,
/// must be a 22-character bcrypt-base64 string as found in an existing hash;
/// when `None`, 16 fresh random bytes are drawn from [`generate_salt`].
///
/// The password is NUL-terminated before hashing if it is not already.
/// Passwords longer than the key-schedule width simply wrap around
/// cyclically rather than being truncated at 72 bytes, matching the
/// reference implementation this crate is compatible with.
///
/// Returns the 60-character `$2a$CC$<salt><hash>` string.
pub fn hash(password: &str, cost: u32, salt: Option<&str>) -> Result<String, BcryptError> {
    let cc = cost_field(cost)?;

    let mut content = password.to_owned();
    if !content.ends_with('\0') {
        content.push('\0');
    }

    let salt_bytes = match salt {
        Some(s) => decode_base64_bcrypt(s)?,
        None => generate_salt().to_vec(),
    };
    if salt_bytes.len() != SALT_LENGTH {
        return Err(BcryptError::InvalidSaltLength(format!(
            "expected {} bytes, got {}",
            SALT_LENGTH,
            salt_bytes.len()
        )));
    }

    // 16 bytes always re-encode to exactly 22 characters
    let ss = encode_base64_bcrypt(&salt_bytes)?;
    if ss.len() != 22 {
        return Err(BcryptError::InvalidSaltLength(format!(
            "salt encoded to {} characters",
            ss.len()
        )));
    }

    let raw = crypt(content.as_bytes(), &salt_bytes, cost);
    // the final byte of the 24-byte digest is dropped, leaving 31 characters
    let hh = encode_base64_bcrypt(&raw[..raw.len() - 1])?;
    if hh.len() != 31 {
        return Err(BcryptError::MalformedHash(format!(
            "hash body encoded to {} characters",
            hh.len()
        )));
    }

    Ok(format!("${}${}${}{}", ALG, cc, ss, hh))
}

/// Verifies a password against an existing bcrypt hash.
///
/// The hash is structurally validated (60 characters, four `$`-delimited
/// fields, `2a` tag, cost within range), the salt is extracted, and the
/// hash is recomputed and compared. Malformed input of any kind yields
/// `false`; this function never panics or returns an error.
///
/// The final comparison is ordinary string equality, as in the reference
/// implementation. It is not constant-time, so a caller worried about
/// remote timing measurements should layer their own hardening on top.
pub fn verify(password: &str, existing: &str) -> bool {
    if existing.len() != 60 {
        return false;
    }

    let fields: Vec<&str> = existing.split('$').collect();
    if fields.len() != 4 {
        return false;
    }

    if fields[1] != ALG {
        return false;
    }

    let cost: u32 = match fields[2].parse() {
        Ok(c) => c,
        Err(_) => return false,
    };
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return false;
    }

    let salt = match fields[3].get(..22) {
        Some(s) => s,
        None => return false,
    };

    match hash(password, cost, Some(salt)) {
        Ok(recomputed) => recomputed == existing,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PASSWORD: &str = "password123";
    const TEST_SALT_BCRYPT: &str = "R6297FEswqIxx9CmIQBZlO";
    const TEST_HASH: &str = "$2a$10$R6297FEswqIxx9CmIQBZlOs6Xvuhbg2FpHBbzdwyOkrfTZRvSJ36m";

    #[test]
    fn cost_field_bounds() {
        assert!(cost_field(3).is_err());
        assert!(cost_field(32).is_err());
        assert_eq!(cost_field(4).unwrap(), "04");
        assert_eq!(cost_field(31).unwrap(), "31");
        assert_eq!(cost_field(DEFAULT_COST).unwrap(), "10");
    }

    #[test]
    fn hash_reference_vector() {
        let h = hash(TEST_PASSWORD, 10, Some(TEST_SALT_BCRYPT)).unwrap();
        assert_eq!(h, TEST_HASH);
    }

    #[test]
    fn hash_rejects_out_of_range_cost() {
        assert!(matches!(
            hash(TEST_PASSWORD, 3, Some(TEST_SALT_BCRYPT)),
            Err(BcryptError::InvalidCost(_))
        ));
        assert!(matches!(
            hash(TEST_PASSWORD, 32, Some(TEST_SALT_BCRYPT)),
            Err(BcryptError::InvalidCost(_))
        ));
    }

    #[test]
    fn hash_rejects_bad_salt() {
        // too short once decoded
        assert!(matches!(
            hash(TEST_PASSWORD, 4, Some("R6297FEswq")),
            Err(BcryptError::InvalidSaltLength(_))
        ));
        // character outside the bcrypt alphabet
        assert!(matches!(
            hash(TEST_PASSWORD, 4, Some("R6297FEswqIxx9CmIQBZl+")),
            Err(BcryptError::InvalidSaltEncoding(_))
        ));
    }

    #[test]
    fn hash_is_sixty_chars_with_random_salt() {
        let h = hash(TEST_PASSWORD, 4, None).unwrap();
        assert_eq!(h.len(), 60);
        assert!(h.starts_with("$2a$04$"));
    }

    #[test]
    fn hash_appends_nul_once() {
        let with_nul = hash("password123\0", 4, Some(TEST_SALT_BCRYPT)).unwrap();
        let without = hash("password123", 4, Some(TEST_SALT_BCRYPT)).unwrap();
        assert_eq!(with_nul, without);
    }

    #[test]
    fn verify_reference_vector() {
        assert!(verify(TEST_PASSWORD, TEST_HASH));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let h = hash(TEST_PASSWORD, 4, None).unwrap();
        assert!(verify(TEST_PASSWORD, &h));
        assert!(!verify("password124", &h));
        assert!(!verify("", &h));
    }

    #[test]
    fn verify_rejects_any_flipped_character() {
        let h = hash(TEST_PASSWORD, 4, Some(TEST_SALT_BCRYPT)).unwrap();
        for i in 0..h.len() {
            let mut bytes = h.clone().into_bytes();
            bytes[i] = if bytes[i] == b'a' { b'b' } else { b'a' };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(!verify(TEST_PASSWORD, &mutated), "position {}", i);
        }
    }

    #[test]
    fn verify_absorbs_malformed_input() {
        assert!(!verify(TEST_PASSWORD, ""));
        assert!(!verify(TEST_PASSWORD, "$2a$10$short"));
        // wrong length
        assert!(!verify(TEST_PASSWORD, &TEST_HASH[..59]));
        // wrong field count
        assert!(!verify(TEST_PASSWORD, &TEST_HASH.replacen('$', "x", 1)));
        // unsupported variant tag
        assert!(!verify(TEST_PASSWORD, &TEST_HASH.replacen("2a", "2b", 1)));
        // cost out of range
        assert!(!verify(TEST_PASSWORD, &TEST_HASH.replacen("10", "99", 1)));
        // unparseable cost
        assert!(!verify(TEST_PASSWORD, &TEST_HASH.replacen("10", "xx", 1)));
        // multi-byte characters crossing the salt boundary must not panic
        let wide = format!("$2a$10$x{}", "é".repeat(26));
        assert_eq!(wide.len(), 60);
        assert!(!verify(TEST_PASSWORD, &wide));
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let h = hash(TEST_PASSWORD, DEFAULT_COST, None).unwrap();
        assert!(verify(TEST_PASSWORD, &h));
    }
}
