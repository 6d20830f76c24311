//! Salt generation.

use rand::RngCore;

use crate::constants::SALT_LENGTH;

/// Generates 16 cryptographically secure random bytes for use as a salt.
///
/// `ThreadRng` is a CSPRNG reseeded from the operating system, which is the
/// contract this module has to meet; a general-purpose PRNG would not do.
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salts_are_distinct() {
        let s1 = generate_salt();
        let s2 = generate_salt();
        assert_ne!(s1, s2);
        assert_eq!(s1.len(), SALT_LENGTH);
    }
}
