use std::error::Error;
use std::fmt;

/// Errors produced while building a bcrypt hash.
///
/// Verification never surfaces these: `verify` absorbs every structural
/// problem into a `false` result instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BcryptError {
    /// Cost outside the accepted [4, 31] range.
    InvalidCost(String),
    /// Decoded salt is not exactly 16 bytes.
    InvalidSaltLength(String),
    /// Salt field contains characters outside the bcrypt alphabet.
    InvalidSaltEncoding(String),
    /// Hash string or hash body with an impossible shape.
    MalformedHash(String),
}

impl fmt::Display for BcryptError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BcryptError::InvalidCost(msg) => write!(f, "Invalid cost: {}", msg),
            BcryptError::InvalidSaltLength(msg) => write!(f, "Invalid salt length: {}", msg),
            BcryptError::InvalidSaltEncoding(msg) => write!(f, "Invalid salt encoding: {}", msg),
            BcryptError::MalformedHash(msg) => write!(f, "Malformed hash: {}", msg),
        }
    }
}

impl Error for BcryptError {}
