//! Random identifier generation.
//!
//! Storage keys and share tokens are both derived from 128 bits of operating
//! system randomness, rendered as 32 lowercase hex characters.

use std::fmt::Write;

use crate::errors::CoreError;

/// Number of random bytes behind every generated identifier.
pub const RANDOM_ID_BYTES: usize = 16;

/// Length of a rendered identifier (two hex characters per byte).
pub const RANDOM_ID_LEN: usize = RANDOM_ID_BYTES * 2;

/// Generate a 128-bit random identifier as lowercase hex.
///
/// # Errors
///
/// Returns `CoreError::Randomness` if the OS random source fails.
pub fn random_hex_id() -> Result<String, CoreError> {
    let mut buf = [0u8; RANDOM_ID_BYTES];
    getrandom::fill(&mut buf).map_err(|e| CoreError::Randomness(e.to_string()))?;

    let mut out = String::with_capacity(RANDOM_ID_LEN);
    for byte in buf {
        let _ = write!(out, "{byte:02x}");
    }
    Ok(out)
}

/// Generate an unguessable share-link token.
///
/// # Errors
///
/// Returns `CoreError::Randomness` if the OS random source fails.
pub fn generate_share_token() -> Result<String, CoreError> {
    random_hex_id()
}

/// Check that a string has the shape of a generated identifier.
#[must_use]
pub fn is_random_hex_id(s: &str) -> bool {
    s.len() == RANDOM_ID_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
