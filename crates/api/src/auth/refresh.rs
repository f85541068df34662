//! Refresh-token generation and hashing.
//!
//! Refresh tokens are opaque random strings handed to the client exactly
//! once (in a cookie). Only an HMAC-SHA256 of the token, keyed with the
//! server-held pepper, is stored, so a leaked `user_sessions` table cannot be
//! turned back into usable tokens or brute-forced offline without the pepper.

use rand::Rng;
use staybook_core::hashing::hmac_sha256_hex;

/// Length of a generated refresh token in alphanumeric characters
/// (~5.95 bits each, so roughly 381 bits of entropy).
pub const REFRESH_TOKEN_LENGTH: usize = 64;

/// Generate a cryptographically random refresh token.
///
/// Returns a tuple of `(plaintext_token, keyed_hash)`. The plaintext is
/// sent to the client; only the hash is persisted server-side.
pub fn generate_refresh_token(pepper: &str) -> (String, String) {
    let plaintext: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect();
    let hash = hash_refresh_token(&plaintext, pepper);
    (plaintext, hash)
}

/// Compute the keyed hex digest of a refresh token.
///
/// Use this to compare an incoming refresh token against the stored hash.
pub fn hash_refresh_token(token: &str, pepper: &str) -> String {
    hmac_sha256_hex(pepper.as_bytes(), token.as_bytes())
}
