//! Keyed digest utility for secrets that are stored only as hashes.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute an HMAC-SHA256 of `data` keyed with `key`, hex-encoded.
pub fn hmac_sha256_hex(key: &[u8], data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    let digest = mac.finalize().into_bytes();
    format!("{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4231_test_case_2() {
        let hash = hmac_sha256_hex(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hash,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn different_keys_produce_different_digests() {
        let a = hmac_sha256_hex(b"pepper-a", b"token");
        let b = hmac_sha256_hex(b"pepper-b", b"token");
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }
}
