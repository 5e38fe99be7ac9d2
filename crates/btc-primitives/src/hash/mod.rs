//! Hash functions used by script opcodes, addresses and transaction ids.
//!
//! Every function returns a fixed-size array so callers can push the
//! digest straight onto a script stack or compare it against a template.

use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Compute SHA-1 of the input data (OP_SHA1).
pub fn sha1(data: &[u8]) -> [u8; 20] {
    Sha1::digest(data).into()
}

/// Compute SHA-256 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute double SHA-256: SHA-256(SHA-256(data)).
///
/// Used for transaction ids, signature hashes, Base58Check checksums and OP_HASH256.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute RIPEMD-160 hash of the input data.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// Compute Hash160: RIPEMD-160(SHA-256(data)).
///
/// This is the digest committed to by pay-to-pubkey-hash and
/// pay-to-script-hash templates.
///
/// # Arguments
/// * `data` - Byte slice to hash (a serialized public key or redeem script).
///
/// # Returns
/// A 20-byte Hash160 digest.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC: &[u8] = b"abc";

    // ---- SHA-1 ----

    #[test]
    fn test_sha1_empty_string() {
        assert_eq!(hex::encode(sha1(b"")), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn test_sha1_abc() {
        assert_eq!(hex::encode(sha1(ABC)), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    // ---- SHA-256 / SHA-256d ----

    #[test]
    fn test_sha256_empty_string() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_abc() {
        assert_eq!(
            hex::encode(sha256(ABC)),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256d_empty_string() {
        assert_eq!(
            hex::encode(sha256d(b"")),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    // ---- RIPEMD-160 / Hash160 ----

    #[test]
    fn test_ripemd160_empty_string() {
        assert_eq!(hex::encode(ripemd160(b"")), "9c1185a5c5e9fc54612808977ee8f548b2258d31");
    }

    #[test]
    fn test_hash160_empty_string() {
        assert_eq!(hex::encode(hash160(b"")), "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb");
    }

    #[test]
    fn test_hash160_is_ripemd_of_sha256() {
        assert_eq!(hash160(ABC), ripemd160(&sha256(ABC)));
    }
}
