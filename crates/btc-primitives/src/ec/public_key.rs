//! secp256k1 public key.
//!
//! Supports compressed and uncompressed SEC1 serialization, Hash160 for
//! pay-to-pubkey-hash templates, and verification of precomputed hashes.

use k256::ecdsa::VerifyingKey;
use std::fmt;

use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key in bytes (prefix + 32 byte x + 32 byte y).
const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key.
#[derive(Clone, Debug)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Parse a SEC1-encoded public key.
    ///
    /// Accepts only compressed (33-byte, tag 0x02/0x03) and uncompressed
    /// (65-byte, tag 0x04) forms; other SEC1 encodings are rejected.
    ///
    /// # Arguments
    /// * `bytes` - SEC1-encoded public key bytes, as found on a script stack.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error if the bytes are not a curve point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        match (bytes.len(), bytes.first().copied()) {
            (COMPRESSED_LEN, Some(0x02 | 0x03)) | (UNCOMPRESSED_LEN, Some(0x04)) => {}
            (len, tag) => {
                return Err(PrimitivesError::InvalidPublicKey(format!(
                    "unsupported key encoding: length {}, tag {:02x?}",
                    len, tag
                )))
            }
        }
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner })
    }

    /// Parse a hex-encoded SEC1 public key.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// Serialize in compressed SEC1 form (33 bytes).
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize in uncompressed SEC1 form (65 bytes).
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Hash160 of the compressed key, as committed to by P2PKH outputs.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Verify a signature over a precomputed 32-byte hash.
    pub fn verify(&self, hash: &[u8; 32], sig: &Signature) -> bool {
        sig.verify(hash, self)
    }

    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_compressed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec::PrivateKey;

    /// Generator point G, the public key of private key 1.
    const G_COMPRESSED: &str =
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const G_UNCOMPRESSED: &str = "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
         483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

    #[test]
    fn test_compressed_and_uncompressed_agree() {
        let a = PublicKey::from_hex(G_COMPRESSED).unwrap();
        let b = PublicKey::from_hex(G_UNCOMPRESSED).unwrap();
        assert_eq!(a, b);
        assert_eq!(hex::encode(b.to_compressed()), G_COMPRESSED);
        assert_eq!(hex::encode(a.to_uncompressed()), G_UNCOMPRESSED);
    }

    #[test]
    fn test_pub_key_of_one_is_generator() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let pk = PrivateKey::from_bytes(&one).unwrap().pub_key();
        assert_eq!(pk.to_string(), G_COMPRESSED);
        assert_eq!(hex::encode(pk.hash160()), "751e76e8199196d454941c45d1b3a323f1433bd6");
    }

    #[test]
    fn test_invalid_public_keys() {
        assert!(PublicKey::from_bytes(&[]).is_err());
        assert!(PublicKey::from_bytes(&[0x02; 20]).is_err());
        // unknown SEC1 tag
        let mut bad = hex::decode(G_COMPRESSED).unwrap();
        bad[0] = 0x05;
        assert!(PublicKey::from_bytes(&bad).is_err());
        // uncompressed length with a compressed tag, and the reverse
        let mut wrong_tag = hex::decode(G_UNCOMPRESSED).unwrap();
        wrong_tag[0] = 0x02;
        assert!(PublicKey::from_bytes(&wrong_tag).is_err());
        let mut wrong_len = hex::decode(G_COMPRESSED).unwrap();
        wrong_len[0] = 0x04;
        assert!(PublicKey::from_bytes(&wrong_len).is_err());
    }
}
