//! secp256k1 private key.
//!
//! Wraps the k256 signing key and adds hex/WIF encoding and
//! deterministic (RFC6979) signing of precomputed hashes.

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use crate::base58;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// Mainnet WIF version byte.
const MAINNET_WIF_VERSION: u8 = 0x80;

/// Testnet WIF version byte.
const TESTNET_WIF_VERSION: u8 = 0xef;

/// Compression flag appended to the WIF payload for compressed public keys.
const COMPRESS_MAGIC: u8 = 0x01;

/// A secp256k1 private key.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key using the OS random number generator.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from a raw 32-byte scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte big-endian scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the scalar is non-zero and below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Create a private key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// Decode a WIF string (mainnet or testnet, compressed or uncompressed).
    ///
    /// # Returns
    /// `Ok(PrivateKey)` on success, or an error if the version byte, length or
    /// checksum is wrong.
    pub fn from_wif(wif: &str) -> Result<Self, PrimitivesError> {
        let (version, payload) =
            base58::check_decode(wif).map_err(|e| PrimitivesError::InvalidWif(e.to_string()))?;
        if version != MAINNET_WIF_VERSION && version != TESTNET_WIF_VERSION {
            return Err(PrimitivesError::InvalidWif(format!(
                "unknown version byte {:#04x}",
                version
            )));
        }
        let key = match payload.len() {
            33 if payload[32] == COMPRESS_MAGIC => &payload[..32],
            32 => &payload[..],
            n => {
                return Err(PrimitivesError::InvalidWif(format!(
                    "malformed private key: invalid length {}",
                    n
                )))
            }
        };
        Self::from_bytes(key)
    }

    /// Encode as a mainnet WIF string for a compressed public key.
    pub fn to_wif(&self) -> String {
        let mut payload = self.to_bytes().to_vec();
        payload.push(COMPRESS_MAGIC);
        base58::check_encode(MAINNET_WIF_VERSION, &payload)
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes().into()
    }

    /// Serialize the private key as a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Derive the corresponding public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a precomputed 32-byte hash with an RFC6979 nonce.
    ///
    /// The resulting signature is low-S normalized.
    pub fn sign(&self, hash: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}
