//! ECDSA signature with DER serialization.
//!
//! Script signatures are DER-encoded `(r, s)` pairs; the trailing sighash
//! byte is handled by the caller, not here.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// An ECDSA signature with R and S components (32 bytes each, big-endian).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    /// Create a signature from raw R and S values.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    /// The R component.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// The S component.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Parse a DER-encoded ECDSA signature.
    ///
    /// Expected format: `0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>`.
    /// Trailing bytes beyond the declared sequence length are rejected.
    ///
    /// # Arguments
    /// * `bytes` - DER-encoded signature bytes without a sighash suffix.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error naming the malformed field.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let malformed = |what: &str| PrimitivesError::InvalidSignature(format!("malformed signature: {}", what));

        if bytes.len() < 8 {
            return Err(malformed("too short"));
        }
        if bytes[0] != 0x30 {
            return Err(malformed("no header magic"));
        }
        if bytes[1] as usize + 2 != bytes.len() {
            return Err(malformed("bad length"));
        }

        let (r_bytes, rest) = read_der_int(&bytes[2..]).ok_or_else(|| malformed("bogus R"))?;
        let (s_bytes, rest) = read_der_int(rest).ok_or_else(|| malformed("bogus S"))?;
        if !rest.is_empty() {
            return Err(malformed("trailing bytes"));
        }

        Ok(Signature {
            r: to_32_bytes(r_bytes)?,
            s: to_32_bytes(s_bytes)?,
        })
    }

    /// Serialize the signature in DER format.
    pub fn to_der(&self) -> Vec<u8> {
        let rb = canonicalize_int(&self.r);
        let sb = canonicalize_int(&self.s);

        let total_len = 6 + rb.len() + sb.len();
        let mut out = Vec::with_capacity(total_len);
        out.push(0x30);
        out.push((total_len - 2) as u8);
        out.push(0x02);
        out.push(rb.len() as u8);
        out.extend_from_slice(&rb);
        out.push(0x02);
        out.push(sb.len() as u8);
        out.extend_from_slice(&sb);
        out
    }

    /// Sign a 32-byte hash using RFC6979 deterministic nonces.
    ///
    /// Produces a low-S normalized signature.
    pub fn sign(hash: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let (sig, _recovery_id) = priv_key
            .signing_key()
            .sign_prehash_recoverable(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let sig = sig.normalize_s().unwrap_or(sig);

        let (r_bytes, s_bytes) = sig.split_bytes();
        Ok(Signature {
            r: r_bytes.into(),
            s: s_bytes.into(),
        })
    }

    /// Verify this signature against a 32-byte hash and public key.
    ///
    /// High-S signatures are accepted; legacy script rules do not require
    /// low-S.
    pub fn verify(&self, hash: &[u8; 32], pub_key: &PublicKey) -> bool {
        let sig = match ecdsa::Signature::from_scalars(self.r, self.s) {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        let sig = sig.normalize_s().unwrap_or(sig);
        pub_key.verifying_key().verify_prehash(hash, &sig).is_ok()
    }
}

/// Read one `0x02 <len> <bytes>` DER integer, returning it and the remainder.
fn read_der_int(data: &[u8]) -> Option<(&[u8], &[u8])> {
    if data.len() < 2 || data[0] != 0x02 {
        return None;
    }
    let len = data[1] as usize;
    if len == 0 || data.len() < 2 + len {
        return None;
    }
    Some((&data[2..2 + len], &data[2 + len..]))
}

/// Strip leading zeros and add a 0x00 pad byte when the high bit is set.
fn canonicalize_int(val: &[u8; 32]) -> Vec<u8> {
    let start = val.iter().position(|&b| b != 0).unwrap_or(31);
    let trimmed = &val[start..];
    if trimmed[0] & 0x80 != 0 {
        let mut out = Vec::with_capacity(trimmed.len() + 1);
        out.push(0x00);
        out.extend_from_slice(trimmed);
        out
    } else {
        trimmed.to_vec()
    }
}

/// Left-pad a big-endian integer to 32 bytes after stripping zero padding.
fn to_32_bytes(bytes: &[u8]) -> Result<[u8; 32], PrimitivesError> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let trimmed = &bytes[start..];
    if trimmed.len() > 32 {
        return Err(PrimitivesError::InvalidSignature(
            "integer value too large for 32 bytes".to_string(),
        ));
    }
    let mut out = [0u8; 32];
    out[32 - trimmed.len()..].copy_from_slice(trimmed);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    const VALID_DER: &str = "304402204e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd41\
                             0220181522ec8eca07de4860a4acdd12909d831cc56cbbac4622082221a8768d1d09";

    #[test]
    fn test_der_roundtrip() {
        let der = hex::decode(VALID_DER).unwrap();
        let sig = Signature::from_der(&der).unwrap();
        assert_eq!(
            hex::encode(sig.r()),
            "4e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd41"
        );
        assert_eq!(sig.to_der(), der);
    }

    #[test]
    fn test_der_rejects_malformed() {
        let der = hex::decode(VALID_DER).unwrap();
        assert!(Signature::from_der(&[]).is_err());

        let mut bad_magic = der.clone();
        bad_magic[0] = 0x31;
        assert!(Signature::from_der(&bad_magic).is_err());

        let mut bad_marker = der.clone();
        bad_marker[2] = 0x03;
        assert!(Signature::from_der(&bad_marker).is_err());

        let mut trailing = der.clone();
        trailing.push(0x01);
        assert!(Signature::from_der(&trailing).is_err());
    }

    /// RFC6979 vectors (CoreBitcoin / Trezor) with SHA-256 message hashes.
    #[test]
    fn test_rfc6979() {
        let tests = [
            (
                "cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50",
                "sample",
                "3045022100af340daf02cc15c8d5d08d7735dfe6b98a474ed373bdb5fbecf7571be52b384202205009fb27f37034a9b24b707b7c6b79ca23ddef9e25f7282e8a797efe53a8f124",
            ),
            (
                "0000000000000000000000000000000000000000000000000000000000000001",
                "Satoshi Nakamoto",
                "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d802202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
            ),
            (
                "f8b8af8ce3c7cca5e300d33939540c10d45ce001b8f252bfbc57ba0342904181",
                "Alan Turing",
                "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea",
            ),
        ];
        for (key_hex, msg, expected) in tests {
            let key = PrivateKey::from_hex(key_hex).unwrap();
            let hash = sha256(msg.as_bytes());
            let sig = Signature::sign(&hash, &key).unwrap();
            assert_eq!(hex::encode(sig.to_der()), expected, "message {:?}", msg);
            assert!(sig.verify(&hash, &key.pub_key()));
        }
    }
}
