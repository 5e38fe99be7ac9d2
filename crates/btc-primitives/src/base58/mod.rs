//! Base58 and Base58Check encoding.
//!
//! Addresses and WIF keys are a version byte followed by a payload,
//! with the first four bytes of SHA-256d appended as a checksum.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Length of the Base58Check checksum suffix.
const CHECKSUM_LEN: usize = 4;

/// Encode a byte slice to a Base58 string using the Bitcoin alphabet.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string to a byte vector.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or an error for characters outside the alphabet.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode `version || payload || checksum` as Base58Check.
///
/// # Arguments
/// * `version` - The leading version byte (e.g. 0x00 for a mainnet pubkey-hash address).
/// * `payload` - The bytes following the version byte.
///
/// # Returns
/// A Base58Check-encoded string.
pub fn check_encode(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    data.push(version);
    data.extend_from_slice(payload);
    let checksum = sha256d(&data);
    data.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode(&data)
}

/// Decode a Base58Check string into its version byte and payload.
///
/// # Returns
/// `Ok((version, payload))` when the checksum matches, `ChecksumMismatch` when
/// it does not, or `InvalidBase58` when the input is too short to hold a
/// version byte and checksum.
pub fn check_decode(s: &str) -> Result<(u8, Vec<u8>), PrimitivesError> {
    let decoded = decode(s)?;
    if decoded.len() < 1 + CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(format!(
            "{} bytes is too short for version and checksum",
            decoded.len()
        )));
    }
    let (body, checksum) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
    if checksum != &sha256d(body)[..CHECKSUM_LEN] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok((body[0], body[1..].to_vec()))
}
