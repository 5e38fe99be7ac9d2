/// Bitcoin address handling.
///
/// Supports pay-to-pubkey-hash and pay-to-script-hash addresses on
/// mainnet and testnet. Addresses are Base58Check strings of a version
/// byte followed by a 20-byte hash.

use std::fmt;

use btc_primitives::base58;
use btc_primitives::hash::hash160;

use crate::ScriptError;

/// Mainnet P2PKH address version byte.
const MAINNET_P2PKH: u8 = 0x00;
/// Testnet P2PKH address version byte.
const TESTNET_P2PKH: u8 = 0x6f;
/// Mainnet P2SH address version byte.
const MAINNET_P2SH: u8 = 0x05;
/// Testnet P2SH address version byte.
const TESTNET_P2SH: u8 = 0xc4;

/// Bitcoin network type for address prefix selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    /// Bitcoin mainnet ('1' and '3' addresses).
    Mainnet,
    /// Bitcoin testnet ('m'/'n' and '2' addresses).
    Testnet,
}

/// What the address hash commits to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressType {
    /// Hash160 of a public key.
    PubkeyHash,
    /// Hash160 of a redeem script.
    ScriptHash,
}

/// A Bitcoin address: a type tag, a network and a 20-byte hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// Whether `hash` is a public-key hash or a script hash.
    pub address_type: AddressType,
    /// The network this address belongs to.
    pub network: Network,
    /// The 20-byte Hash160 payload.
    pub hash: [u8; 20],
}

impl Address {
    /// Parse a Base58Check-encoded address string.
    ///
    /// The version byte selects both the address type and the network.
    ///
    /// # Arguments
    /// * `addr` - The Base58Check address string.
    ///
    /// # Returns
    /// An `Address`, or an error if the checksum, length or version is wrong.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let (version, payload) = base58::check_decode(addr)
            .map_err(|e| ScriptError::InvalidAddress(format!("'{}': {}", addr, e)))?;

        let (address_type, network) = match version {
            MAINNET_P2PKH => (AddressType::PubkeyHash, Network::Mainnet),
            TESTNET_P2PKH => (AddressType::PubkeyHash, Network::Testnet),
            MAINNET_P2SH => (AddressType::ScriptHash, Network::Mainnet),
            TESTNET_P2SH => (AddressType::ScriptHash, Network::Testnet),
            other => return Err(ScriptError::UnsupportedAddress(other)),
        };

        let hash: [u8; 20] = payload.as_slice().try_into().map_err(|_| {
            ScriptError::InvalidAddress(format!("'{}': payload is {} bytes", addr, payload.len()))
        })?;

        Ok(Address { address_type, network, hash })
    }

    /// Create a pay-to-pubkey-hash address from a 20-byte public key hash.
    pub fn from_public_key_hash(hash: &[u8; 20], network: Network) -> Self {
        Address {
            address_type: AddressType::PubkeyHash,
            network,
            hash: *hash,
        }
    }

    /// Create a pay-to-pubkey-hash address for a serialized public key.
    pub fn from_public_key(pub_key: &[u8], network: Network) -> Self {
        Self::from_public_key_hash(&hash160(pub_key), network)
    }

    /// Create a pay-to-script-hash address from a 20-byte script hash.
    pub fn from_script_hash(hash: &[u8; 20], network: Network) -> Self {
        Address {
            address_type: AddressType::ScriptHash,
            network,
            hash: *hash,
        }
    }

    /// Create a pay-to-script-hash address committing to `redeem_script`.
    pub fn from_redeem_script(redeem_script: &[u8], network: Network) -> Self {
        Self::from_script_hash(&hash160(redeem_script), network)
    }

    /// The Base58Check version byte for this type and network.
    pub fn version(&self) -> u8 {
        match (self.address_type, self.network) {
            (AddressType::PubkeyHash, Network::Mainnet) => MAINNET_P2PKH,
            (AddressType::PubkeyHash, Network::Testnet) => TESTNET_P2PKH,
            (AddressType::ScriptHash, Network::Mainnet) => MAINNET_P2SH,
            (AddressType::ScriptHash, Network::Testnet) => TESTNET_P2SH,
        }
    }
}

impl fmt::Display for Address {
    /// Display the address as its Base58Check string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", base58::check_encode(self.version(), &self.hash))
    }
}

#[cfg(test)]
mod tests {
    //! Tests for address parsing, generation and type/network detection.

    use super::*;

    /// The public key hash shared across several test vectors.
    const TEST_PUBLIC_KEY_HASH: &str = "00ac6144c4db7b5790f343cf0477a65fb8a02eb7";
    const TEST_PUBLIC_KEY: &str = "026cf33373a9f3f6c676b75b543180703df225f7f8edbffedc417718a8ad4e89ce";

    fn test_hash() -> [u8; 20] {
        let bytes = hex::decode(TEST_PUBLIC_KEY_HASH).expect("valid hex");
        bytes.as_slice().try_into().expect("20 bytes")
    }

    // -----------------------------------------------------------------------
    // from_string
    // -----------------------------------------------------------------------

    /// Mainnet and testnet encodings of one hash decode to the same payload.
    #[test]
    fn test_from_string_networks() {
        let mainnet = Address::from_string("1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr").expect("mainnet");
        let testnet = Address::from_string("mtdruWYVEV1wz5yL7GvpBj4MgifCB7yhPd").expect("testnet");
        assert_eq!(hex::encode(mainnet.hash), "8fe80c75c9560e8b56ed64ea3c26e18d2c52211b");
        assert_eq!(mainnet.hash, testnet.hash);
        assert_eq!(mainnet.network, Network::Mainnet);
        assert_eq!(testnet.network, Network::Testnet);
        assert_eq!(mainnet.address_type, AddressType::PubkeyHash);
    }

    #[test]
    fn test_from_string_errors() {
        assert!(Address::from_string("ADD8E55").is_err());
        assert!(matches!(
            Address::from_string("27BvY7rFguYQvEL872Y7Fo77Y3EBApC2EK"),
            Err(ScriptError::UnsupportedAddress(_)) | Err(ScriptError::InvalidAddress(_))
        ));
    }

    // -----------------------------------------------------------------------
    // constructors and Display
    // -----------------------------------------------------------------------

    #[test]
    fn test_from_public_key() {
        let pub_key = hex::decode(TEST_PUBLIC_KEY).expect("valid hex");
        let addr = Address::from_public_key(&pub_key, Network::Mainnet);
        assert_eq!(addr.hash, test_hash());
        assert_eq!(addr.to_string(), "114ZWApV4EEU8frr7zygqQcB1V2BodGZuS");
        let addr = Address::from_public_key(&pub_key, Network::Testnet);
        assert_eq!(addr.to_string(), "mfaWoDuTsFfiunLTqZx4fKpVsUctiDV9jk");
    }

    /// Script-hash addresses use the '3' / '2' prefixes and round-trip.
    #[test]
    fn test_script_hash_roundtrip() {
        for (network, prefix) in [(Network::Mainnet, '3'), (Network::Testnet, '2')] {
            let addr = Address::from_script_hash(&test_hash(), network);
            let s = addr.to_string();
            assert!(s.starts_with(prefix), "{}", s);
            let parsed = Address::from_string(&s).expect("should parse back");
            assert_eq!(parsed, addr);
            assert_eq!(parsed.address_type, AddressType::ScriptHash);
        }
    }

    #[test]
    fn test_from_redeem_script_hashes_script() {
        let redeem = [0x51u8];
        let addr = Address::from_redeem_script(&redeem, Network::Mainnet);
        assert_eq!(addr.hash, hash160(&redeem));
        assert_eq!(addr.version(), MAINNET_P2SH);
    }
}
