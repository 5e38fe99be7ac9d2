/// Bitcoin script engine - Cryptographic primitives and wire helpers.
///
/// This crate provides the building blocks the script crates consume:
/// - Hash functions (SHA-1, SHA-256, SHA-256d, RIPEMD-160, Hash160)
/// - Base58Check encoding for addresses and WIF keys
/// - Variable-length integers and little-endian byte readers/writers
/// - secp256k1 private keys, public keys and DER signatures

pub mod hash;
pub mod util;
pub mod base58;
pub mod ec;

mod error;
pub use error::PrimitivesError;
