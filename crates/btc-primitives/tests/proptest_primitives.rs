use proptest::prelude::*;

use btc_primitives::base58;
use btc_primitives::ec::private_key::PrivateKey;
use btc_primitives::ec::signature::Signature;
use btc_primitives::hash::sha256;
use btc_primitives::util::{ByteReader, ByteWriter, VarInt};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ecdsa_sign_verify_der_roundtrip(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        // Not every 32-byte array is a valid scalar.
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let hash = sha256(&msg);
            let sig = pk.sign(&hash).unwrap();
            let parsed = Signature::from_der(&sig.to_der()).unwrap();
            prop_assert_eq!(&parsed, &sig);
            prop_assert!(pk.pub_key().verify(&hash, &parsed));
        }
    }

    #[test]
    fn base58check_roundtrip(version in any::<u8>(), payload in prop::collection::vec(any::<u8>(), 0..64)) {
        let encoded = base58::check_encode(version, &payload);
        prop_assert_eq!(base58::check_decode(&encoded).unwrap(), (version, payload));
    }

    #[test]
    fn varint_roundtrip(value in any::<u64>()) {
        let mut w = ByteWriter::new();
        w.write_varint(VarInt(value));
        let bytes = w.into_bytes();
        prop_assert_eq!(bytes.len(), VarInt(value).length());
        let mut r = ByteReader::new(&bytes);
        prop_assert_eq!(r.read_varint().unwrap(), VarInt(value));
    }
}
