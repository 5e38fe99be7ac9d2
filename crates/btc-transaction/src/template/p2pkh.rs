//! Pay-to-Public-Key-Hash (P2PKH) script template.
//!
//! Locking script: `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`.
//! Unlocking script: `<sig> <pubkey>`.

use btc_primitives::ec::PrivateKey;
use btc_script::{Address, AddressType, Script};

use crate::sighash::SIGHASH_ALL;
use crate::template::{sign_with_script_code, source_script, UnlockingScriptTemplate};
use crate::transaction::Transaction;
use crate::TransactionError;

/// Create a P2PKH locking script paying to `address`.
///
/// # Returns
/// The 25-byte locking script, or `InvalidTransaction` for a script-hash address.
pub fn lock(address: &Address) -> Result<Script, TransactionError> {
    if address.address_type != AddressType::PubkeyHash {
        return Err(TransactionError::InvalidTransaction(format!(
            "{} is not a pubkey-hash address",
            address
        )));
    }
    Ok(Script::from_address(address))
}

/// Create a P2PKH signer. `sighash_flag` defaults to `SIGHASH_ALL`.
pub fn unlock(private_key: PrivateKey, sighash_flag: Option<u32>) -> P2PKH {
    P2PKH {
        private_key,
        sighash_flag: sighash_flag.unwrap_or(SIGHASH_ALL),
    }
}

/// P2PKH signer holding a private key and sighash flag.
pub struct P2PKH {
    private_key: PrivateKey,
    sighash_flag: u32,
}

impl UnlockingScriptTemplate for P2PKH {
    /// Sign over the spent output's locking script and build
    /// `<DER_sig || sighash_byte> <compressed_pubkey>`.
    fn sign(&self, tx: &Transaction, input_index: u32) -> Result<Script, TransactionError> {
        let idx = input_index as usize;
        let script_code = source_script(tx, idx)?;
        let sig = sign_with_script_code(tx, idx, &self.private_key, script_code, self.sighash_flag)?;

        let mut script = Script::new();
        script.append_data(&sig)?;
        script.append_data(&self.private_key.pub_key().to_compressed())?;
        Ok(script)
    }

    /// 1 + 73 (DER sig + sighash byte) + 1 + 33 (compressed pubkey).
    fn estimate_length(&self, _tx: &Transaction, _input_index: u32) -> u32 {
        108
    }
}
