//! Bare multisig script template.
//!
//! Locking script: `OP_m <pk1> .. <pkn> OP_n OP_CHECKMULTISIG`.
//! Unlocking script: `OP_0 <sig1> .. <sigm>`, signatures in key order.

use btc_primitives::ec::{PrivateKey, PublicKey};
use btc_script::opcodes::OP_0;
use btc_script::Script;

use crate::sighash::SIGHASH_ALL;
use crate::template::{sign_with_script_code, source_script, UnlockingScriptTemplate};
use crate::transaction::Transaction;
use crate::TransactionError;

/// Create an `m`-of-`n` locking script over compressed `public_keys`.
pub fn lock(public_keys: &[PublicKey], required: usize) -> Result<Script, TransactionError> {
    let keys: Vec<[u8; 33]> = public_keys.iter().map(PublicKey::to_compressed).collect();
    Ok(Script::multisig(&keys, required)?)
}

/// Create a multisig signer.
///
/// `private_keys` must be listed in the same order as their public keys
/// appear in the locking script.
pub fn unlock(private_keys: Vec<PrivateKey>, sighash_flag: Option<u32>) -> Multisig {
    Multisig {
        private_keys,
        sighash_flag: sighash_flag.unwrap_or(SIGHASH_ALL),
    }
}

/// Multisig signer holding the signing keys in locking-script order.
pub struct Multisig {
    private_keys: Vec<PrivateKey>,
    sighash_flag: u32,
}

impl Multisig {
    /// `OP_0` followed by one signature per key, each over `script_code`.
    pub(crate) fn signatures_script(
        &self,
        tx: &Transaction,
        idx: usize,
        script_code: &Script,
    ) -> Result<Script, TransactionError> {
        let mut script = Script::new();
        script.append_opcode(OP_0)?;
        for key in &self.private_keys {
            let sig = sign_with_script_code(tx, idx, key, script_code, self.sighash_flag)?;
            script.append_data(&sig)?;
        }
        Ok(script)
    }

    pub(crate) fn signatures_length(&self) -> u32 {
        1 + 74 * self.private_keys.len() as u32
    }
}

impl UnlockingScriptTemplate for Multisig {
    fn sign(&self, tx: &Transaction, input_index: u32) -> Result<Script, TransactionError> {
        let idx = input_index as usize;
        let script_code = source_script(tx, idx)?;
        self.signatures_script(tx, idx, script_code)
    }

    fn estimate_length(&self, _tx: &Transaction, _input_index: u32) -> u32 {
        self.signatures_length()
    }
}
