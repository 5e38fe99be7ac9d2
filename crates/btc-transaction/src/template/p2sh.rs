//! Pay-to-Script-Hash (P2SH) template around a multisig redeem script.
//!
//! Locking script: `OP_HASH160 <hash160(redeem)> OP_EQUAL`.
//! Unlocking script: `OP_0 <sig1> .. <sigm> <redeem>`.

use btc_primitives::ec::PrivateKey;
use btc_script::{Address, Network, Script};

use crate::template::multisig::{self, Multisig};
use crate::template::{source_script, UnlockingScriptTemplate};
use crate::transaction::Transaction;
use crate::TransactionError;

/// Create the P2SH locking script committing to `redeem_script`.
pub fn lock(redeem_script: &Script) -> Script {
    let address = Address::from_redeem_script(redeem_script.as_bytes(), Network::Mainnet);
    Script::from_address(&address)
}

/// Create a signer for a P2SH output whose redeem script is a multisig.
///
/// Signatures commit to the redeem script, which is what executes the
/// signature check.
pub fn unlock_multisig(redeem_script: Script, private_keys: Vec<PrivateKey>, sighash_flag: Option<u32>) -> P2SHMultisig {
    P2SHMultisig {
        redeem_script,
        signer: multisig::unlock(private_keys, sighash_flag),
    }
}

/// P2SH multisig signer.
pub struct P2SHMultisig {
    redeem_script: Script,
    signer: Multisig,
}

impl UnlockingScriptTemplate for P2SHMultisig {
    fn sign(&self, tx: &Transaction, input_index: u32) -> Result<Script, TransactionError> {
        let idx = input_index as usize;
        let committed = source_script(tx, idx)?;
        if committed != &lock(&self.redeem_script) {
            return Err(TransactionError::SigningError(format!(
                "input {} does not spend a P2SH output for this redeem script",
                idx
            )));
        }

        let mut script = self.signer.signatures_script(tx, idx, &self.redeem_script)?;
        script.append_data(self.redeem_script.as_bytes())?;
        Ok(script)
    }

    fn estimate_length(&self, _tx: &Transaction, _input_index: u32) -> u32 {
        self.signer.signatures_length() + 3 + self.redeem_script.len() as u32
    }
}
