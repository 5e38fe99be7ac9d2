//! Script templates for common output types.
//!
//! Each template module provides a `lock` function building the locking
//! script and an `unlock` function returning a signer that implements
//! [`UnlockingScriptTemplate`].

pub mod multisig;
pub mod p2pkh;
pub mod p2sh;

use btc_primitives::ec::PrivateKey;
use btc_script::Script;

use crate::sighash;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Trait for signers that produce unlocking scripts.
pub trait UnlockingScriptTemplate {
    /// Produce the unlocking script for input `input_index` of `tx`.
    fn sign(&self, tx: &Transaction, input_index: u32) -> Result<Script, TransactionError>;

    /// Upper bound on the unlocking script's length in bytes, for fee estimation.
    fn estimate_length(&self, tx: &Transaction, input_index: u32) -> u32;
}

/// Sign input `idx` over `script_code` and return the DER signature with
/// the sighash byte appended.
pub(crate) fn sign_with_script_code(
    tx: &Transaction,
    idx: usize,
    key: &PrivateKey,
    script_code: &Script,
    sighash_flag: u32,
) -> Result<Vec<u8>, TransactionError> {
    let hash = sighash::signature_hash(tx, idx, script_code, sighash_flag)?;
    let signature = key.sign(&hash)?;
    let mut sig_buf = signature.to_der();
    sig_buf.push(sighash_flag as u8);
    Ok(sig_buf)
}

/// Locking script of the output spent by input `idx`.
pub(crate) fn source_script(tx: &Transaction, idx: usize) -> Result<&Script, TransactionError> {
    let input = tx.inputs.get(idx).ok_or_else(|| {
        TransactionError::SigningError(format!(
            "input index {} out of range (tx has {} inputs)",
            idx,
            tx.inputs.len()
        ))
    })?;
    input.source_locking_script().ok_or_else(|| {
        TransactionError::SigningError(format!("input {} has no source output attached", idx))
    })
}
