//! Hashing and signature checking operations.

use log::debug;

use btc_primitives::hash;

use crate::opcodes::{opcode_to_string, OP_CODESEPARATOR};
use crate::{Script, ScriptError};

use super::error::{MachineError, MachineErrorCode};
use super::ScriptMachine;

pub(crate) enum HashType {
    Ripemd160,
    Sha1,
    Sha256,
    Hash160,
    Hash256,
}

impl<'a> ScriptMachine<'a> {
    pub(crate) fn op_hash(&mut self, op: u8, hash_type: HashType) -> Result<(), MachineError> {
        self.require_depth(op, 1)?;
        let buf = self.dstack.pop_byte_array()?;
        let result = match hash_type {
            HashType::Ripemd160 => hash::ripemd160(&buf).to_vec(),
            HashType::Sha1 => hash::sha1(&buf).to_vec(),
            HashType::Sha256 => hash::sha256(&buf).to_vec(),
            HashType::Hash160 => hash::hash160(&buf).to_vec(),
            HashType::Hash256 => hash::sha256d(&buf).to_vec(),
        };
        self.dstack.push_byte_array(result);
        Ok(())
    }

    /// The part of `script` after the last executed OP_CODESEPARATOR, with
    /// every push of one of `sigs` and every OP_CODESEPARATOR removed.
    fn signed_sub_script(&self, script: &Script, sigs: &[Vec<u8>]) -> Result<Script, MachineError> {
        let start = self.last_code_separator.map_or(0, |i| i + 1);
        let prepare = || -> Result<Script, ScriptError> {
            let mut sub = script.sub_script_from(start)?;
            for sig in sigs {
                sub.delete_occurrences_of_data(sig)?;
            }
            sub.delete_occurrences_of_opcode(OP_CODESEPARATOR)?;
            Ok(sub)
        };
        prepare().map_err(|e| {
            MachineError::new(
                MachineErrorCode::Internal,
                format!("cannot build signature sub-script: {}", e),
            )
        })
    }

    /// Ask the transaction to check one signature. Context errors other
    /// than contract violations count as an invalid signature.
    fn check_signature(&self, full_sig: &[u8], pub_key: &[u8], sub_script: &Script) -> Result<bool, MachineError> {
        let ctx = self.tx_context()?;
        match ctx.verify_signature(full_sig, pub_key, sub_script, self.input_index()) {
            Ok(valid) => Ok(valid),
            Err(e) if e.is_contract_violation() => Err(e),
            Err(e) => {
                debug!("signature check on input {} failed: {}", self.input_index(), e);
                Ok(false)
            }
        }
    }

    pub(crate) fn op_checksig(&mut self, script: &Script, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 2)?;
        let pub_key = self.dstack.pop_byte_array()?;
        let full_sig = self.dstack.pop_byte_array()?;

        if full_sig.is_empty() {
            self.dstack.push_bool(false);
            return Ok(());
        }

        let sub_script = self.signed_sub_script(script, std::slice::from_ref(&full_sig))?;
        let valid = self.check_signature(&full_sig, &pub_key, &sub_script)?;
        self.dstack.push_bool(valid);
        Ok(())
    }

    pub(crate) fn op_checksigverify(&mut self, script: &Script, op: u8) -> Result<(), MachineError> {
        self.op_checksig(script, op)?;
        self.abstract_verify(op, MachineErrorCode::CheckSigVerify)
    }

    /// `dummy sig1..sigM M key1..keyN N -> bool`
    ///
    /// Signatures must appear in the same order as their keys. Each key is
    /// tried at most once.
    pub(crate) fn op_checkmultisig(&mut self, script: &Script, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 1)?;
        let num_pub_keys = self.dstack.pop_int()?.to_i32();
        let max_keys = self.config().max_pub_keys_per_multisig();
        let num_pub_keys = match usize::try_from(num_pub_keys) {
            Ok(n) if n <= max_keys => n,
            _ => {
                return Err(MachineError::new(
                    MachineErrorCode::InvalidPubKeyCount,
                    format!("invalid pubkey count {}, must be between 0 and {}", num_pub_keys, max_keys),
                ))
            }
        };

        self.op_count += num_pub_keys;
        if self.op_count > self.config().max_ops() {
            return Err(MachineError::new(
                MachineErrorCode::TooManyOperations,
                format!("exceeded max operation limit of {}", self.config().max_ops()),
            ));
        }

        self.require_depth(op, num_pub_keys + 1)?;
        let mut pub_keys = Vec::with_capacity(num_pub_keys);
        for _ in 0..num_pub_keys {
            pub_keys.push(self.dstack.pop_byte_array()?);
        }

        let num_sigs = self.dstack.pop_int()?.to_i32();
        let num_sigs = match usize::try_from(num_sigs) {
            Ok(n) if n <= num_pub_keys => n,
            _ => {
                return Err(MachineError::new(
                    MachineErrorCode::InvalidSignatureCount,
                    format!("invalid signature count {} for {} pubkeys", num_sigs, num_pub_keys),
                ))
            }
        };

        // Signatures plus the unused dummy item below them.
        self.require_depth(op, num_sigs + 1)?;
        let mut sigs = Vec::with_capacity(num_sigs);
        for _ in 0..num_sigs {
            sigs.push(self.dstack.pop_byte_array()?);
        }
        self.dstack.pop_byte_array()?;

        // Popped top-first; restore script order.
        pub_keys.reverse();
        sigs.reverse();

        let sub_script = self.signed_sub_script(script, &sigs)?;

        let mut success = true;
        let mut key_idx = 0;
        let mut sig_idx = 0;
        while sig_idx < sigs.len() {
            if sigs.len() - sig_idx > pub_keys.len() - key_idx {
                success = false;
                break;
            }
            let sig = &sigs[sig_idx];
            if !sig.is_empty() && self.check_signature(sig, &pub_keys[key_idx], &sub_script)? {
                sig_idx += 1;
            }
            key_idx += 1;
        }

        debug!(
            "{} {}-of-{} on input {}: {}",
            opcode_to_string(op),
            num_sigs,
            num_pub_keys,
            self.input_index(),
            success
        );
        self.dstack.push_bool(success);
        Ok(())
    }

    pub(crate) fn op_checkmultisigverify(&mut self, script: &Script, op: u8) -> Result<(), MachineError> {
        self.op_checkmultisig(script, op)?;
        self.abstract_verify(op, MachineErrorCode::CheckMultiSigVerify)
    }
}
