//! Script machine access to a transaction.

use btc_primitives::ec::{PublicKey, Signature};
use btc_script::{MachineError, MachineErrorCode, Script, TxContext};

use crate::sighash;
use crate::transaction::Transaction;

impl TxContext for Transaction {
    fn input_count(&self) -> usize {
        self.inputs.len()
    }

    fn unlocking_script(&self, input_idx: usize) -> Option<&Script> {
        self.inputs.get(input_idx).map(|input| &input.unlocking_script)
    }

    /// Check a DER signature plus trailing sighash byte against the legacy
    /// signature hash of `input_idx`.
    fn verify_signature(
        &self,
        full_sig: &[u8],
        pub_key: &[u8],
        sub_script: &Script,
        input_idx: usize,
    ) -> Result<bool, MachineError> {
        let Some((&hash_type, der)) = full_sig.split_last() else {
            return Ok(false);
        };

        let sig = Signature::from_der(der).map_err(|e| {
            MachineError::new(MachineErrorCode::InvalidSignatureEncoding, e.to_string())
        })?;
        let key = PublicKey::from_bytes(pub_key).map_err(|e| {
            MachineError::new(MachineErrorCode::InvalidPubKeyEncoding, e.to_string())
        })?;

        if input_idx >= self.inputs.len() {
            return Err(MachineError::new(
                MachineErrorCode::InvalidIndex,
                format!("transaction has no input {}", input_idx),
            ));
        }
        let hash = sighash::signature_hash(self, input_idx, sub_script, u32::from(hash_type))
            .map_err(|e| MachineError::new(MachineErrorCode::Internal, e.to_string()))?;

        Ok(key.verify(&hash, &sig))
    }
}

#[cfg(test)]
mod tests {
    use btc_primitives::ec::PrivateKey;
    use btc_script::opcodes::OP_CHECKSIG;
    use btc_script::{MachineConfig, ScriptMachine};

    use super::*;
    use crate::input::TransactionInput;
    use crate::output::TransactionOutput;
    use crate::sighash::SIGHASH_ALL;

    fn one_input_tx() -> (Transaction, PrivateKey, Script) {
        let key = PrivateKey::from_hex("0000000000000000000000000000000000000000000000000000000000000001")
            .expect("valid key");
        let mut lock = Script::new();
        lock.append_data(&key.pub_key().to_compressed()).expect("push");
        lock.append_opcode(OP_CHECKSIG).expect("append");

        let mut tx = Transaction::new();
        tx.add_input(TransactionInput::new([7u8; 32], 0));
        tx.add_output(TransactionOutput::new(1_000, Script::new()));
        (tx, key, lock)
    }

    fn sign(tx: &Transaction, key: &PrivateKey, script_code: &Script) -> Vec<u8> {
        let hash = sighash::signature_hash(tx, 0, script_code, SIGHASH_ALL).expect("sighash");
        let mut sig = key.sign(&hash).expect("sign").to_der();
        sig.push(SIGHASH_ALL as u8);
        sig
    }

    #[test]
    fn test_verify_signature() {
        let (tx, key, lock) = one_input_tx();
        let sig = sign(&tx, &key, &lock);
        let pub_key = key.pub_key().to_compressed();

        assert_eq!(tx.verify_signature(&sig, &pub_key, &lock, 0), Ok(true));
        assert_eq!(tx.verify_signature(&sig, &pub_key, &Script::new(), 0), Ok(false));
    }

    #[test]
    fn test_verify_signature_encoding_errors() {
        let (tx, key, lock) = one_input_tx();
        let pub_key = key.pub_key().to_compressed();

        let err = tx.verify_signature(&[0x30, 0x01, 0x01], &pub_key, &lock, 0).expect_err("bad DER");
        assert_eq!(err.code, MachineErrorCode::InvalidSignatureEncoding);
        assert!(!err.is_contract_violation());

        let sig = sign(&tx, &key, &lock);
        let err = tx.verify_signature(&sig, &[0x02, 0x01], &lock, 0).expect_err("bad key");
        assert_eq!(err.code, MachineErrorCode::InvalidPubKeyEncoding);

        let err = tx.verify_signature(&sig, &pub_key, &lock, 3).expect_err("no input");
        assert!(err.is_contract_violation());
    }

    /// A key whose x-coordinate is valid but whose tag is the SEC1 compact
    /// form (0x05) must not satisfy OP_CHECKSIG.
    #[test]
    fn test_checksig_rejects_compact_tagged_key() {
        let (mut tx, key, _) = one_input_tx();
        let mut compact = key.pub_key().to_compressed();
        compact[0] = 0x05;

        let mut lock = Script::new();
        lock.append_data(&compact).expect("push");
        lock.append_opcode(OP_CHECKSIG).expect("append");

        let sig = sign(&tx, &key, &lock);
        let err = tx.verify_signature(&sig, &compact, &lock, 0).expect_err("compact tag");
        assert_eq!(err.code, MachineErrorCode::InvalidPubKeyEncoding);

        let mut unlocking = Script::new();
        unlocking.append_data(&sig).expect("push");
        tx.inputs[0].unlocking_script = unlocking;

        let mut machine =
            ScriptMachine::with_transaction(MachineConfig::new(), &tx, 0).expect("input 0");
        let err = machine.verify(&lock).expect_err("CHECKSIG pushes false");
        assert_eq!(err.code, MachineErrorCode::EvalFalse);
    }

    #[test]
    fn test_unlocking_script_lookup() {
        let (tx, _, _) = one_input_tx();
        assert_eq!(tx.input_count(), 1);
        assert_eq!(TxContext::unlocking_script(&tx, 0), Some(&Script::new()));
        assert_eq!(TxContext::unlocking_script(&tx, 1), None);
    }
}
