//! End-to-end spends of the three standard output shapes: pay-to-pubkey-hash,
//! bare multisig and pay-to-script-hash multisig.

use btc_primitives::ec::{PrivateKey, PublicKey};
use btc_script::opcodes::*;
use btc_script::{Address, MachineConfig, MachineErrorCode, Network, Script, ScriptMachine};
use btc_transaction::template::{multisig, p2pkh, p2sh, UnlockingScriptTemplate};
use btc_transaction::{Transaction, TransactionError, TransactionOutput};

const FUNDING_TXID: &str = "a0f39f414a691e570fff199d0a350c864d71237b13fb0093d9546adc7f45bca9";

fn key(n: u8) -> PrivateKey {
    PrivateKey::from_hex(&format!("{:064x}", 0x1000 + n as u32)).unwrap()
}

/// A one-in one-out transaction spending an output locked by `locking_script`.
fn spending_tx(locking_script: Script) -> Transaction {
    let mut tx = Transaction::new();
    tx.add_input_from(FUNDING_TXID, 1, locking_script, 100_000).unwrap();
    tx.add_output(TransactionOutput::new(
        99_000,
        Script::from_hex("76a914bd492b67f90cb85918494767ebb23102c4f06b7088ac").unwrap(),
    ));
    tx
}

fn verify_against(tx: &Transaction, locking_script: &Script) -> Result<(), btc_script::MachineError> {
    ScriptMachine::with_transaction(MachineConfig::new(), tx, 0)?.verify(locking_script)
}

fn code_of(err: TransactionError) -> MachineErrorCode {
    match err {
        TransactionError::Verification(e) => e.code,
        other => panic!("expected a verification failure, got {:?}", other),
    }
}

#[test]
fn pay_to_pubkey_hash() {
    let signer = key(1);
    let address = Address::from_public_key(&signer.pub_key().to_compressed(), Network::Mainnet);
    let lock = p2pkh::lock(&address).unwrap();
    assert_eq!(lock.to_asm().split_whitespace().next(), Some("OP_DUP"));

    let mut tx = spending_tx(lock);
    tx.inputs[0].unlocking_script = p2pkh::unlock(signer, None).sign(&tx, 0).unwrap();
    tx.verify_input(0, MachineConfig::new()).unwrap();

    // Flip a byte inside the DER-encoded s value.
    let sig = tx.inputs[0].unlocking_script.pushed_data_at(0).unwrap().to_vec();
    let pubkey = tx.inputs[0].unlocking_script.pushed_data_at(1).unwrap().to_vec();
    let mut corrupted = sig.clone();
    let at = corrupted.len() - 4;
    corrupted[at] ^= 0x01;

    let mut unlocking = Script::new();
    unlocking.append_data(&corrupted).unwrap();
    unlocking.append_data(&pubkey).unwrap();
    tx.inputs[0].unlocking_script = unlocking;

    let err = tx.verify_input(0, MachineConfig::new()).unwrap_err();
    assert_eq!(code_of(err), MachineErrorCode::EvalFalse);
}

#[test]
fn pay_to_pubkey_hash_with_wrong_pubkey_fails_at_equalverify() {
    let signer = key(1);
    let address = Address::from_public_key(&signer.pub_key().to_compressed(), Network::Mainnet);
    let mut tx = spending_tx(p2pkh::lock(&address).unwrap());
    tx.inputs[0].unlocking_script = p2pkh::unlock(key(2), None).sign(&tx, 0).unwrap();

    let err = tx.verify_input(0, MachineConfig::new()).unwrap_err();
    assert_eq!(code_of(err), MachineErrorCode::EqualVerify);
}

#[test]
fn bare_two_of_two_multisig() {
    let (k1, k2) = (key(1), key(2));
    let keys: Vec<PublicKey> = vec![k1.pub_key(), k2.pub_key()];
    let lock = multisig::lock(&keys, 2).unwrap();
    assert!(lock.is_multisig());
    assert_eq!(lock.multisig_required_signatures(), Some(2));

    let mut tx = spending_tx(lock.clone());
    let unlocker = multisig::unlock(vec![k1, k2], None);
    tx.inputs[0].unlocking_script = unlocker.sign(&tx, 0).unwrap();
    assert!(tx.inputs[0].unlocking_script.len() as u32 <= unlocker.estimate_length(&tx, 0));
    tx.verify_input(0, MachineConfig::new()).unwrap();

    // Same signatures against the keys in the opposite order.
    let swapped = multisig::lock(&[keys[1].clone(), keys[0].clone()], 2).unwrap();
    let err = verify_against(&tx, &swapped).unwrap_err();
    assert_eq!(err.code, MachineErrorCode::EvalFalse);
}

#[test]
fn bare_multisig_signatures_out_of_key_order_fail() {
    let (k1, k2) = (key(1), key(2));
    let lock = multisig::lock(&[k1.pub_key(), k2.pub_key()], 2).unwrap();
    let mut tx = spending_tx(lock);
    tx.inputs[0].unlocking_script = multisig::unlock(vec![k2, k1], None).sign(&tx, 0).unwrap();

    let err = tx.verify_input(0, MachineConfig::new()).unwrap_err();
    assert_eq!(code_of(err), MachineErrorCode::EvalFalse);
}

#[test]
fn multisig_lock_rejects_bad_threshold() {
    let keys = vec![key(1).pub_key(), key(2).pub_key()];
    assert!(multisig::lock(&keys, 3).is_err());
    assert!(multisig::lock(&keys, 0).is_err());
}

fn two_of_three_redeem() -> (Script, Vec<PrivateKey>) {
    let keys = vec![key(1), key(2), key(3)];
    let pubs: Vec<PublicKey> = keys.iter().map(|k| k.pub_key()).collect();
    (multisig::lock(&pubs, 2).unwrap(), keys)
}

#[test]
fn pay_to_script_hash_two_of_three() {
    let (redeem, keys) = two_of_three_redeem();
    let lock = p2sh::lock(&redeem);
    assert!(lock.is_p2sh());

    let mut tx = spending_tx(lock);
    // Any two of the three keys, in key order.
    let signer = p2sh::unlock_multisig(redeem.clone(), vec![keys[0].clone(), keys[2].clone()], None);
    tx.inputs[0].unlocking_script = signer.sign(&tx, 0).unwrap();
    assert_eq!(tx.inputs[0].unlocking_script.pushed_data_at(-1), Some(redeem.as_bytes()));
    assert!(tx.inputs[0].unlocking_script.is_data_only());
    tx.verify_input(0, MachineConfig::new()).unwrap();
}

#[test]
fn mutated_redeem_script_fails_before_it_runs() {
    let (redeem, keys) = two_of_three_redeem();
    let mut tx = spending_tx(p2sh::lock(&redeem));
    let signer = p2sh::unlock_multisig(redeem.clone(), vec![keys[0].clone(), keys[1].clone()], None);
    let signed = signer.sign(&tx, 0).unwrap();

    // Swap the trailing OP_CHECKMULTISIG for OP_VERIF, which would fail
    // with ReservedOpcode if the redeem script were executed.
    let mut mutated = redeem.to_bytes();
    let last = mutated.len() - 1;
    assert_eq!(mutated[last], OP_CHECKMULTISIG);
    mutated[last] = OP_VERIF;

    let mut unlocking = Script::new();
    unlocking.append_opcode(OP_0).unwrap();
    unlocking.append_data(signed.pushed_data_at(1).unwrap()).unwrap();
    unlocking.append_data(signed.pushed_data_at(2).unwrap()).unwrap();
    unlocking.append_data(&mutated).unwrap();
    tx.inputs[0].unlocking_script = unlocking;

    let err = tx.verify_input(0, MachineConfig::new()).unwrap_err();
    assert_eq!(code_of(err), MachineErrorCode::EvalFalse);
}

#[test]
fn p2sh_redeem_runs_only_after_activation() {
    let (redeem, keys) = two_of_three_redeem();
    let mut tx = spending_tx(p2sh::lock(&redeem));
    // The second signature comes from a key outside the redeem script.
    let signer = p2sh::unlock_multisig(redeem.clone(), vec![keys[0].clone(), key(9)], None);
    tx.inputs[0].unlocking_script = signer.sign(&tx, 0).unwrap();

    // The hash matches but the 2-of-3 redeem script finds only one valid signature.
    let err = tx.verify_input(0, MachineConfig::new()).unwrap_err();
    assert_eq!(code_of(err), MachineErrorCode::EvalFalse);

    // Before activation only the hash commitment is checked.
    let before = MachineConfig::new().with_block_timestamp(1_333_238_399);
    tx.verify_input(0, before).unwrap();
}

#[test]
fn p2sh_signer_rejects_foreign_output() {
    let (redeem, keys) = two_of_three_redeem();
    let other = Script::from_asm("OP_1").unwrap();
    let tx = spending_tx(p2sh::lock(&other));
    let signer = p2sh::unlock_multisig(redeem, keys, None);
    assert!(matches!(signer.sign(&tx, 0), Err(TransactionError::SigningError(_))));
}

#[test]
fn verify_rejects_input_index_out_of_range() {
    let tx = spending_tx(Script::from_asm("OP_1").unwrap());
    let err = ScriptMachine::with_transaction(MachineConfig::new(), &tx, 3)
        .err()
        .expect("no input 3");
    assert!(err.is_contract_violation());
    assert!(tx.verify_input(3, MachineConfig::new()).is_err());
}
