//! Legacy signature hash computation.
//!
//! The hash an ECDSA signature commits to is the double SHA-256 of a
//! modified copy of the spending transaction followed by the 4-byte
//! little-endian sighash type. The copy replaces every unlocking script
//! with an empty script, except the signed input's, which becomes the
//! script code (the executing script after its last OP_CODESEPARATOR).
//! The sighash type then prunes inputs and outputs.

use btc_primitives::hash::sha256d;
use btc_primitives::util::{ByteWriter, VarInt};
use btc_script::opcodes::OP_CODESEPARATOR;
use btc_script::Script;

use crate::output::TransactionOutput;
use crate::transaction::Transaction;
use crate::TransactionError;

// -----------------------------------------------------------------------
// Sighash flag constants
// -----------------------------------------------------------------------

/// Sign all inputs and all outputs (the default).
pub const SIGHASH_ALL: u32 = 0x01;

/// Sign all inputs but no outputs, allowing outputs to be modified.
pub const SIGHASH_NONE: u32 = 0x02;

/// Sign all inputs and only the output with the same index as the signed input.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Combined with another flag: only sign the current input, allowing other
/// inputs to be added later.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Mask applied to extract the base sighash type (ALL, NONE, SINGLE).
pub const SIGHASH_MASK: u32 = 0x1f;

/// Returned for SIGHASH_SINGLE when the input has no matching output: the
/// number one as a little-endian 256-bit integer.
pub const SIGHASH_SINGLE_BUG_HASH: [u8; 32] = {
    let mut one = [0u8; 32];
    one[0] = 1;
    one
};

/// Compute the legacy signature hash for input `input_index`.
///
/// # Arguments
/// * `tx`          - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `script_code` - The script being satisfied; any OP_CODESEPARATOR is removed.
/// * `sighash_type`- The sighash flags, as appended to the signature.
///
/// # Returns
/// A 32-byte double-SHA256 hash to be signed by ECDSA.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    sighash_type: u32,
) -> Result<[u8; 32], TransactionError> {
    check_index(tx, input_index)?;

    if sighash_type & SIGHASH_MASK == SIGHASH_SINGLE && input_index >= tx.outputs.len() {
        return Ok(SIGHASH_SINGLE_BUG_HASH);
    }

    let preimage = calc_preimage(tx, input_index, script_code, sighash_type)?;
    Ok(sha256d(&preimage))
}

/// Serialize the modified transaction and sighash type that
/// [`signature_hash`] double-hashes.
///
/// For SIGHASH_SINGLE the signed input must have a matching output.
pub fn calc_preimage(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    sighash_type: u32,
) -> Result<Vec<u8>, TransactionError> {
    check_index(tx, input_index)?;

    let base_type = sighash_type & SIGHASH_MASK;
    if base_type == SIGHASH_SINGLE && input_index >= tx.outputs.len() {
        return Err(TransactionError::InvalidTransaction(format!(
            "SIGHASH_SINGLE on input {} with only {} outputs",
            input_index,
            tx.outputs.len()
        )));
    }

    let mut script_code = script_code.clone();
    script_code.delete_occurrences_of_opcode(OP_CODESEPARATOR)?;
    let empty = Script::new();

    let mut writer = ByteWriter::with_capacity(256);
    writer.write_u32_le(tx.version);

    // Inputs
    if sighash_type & SIGHASH_ANYONECANPAY != 0 {
        let input = &tx.inputs[input_index];
        writer.write_varint(VarInt(1));
        input.write_with_script(&mut writer, &script_code, input.sequence_number);
    } else {
        writer.write_varint(VarInt::from(tx.inputs.len()));
        for (i, input) in tx.inputs.iter().enumerate() {
            let (script, sequence) = if i == input_index {
                (&script_code, input.sequence_number)
            } else if base_type == SIGHASH_NONE || base_type == SIGHASH_SINGLE {
                (&empty, 0)
            } else {
                (&empty, input.sequence_number)
            };
            input.write_with_script(&mut writer, script, sequence);
        }
    }

    // Outputs
    match base_type {
        SIGHASH_NONE => writer.write_varint(VarInt(0)),
        SIGHASH_SINGLE => {
            writer.write_varint(VarInt::from(input_index + 1));
            for _ in 0..input_index {
                TransactionOutput::write_blank(&mut writer);
            }
            tx.outputs[input_index].write_to(&mut writer);
        }
        _ => {
            writer.write_varint(VarInt::from(tx.outputs.len()));
            for output in &tx.outputs {
                output.write_to(&mut writer);
            }
        }
    }

    writer.write_u32_le(tx.lock_time);
    writer.write_u32_le(sighash_type);

    Ok(writer.into_bytes())
}

fn check_index(tx: &Transaction, input_index: usize) -> Result<(), TransactionError> {
    if input_index >= tx.inputs.len() {
        return Err(TransactionError::InvalidTransaction(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        )));
    }
    Ok(())
}
