//! Core transaction type.
//!
//! Represents a complete transaction with version, inputs, outputs and
//! lock time. Supports binary and hex serialization, txid computation,
//! coinbase detection, signature hashing and script verification of its
//! inputs.

use btc_primitives::hash::sha256d;
use btc_primitives::util::{ByteReader, ByteWriter, VarInt};
use btc_script::{MachineConfig, Script, ScriptMachine};

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::sighash;
use crate::TransactionError;

/// A transaction: a version, inputs, outputs and a lock time.
///
/// # Wire format
///
/// | Field        | Size                      |
/// |--------------|---------------------------|
/// | version      | 4 bytes (LE)              |
/// | input count  | VarInt                    |
/// | inputs       | variable (per input)      |
/// | output count | VarInt                    |
/// | outputs      | variable (per output)     |
/// | lock_time    | 4 bytes (LE)              |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    /// Block height or Unix time before which the transaction is not final.
    pub lock_time: u32,
}

impl Transaction {
    /// Create an empty transaction with version 1 and lock time 0.
    pub fn new() -> Self {
        Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str).map_err(|e| {
            TransactionError::SerializationError(format!("invalid hex: {}", e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parse exactly one transaction from `bytes`; trailing data is an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let version = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading version: {}", e))
        })?;

        let input_count = read_count(reader, "input count")?;
        let mut inputs = Vec::with_capacity(input_count.min(reader.remaining()));
        for _ in 0..input_count {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = read_count(reader, "output count")?;
        let mut outputs = Vec::with_capacity(output_count.min(reader.remaining()));
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        let lock_time = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading lock time: {}", e))
        })?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        writer.write_u32_le(self.version);

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(&mut writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(&mut writer);
        }

        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Size of the serialized transaction in bytes.
    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    // -----------------------------------------------------------------
    // Transaction ID
    // -----------------------------------------------------------------

    /// Double SHA-256 of the serialized transaction, in internal byte order.
    pub fn tx_id(&self) -> [u8; 32] {
        sha256d(&self.to_bytes())
    }

    /// The txid in display order (byte-reversed hex).
    pub fn tx_id_hex(&self) -> String {
        let mut id = self.tx_id();
        id.reverse();
        hex::encode(id)
    }

    // -----------------------------------------------------------------
    // Inputs and outputs
    // -----------------------------------------------------------------

    pub fn add_input(&mut self, input: TransactionInput) {
        self.inputs.push(input);
    }

    /// Add an input spending a known output.
    ///
    /// # Arguments
    /// * `prev_tx_id` - Hex txid of the source transaction, in display order.
    /// * `vout` - Index of the spent output.
    /// * `locking_script` - Locking script of the spent output.
    /// * `satoshis` - Value of the spent output.
    pub fn add_input_from(
        &mut self,
        prev_tx_id: &str,
        vout: u32,
        locking_script: Script,
        satoshis: u64,
    ) -> Result<(), TransactionError> {
        let mut txid = hex::decode(prev_tx_id).map_err(|e| {
            TransactionError::SerializationError(format!("invalid txid hex: {}", e))
        })?;
        txid.reverse();
        let source_txid: [u8; 32] = txid.try_into().map_err(|v: Vec<u8>| {
            TransactionError::SerializationError(format!("txid must be 32 bytes, got {}", v.len()))
        })?;

        let mut input = TransactionInput::new(source_txid, vout);
        input.set_source_output(Some(TransactionOutput::new(satoshis, locking_script)));
        self.inputs.push(input);
        Ok(())
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn add_output(&mut self, output: TransactionOutput) {
        self.outputs.push(output);
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn total_output_satoshis(&self) -> u64 {
        self.outputs.iter().map(|o| o.satoshis).sum()
    }

    /// Sum of the values of all spent outputs; every input must have its
    /// source output attached.
    pub fn total_input_satoshis(&self) -> Result<u64, TransactionError> {
        self.inputs.iter().enumerate().try_fold(0u64, |total, (i, input)| {
            input
                .source_satoshis()
                .map(|sats| total + sats)
                .ok_or_else(|| missing_source(i))
        })
    }

    /// A coinbase has a single input spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        match self.inputs.as_slice() {
            [input] => input.source_txid == [0u8; 32] && input.source_tx_out_index == 0xFFFF_FFFF,
            _ => false,
        }
    }

    // -----------------------------------------------------------------
    // Signing and verification
    // -----------------------------------------------------------------

    /// Legacy signature hash for `input_index`, using the attached source
    /// output's locking script as the script code.
    pub fn calc_input_signature_hash(
        &self,
        input_index: usize,
        sighash_type: u32,
    ) -> Result<[u8; 32], TransactionError> {
        let script_code = self.source_locking_script(input_index)?;
        sighash::signature_hash(self, input_index, script_code, sighash_type)
    }

    /// Run the script machine for `input_index` against its attached source
    /// output.
    pub fn verify_input(&self, input_index: usize, config: MachineConfig) -> Result<(), TransactionError> {
        let locking_script = self.source_locking_script(input_index)?;
        let mut machine = ScriptMachine::with_transaction(config, self, input_index)?;
        machine.verify(locking_script)?;
        Ok(())
    }

    /// Verify every input; stops at the first failure.
    pub fn verify(&self, config: MachineConfig) -> Result<(), TransactionError> {
        for i in 0..self.inputs.len() {
            self.verify_input(i, config.clone())?;
        }
        Ok(())
    }

    fn source_locking_script(&self, input_index: usize) -> Result<&Script, TransactionError> {
        let input = self.inputs.get(input_index).ok_or_else(|| {
            TransactionError::InvalidTransaction(format!(
                "input index {} out of range (tx has {} inputs)",
                input_index,
                self.inputs.len()
            ))
        })?;
        input
            .source_locking_script()
            .ok_or_else(|| missing_source(input_index))
    }
}

fn read_count(reader: &mut ByteReader, what: &str) -> Result<usize, TransactionError> {
    let count = reader.read_varint().map_err(|e| {
        TransactionError::SerializationError(format!("reading {}: {}", what, e))
    })?;
    usize::try_from(count.value())
        .map_err(|_| TransactionError::SerializationError(format!("{} too large", what)))
}

fn missing_source(input_index: usize) -> TransactionError {
    TransactionError::SigningError(format!(
        "input {} has no source output attached",
        input_index
    ))
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Transaction {
    /// Display the transaction as its hex-encoded serialization.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
