//! Transaction input referencing a previous output.

use btc_primitives::util::{ByteReader, ByteWriter};
use btc_script::Script;

use crate::output::TransactionOutput;
use crate::TransactionError;

/// Default sequence number indicating a finalized input.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single input of a transaction.
///
/// The input names the output it spends by `source_txid` and
/// `source_tx_out_index`. The spent output itself is not part of the wire
/// format; attach it with [`TransactionInput::set_source_output`] so the
/// input can be signed and verified.
///
/// # Wire format
///
/// | Field              | Size             |
/// |--------------------|------------------|
/// | source_txid        | 32 bytes (LE)    |
/// | source_tx_out_index| 4 bytes (LE)     |
/// | script length      | VarInt           |
/// | unlocking_script   | variable         |
/// | sequence_number    | 4 bytes (LE)     |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    /// Txid of the transaction holding the spent output, in internal byte order.
    pub source_txid: [u8; 32],

    /// Index of the spent output within the source transaction.
    pub source_tx_out_index: u32,

    pub sequence_number: u32,

    /// The unlocking script (scriptSig). Empty until the input is signed.
    pub unlocking_script: Script,

    source_output: Option<TransactionOutput>,
}

impl TransactionInput {
    /// An input spending output `vout` of the transaction with internal-order id `source_txid`.
    pub fn new(source_txid: [u8; 32], vout: u32) -> Self {
        TransactionInput {
            source_txid,
            source_tx_out_index: vout,
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            unlocking_script: Script::new(),
            source_output: None,
        }
    }

    /// Deserialize an input from a `ByteReader`.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let txid_bytes = reader.read_bytes(32).map_err(|e| {
            TransactionError::SerializationError(format!("reading source txid: {}", e))
        })?;
        let mut source_txid = [0u8; 32];
        source_txid.copy_from_slice(txid_bytes);

        let source_tx_out_index = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading output index: {}", e))
        })?;

        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading unlocking script: {}", e))
        })?;
        let unlocking_script = Script::from_bytes(script_bytes)?;

        let sequence_number = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence number: {}", e))
        })?;

        Ok(TransactionInput {
            source_txid,
            source_tx_out_index,
            sequence_number,
            unlocking_script,
            source_output: None,
        })
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        self.write_with_script(writer, &self.unlocking_script, self.sequence_number);
    }

    /// Write the input with its script and sequence replaced, as the
    /// signature hash serialization requires.
    pub(crate) fn write_with_script(&self, writer: &mut ByteWriter, script: &Script, sequence: u32) {
        writer.write_bytes(&self.source_txid);
        writer.write_u32_le(self.source_tx_out_index);
        writer.write_var_bytes(script.as_bytes());
        writer.write_u32_le(sequence);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Attach (or clear) the output this input spends.
    pub fn set_source_output(&mut self, output: Option<TransactionOutput>) {
        self.source_output = output;
    }

    /// The spent output, if attached.
    pub fn source_output(&self) -> Option<&TransactionOutput> {
        self.source_output.as_ref()
    }

    pub fn source_satoshis(&self) -> Option<u64> {
        self.source_output().map(|o| o.satoshis)
    }

    /// Locking script of the spent output, if attached.
    pub fn source_locking_script(&self) -> Option<&Script> {
        self.source_output().map(|o| &o.locking_script)
    }
}
