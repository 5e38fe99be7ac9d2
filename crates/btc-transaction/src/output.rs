//! Transaction output with satoshi value and locking script.

use btc_primitives::util::{ByteReader, ByteWriter, VarInt};
use btc_script::Script;

use crate::TransactionError;

/// A single output of a transaction.
///
/// # Wire format
///
/// | Field            | Size           |
/// |------------------|----------------|
/// | satoshis         | 8 bytes (LE)   |
/// | script length    | VarInt         |
/// | locking_script   | variable       |
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Value locked by this output, in satoshis.
    pub satoshis: u64,

    /// The locking script (scriptPubKey) that defines spending conditions.
    pub locking_script: Script,
}

impl TransactionOutput {
    pub fn new(satoshis: u64, locking_script: Script) -> Self {
        TransactionOutput { satoshis, locking_script }
    }

    /// Deserialize an output from a `ByteReader`.
    ///
    /// # Returns
    /// The output, or a `TransactionError` if the data is truncated or the
    /// locking script does not parse.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let satoshis = reader.read_u64_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading satoshis: {}", e))
        })?;

        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading locking script: {}", e))
        })?;

        Ok(TransactionOutput {
            satoshis,
            locking_script: Script::from_bytes(script_bytes)?,
        })
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u64_le(self.satoshis);
        writer.write_var_bytes(self.locking_script.as_bytes());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Write the blanked form used for outputs before the signed one under
    /// SIGHASH_SINGLE: value -1 and an empty script.
    pub(crate) fn write_blank(writer: &mut ByteWriter) {
        writer.write_u64_le(u64::MAX);
        writer.write_varint(VarInt(0));
    }
}
