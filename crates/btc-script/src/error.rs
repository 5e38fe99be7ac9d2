use crate::machine::MachineError;

/// Error types for script operations.
///
/// Covers parsing and encoding failures, template construction
/// preconditions, address validation and script execution.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Generic invalid script error.
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// Invalid opcode data encountered during ASM parsing.
    #[error("invalid opcode data: {0}")]
    InvalidOpcodeData(String),

    /// Attempted to append a push opcode without its payload.
    #[error("use append_data for push opcodes: {0}")]
    InvalidOpcodeType(String),

    /// Multisig template preconditions not met.
    #[error("invalid multisig: {0}")]
    InvalidMultisig(String),

    /// Invalid address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Address version byte is not a known pubkey-hash or script-hash version.
    #[error("unsupported address version {0:#04x}")]
    UnsupportedAddress(u8),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Script is not a P2PKH script.
    #[error("not a P2PKH")]
    NotP2PKH,

    /// Not enough data in script to complete a push operation.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds the size the requested encoding can describe.
    #[error("data too big")]
    DataTooBig,

    /// Chunk index is out of range.
    #[error("script index out of range")]
    IndexOutOfRange,

    /// Script execution failed.
    #[error("script execution failed: {0}")]
    Machine(#[from] MachineError),

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] btc_primitives::PrimitivesError),
}
