/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction structure is invalid (e.g. an input index out of range).
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// An input could not be signed (e.g. missing source output).
    #[error("signing error: {0}")]
    SigningError(String),
    /// Binary or hex decoding failed.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// An underlying script error (forwarded from `btc-script`).
    #[error("script error: {0}")]
    Script(#[from] btc_script::ScriptError),
    /// Script verification of an input failed.
    #[error("verification failed: {0}")]
    Verification(#[from] btc_script::MachineError),
    /// An underlying primitives error (forwarded from `btc-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] btc_primitives::PrimitivesError),
}
