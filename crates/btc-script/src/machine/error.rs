//! Script machine error types.

use std::fmt;

/// Error codes for the script machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineErrorCode {
    /// No transaction was supplied where one is required.
    MissingTransaction,
    /// The input index does not name an input of the transaction.
    InvalidIndex,
    ScriptTooBig,
    ElementTooBig,
    TooManyOperations,
    DisabledOpcode,
    ReservedOpcode,
    EarlyReturn,
    EmptyStack,
    EvalFalse,
    InvalidStackOperation,
    UnbalancedConditional,
    NumberTooBig,
    MinimalData,
    Verify,
    EqualVerify,
    NumEqualVerify,
    CheckSigVerify,
    CheckMultiSigVerify,
    InvalidPubKeyCount,
    InvalidSignatureCount,
    NotPushOnly,
    MalformedRedeemScript,
    InvalidSignatureEncoding,
    InvalidPubKeyEncoding,
    /// Sub-script preparation failed while checking a signature.
    Internal,
}

impl fmt::Display for MachineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A script machine error with an error code and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineError {
    pub code: MachineErrorCode,
    pub description: String,
}

impl MachineError {
    pub fn new(code: MachineErrorCode, description: String) -> Self {
        MachineError { code, description }
    }

    /// True for errors caused by the caller rather than by script content.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self.code,
            MachineErrorCode::MissingTransaction | MachineErrorCode::InvalidIndex
        )
    }
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

impl std::error::Error for MachineError {}

/// Check if an error has a specific error code.
pub fn is_error_code(err: &MachineError, code: MachineErrorCode) -> bool {
    err.code == code
}
