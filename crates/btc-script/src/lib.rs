/// Bitcoin script engine - Script parsing, classification and execution.
///
/// Provides the opcode table, chunk-level push-data parsing, the `Script`
/// container with template classification and mutation, address
/// templates, and the `ScriptMachine` that verifies unlocking scripts
/// against locking scripts.

pub mod script;
pub mod opcodes;
pub mod chunk;
pub mod address;
pub mod machine;

mod error;
pub use error::ScriptError;
pub use script::{MultisigRequirement, Script};
pub use address::{Address, AddressType, Network};
pub use chunk::{PushWidth, ScriptChunk};
pub use machine::{MachineConfig, MachineError, MachineErrorCode, ScriptMachine, TxContext};
