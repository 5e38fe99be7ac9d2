/// Bitcoin script engine - Transactions and legacy signature hashing.
///
/// Provides the Transaction type with inputs and outputs, binary/hex
/// serialization, legacy signature hash computation, script templates,
/// and the `TxContext` implementation that lets the script machine check
/// signatures against a transaction.

pub mod transaction;
pub mod input;
pub mod output;
pub mod sighash;
pub mod template;

mod context;
mod error;
pub use error::TransactionError;
pub use transaction::Transaction;
pub use input::TransactionInput;
pub use output::TransactionOutput;
