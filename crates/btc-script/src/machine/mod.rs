//! Bitcoin script verification machine.
//!
//! Runs an input's unlocking script followed by the locking script of the
//! output it spends, and for pay-to-script-hash outputs the redeem script
//! carried by the unlocking script.
//!
//! # Architecture
//!
//! The machine does not depend on the transaction crate. Callers provide a
//! [`TxContext`] implementation that supplies input scripts and checks
//! signatures against the transaction's signature hash.
//!
//! # Example
//!
//! ```ignore
//! use btc_script::{MachineConfig, ScriptMachine};
//!
//! let mut machine = ScriptMachine::with_transaction(MachineConfig::new(), &tx, 0)?;
//! machine.verify(&previous_output.locking_script)?;
//! ```

pub mod config;
pub mod error;
pub mod scriptnum;
pub mod stack;

mod exec;
mod ops_arithmetic;
mod ops_crypto;
mod ops_data;
mod ops_flow;
mod ops_stack;

pub use config::{Limits, MachineConfig, P2SH_ACTIVATION_TIME};
pub use error::{MachineError, MachineErrorCode};
pub use scriptnum::ScriptNumber;
pub use stack::Stack;

use log::debug;

use crate::Script;

/// Transaction context trait: the transaction data the machine needs
/// without a dependency on the transaction crate.
pub trait TxContext: Sync {
    /// Number of inputs in the transaction.
    fn input_count(&self) -> usize;

    /// The unlocking (signature) script of input `input_idx`.
    fn unlocking_script(&self, input_idx: usize) -> Option<&Script>;

    /// Verify a signature against a public key for the given input.
    ///
    /// `full_sig` is a DER signature followed by the sighash type byte.
    /// `sub_script` is the part of the executing script after the last
    /// OP_CODESEPARATOR, with the signature(s) and code separators removed.
    ///
    /// Returns Ok(true) if valid, Ok(false) if invalid. An `Err` that is not
    /// a contract violation is treated as an invalid signature.
    fn verify_signature(
        &self,
        full_sig: &[u8],
        pub_key: &[u8],
        sub_script: &Script,
        input_idx: usize,
    ) -> Result<bool, MachineError>;
}

/// The script verification machine for one transaction input.
///
/// Stacks persist across the scripts of a single [`ScriptMachine::verify`]
/// call; each [`ScriptMachine::run`] resets the alt stack, the condition
/// stack and the operation counter.
pub struct ScriptMachine<'a> {
    config: MachineConfig,
    tx_context: Option<&'a dyn TxContext>,
    input_index: usize,
    input_script: Option<Script>,
    pub(crate) dstack: Stack,
    pub(crate) astack: Stack,
    pub(crate) cond_stack: Vec<bool>,
    pub(crate) op_count: usize,
    pub(crate) op_index: usize,
    pub(crate) last_code_separator: Option<usize>,
}

impl<'a> ScriptMachine<'a> {
    /// A machine with no transaction. Only scripts without signature
    /// checks can be verified, and an input script must be supplied with
    /// [`ScriptMachine::with_input_script`].
    pub fn new(config: MachineConfig) -> Self {
        ScriptMachine {
            config,
            tx_context: None,
            input_index: 0,
            input_script: None,
            dstack: Stack::new(),
            astack: Stack::new(),
            cond_stack: Vec::new(),
            op_count: 0,
            op_index: 0,
            last_code_separator: None,
        }
    }

    /// A machine verifying input `input_index` of `tx`.
    ///
    /// # Returns
    /// `InvalidIndex` if the transaction has no such input.
    pub fn with_transaction(
        config: MachineConfig,
        tx: &'a dyn TxContext,
        input_index: usize,
    ) -> Result<Self, MachineError> {
        if input_index >= tx.input_count() {
            return Err(MachineError::new(
                MachineErrorCode::InvalidIndex,
                format!(
                    "input index {} out of range for transaction with {} inputs",
                    input_index,
                    tx.input_count()
                ),
            ));
        }
        let mut machine = Self::new(config);
        machine.tx_context = Some(tx);
        machine.input_index = input_index;
        Ok(machine)
    }

    /// Use `script` instead of the transaction input's unlocking script.
    pub fn with_input_script(mut self, script: Script) -> Self {
        self.input_script = Some(script);
        self
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn input_index(&self) -> usize {
        self.input_index
    }

    /// The main stack, bottom to top.
    pub fn stack(&self) -> &[Vec<u8>] {
        self.dstack.items()
    }

    /// The alt stack, bottom to top.
    pub fn alt_stack(&self) -> &[Vec<u8>] {
        self.astack.items()
    }

    pub(crate) fn tx_context(&self) -> Result<&'a dyn TxContext, MachineError> {
        self.tx_context.ok_or_else(|| {
            MachineError::new(
                MachineErrorCode::MissingTransaction,
                "signature check requires a transaction".to_string(),
            )
        })
    }

    /// Clear all stacks.
    pub fn reset_stacks(&mut self) {
        self.dstack.clear();
        self.astack.clear();
        self.cond_stack.clear();
    }

    /// Verify the input against `output_script`, the locking script of the
    /// output being spent.
    ///
    /// For pay-to-script-hash outputs, once the block time reaches
    /// [`P2SH_ACTIVATION_TIME`], the unlocking script must be data-only and
    /// its last push is run as the redeem script.
    pub fn verify(&mut self, output_script: &Script) -> Result<(), MachineError> {
        let input_script = self.resolve_input_script()?;

        self.reset_stacks();
        self.run(&input_script).map_err(|e| log_failure("input script", e))?;

        let p2sh_snapshot = if self.config.should_verify_p2sh() && output_script.is_p2sh() {
            Some(self.dstack.items().to_vec())
        } else {
            None
        };

        self.run(output_script).map_err(|e| log_failure("output script", e))?;
        self.check_top_true().map_err(|e| log_failure("output script", e))?;

        let Some(mut snapshot) = p2sh_snapshot else {
            return Ok(());
        };

        if !input_script.is_data_only() {
            return Err(log_failure(
                "p2sh",
                MachineError::new(
                    MachineErrorCode::NotPushOnly,
                    "input script for a P2SH output must contain only data pushes".to_string(),
                ),
            ));
        }

        let redeem_bytes = snapshot.pop().ok_or_else(|| {
            MachineError::new(MachineErrorCode::EmptyStack, "no redeem script on the stack".to_string())
        })?;
        let redeem_script = Script::from_vec(redeem_bytes).map_err(|e| {
            log_failure(
                "p2sh",
                MachineError::new(
                    MachineErrorCode::MalformedRedeemScript,
                    format!("redeem script does not parse: {}", e),
                ),
            )
        })?;

        self.reset_stacks();
        self.dstack.set_items(snapshot);
        self.run(&redeem_script).map_err(|e| log_failure("redeem script", e))?;
        self.check_top_true().map_err(|e| log_failure("redeem script", e))
    }

    /// Like [`ScriptMachine::verify`], collapsing every failure to `false`.
    pub fn verify_bool(&mut self, output_script: &Script) -> bool {
        match self.verify(output_script) {
            Ok(()) => true,
            Err(e) => {
                debug!("input {} rejected: {}", self.input_index, e);
                false
            }
        }
    }

    /// Execute one script against the current main stack.
    pub fn run(&mut self, script: &Script) -> Result<(), MachineError> {
        if script.len() > self.config.max_script_size() {
            return Err(MachineError::new(
                MachineErrorCode::ScriptTooBig,
                format!(
                    "script size {} is larger than the max allowed size {}",
                    script.len(),
                    self.config.max_script_size()
                ),
            ));
        }

        self.astack.clear();
        self.cond_stack.clear();
        self.op_count = 0;
        self.op_index = 0;
        self.last_code_separator = None;

        for (index, (chunk, data)) in script.operations().enumerate() {
            self.op_index = index;
            self.execute_opcode(script, chunk, data)?;
        }

        if !self.cond_stack.is_empty() {
            return Err(MachineError::new(
                MachineErrorCode::UnbalancedConditional,
                format!(
                    "end of script reached with {} unterminated conditional(s)",
                    self.cond_stack.len()
                ),
            ));
        }
        Ok(())
    }

    fn resolve_input_script(&self) -> Result<Script, MachineError> {
        if let Some(script) = &self.input_script {
            return Ok(script.clone());
        }
        let ctx = self.tx_context.ok_or_else(|| {
            MachineError::new(
                MachineErrorCode::MissingTransaction,
                "no transaction and no input script to verify".to_string(),
            )
        })?;
        ctx.unlocking_script(self.input_index).cloned().ok_or_else(|| {
            MachineError::new(
                MachineErrorCode::InvalidIndex,
                format!("transaction has no input {}", self.input_index),
            )
        })
    }

    fn check_top_true(&self) -> Result<(), MachineError> {
        if self.dstack.is_empty() {
            return Err(MachineError::new(
                MachineErrorCode::EmptyStack,
                "stack empty at end of script execution".to_string(),
            ));
        }
        if !self.dstack.peek_bool(0)? {
            return Err(MachineError::new(
                MachineErrorCode::EvalFalse,
                "false stack entry at end of script execution".to_string(),
            ));
        }
        Ok(())
    }
}

fn log_failure(stage: &str, err: MachineError) -> MachineError {
    debug!("{} failed verification ({}): {}", stage, err.code, err.description);
    err
}
