//! Script machine configuration: protocol limits and the P2SH activation clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// Block time (2012-04-01 00:00:00 UTC) from which P2SH redeem scripts are evaluated.
pub const P2SH_ACTIVATION_TIME: u32 = 1_333_238_400;
/// Scripts longer than this many bytes fail to run.
pub const MAX_SCRIPT_SIZE: usize = 10_000;
/// Largest payload a single push may carry.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;
/// Non-push operations allowed per script, multisig key counts included.
pub const MAX_OPS_PER_SCRIPT: usize = 201;
/// Public keys allowed in one OP_CHECKMULTISIG.
pub const MAX_PUB_KEYS_PER_MULTISIG: usize = 20;
/// Byte length of numeric operands.
pub const MAX_SCRIPT_NUMBER_LENGTH: usize = 4;

/// Resource limits enforced while running a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub max_script_size: usize,
    pub max_element_size: usize,
    pub max_ops: usize,
    pub max_pub_keys_per_multisig: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_script_size: MAX_SCRIPT_SIZE,
            max_element_size: MAX_SCRIPT_ELEMENT_SIZE,
            max_ops: MAX_OPS_PER_SCRIPT,
            max_pub_keys_per_multisig: MAX_PUB_KEYS_PER_MULTISIG,
        }
    }
}

/// Settings for one [`ScriptMachine`](super::ScriptMachine).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// Timestamp of the block the spending transaction is in.
    pub block_timestamp: u32,
    pub limits: Limits,
}

impl MachineConfig {
    /// Default limits with the block timestamp set to the current time,
    /// so the latest protocol rules apply.
    pub fn new() -> Self {
        MachineConfig {
            block_timestamp: current_timestamp(),
            limits: Limits::default(),
        }
    }

    pub fn with_block_timestamp(mut self, block_timestamp: u32) -> Self {
        self.block_timestamp = block_timestamp;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// True once the block time has reached [`P2SH_ACTIVATION_TIME`].
    pub fn should_verify_p2sh(&self) -> bool {
        self.block_timestamp >= P2SH_ACTIVATION_TIME
    }

    pub fn max_script_size(&self) -> usize {
        self.limits.max_script_size
    }

    pub fn max_element_size(&self) -> usize {
        self.limits.max_element_size
    }

    pub fn max_ops(&self) -> usize {
        self.limits.max_ops
    }

    pub fn max_pub_keys_per_multisig(&self) -> usize {
        self.limits.max_pub_keys_per_multisig
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
