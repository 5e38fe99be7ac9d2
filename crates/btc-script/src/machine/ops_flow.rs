//! Flow control operations.

use crate::opcodes::opcode_to_string;

use super::error::{MachineError, MachineErrorCode};
use super::ScriptMachine;

impl<'a> ScriptMachine<'a> {
    pub(crate) fn op_reserved(&self, op: u8) -> Result<(), MachineError> {
        Err(MachineError::new(
            MachineErrorCode::ReservedOpcode,
            format!("attempt to execute reserved opcode {}", opcode_to_string(op)),
        ))
    }

    /// OP_IF / OP_NOTIF. Inside an unexecuted branch no condition is popped
    /// and the nested branch is never taken.
    pub(crate) fn op_if(&mut self, op: u8, negate: bool) -> Result<(), MachineError> {
        let mut taken = false;
        if self.is_branch_executing() {
            self.require_depth(op, 1)?;
            taken = self.dstack.pop_bool()? != negate;
        }
        self.cond_stack.push(taken);
        Ok(())
    }

    pub(crate) fn op_else(&mut self, op: u8) -> Result<(), MachineError> {
        match self.cond_stack.last_mut() {
            Some(top) => {
                *top = !*top;
                Ok(())
            }
            None => Err(unbalanced(op)),
        }
    }

    pub(crate) fn op_endif(&mut self, op: u8) -> Result<(), MachineError> {
        self.cond_stack.pop().map(|_| ()).ok_or_else(|| unbalanced(op))
    }

    pub(crate) fn op_verify(&mut self, op: u8) -> Result<(), MachineError> {
        self.abstract_verify(op, MachineErrorCode::Verify)
    }

    /// Pop the top item and fail with `code` unless it is true.
    pub(crate) fn abstract_verify(&mut self, op: u8, code: MachineErrorCode) -> Result<(), MachineError> {
        self.require_depth(op, 1)?;
        if !self.dstack.pop_bool()? {
            return Err(MachineError::new(code, format!("{} failed", opcode_to_string(op))));
        }
        Ok(())
    }

    pub(crate) fn op_return(&self) -> Result<(), MachineError> {
        Err(MachineError::new(
            MachineErrorCode::EarlyReturn,
            "script returned early".to_string(),
        ))
    }
}

fn unbalanced(op: u8) -> MachineError {
    MachineError::new(
        MachineErrorCode::UnbalancedConditional,
        format!(
            "encountered opcode {} with no matching opcode to begin conditional execution",
            opcode_to_string(op)
        ),
    )
}
