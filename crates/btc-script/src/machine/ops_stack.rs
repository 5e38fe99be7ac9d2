//! Stack manipulation operations.

use crate::opcodes::opcode_to_string;

use super::error::{MachineError, MachineErrorCode};
use super::stack::{as_bool, Stack};
use super::ScriptMachine;

impl<'a> ScriptMachine<'a> {
    /// Run a fixed-arity stack shuffle after checking the stack holds `depth` items.
    pub(crate) fn op_shuffle(
        &mut self,
        op: u8,
        depth: usize,
        f: impl FnOnce(&mut Stack) -> Result<(), MachineError>,
    ) -> Result<(), MachineError> {
        self.require_depth(op, depth)?;
        f(&mut self.dstack)
    }

    pub(crate) fn op_to_alt_stack(&mut self, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 1)?;
        let data = self.dstack.pop_byte_array()?;
        self.astack.push_byte_array(data);
        Ok(())
    }

    pub(crate) fn op_from_alt_stack(&mut self, _op: u8) -> Result<(), MachineError> {
        let data = self.astack.pop_byte_array().map_err(|_| {
            MachineError::new(
                MachineErrorCode::InvalidStackOperation,
                "OP_FROMALTSTACK requires an item on the alt stack".to_string(),
            )
        })?;
        self.dstack.push_byte_array(data);
        Ok(())
    }

    pub(crate) fn op_ifdup(&mut self, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 1)?;
        let so = self.dstack.peek_byte_array(0)?;
        if as_bool(so) {
            let so = so.to_vec();
            self.dstack.push_byte_array(so);
        }
        Ok(())
    }

    pub(crate) fn op_pick(&mut self, op: u8) -> Result<(), MachineError> {
        let n = self.pop_stack_index(op)?;
        self.dstack.pick_n(n)
    }

    pub(crate) fn op_roll(&mut self, op: u8) -> Result<(), MachineError> {
        let n = self.pop_stack_index(op)?;
        self.dstack.roll_n(n)
    }

    /// Pop the depth operand of OP_PICK / OP_ROLL and check it addresses an item.
    fn pop_stack_index(&mut self, op: u8) -> Result<usize, MachineError> {
        self.require_depth(op, 2)?;
        let n = self.dstack.pop_int()?.to_i32();
        match usize::try_from(n) {
            Ok(n) if n < self.dstack.depth() => Ok(n),
            _ => Err(MachineError::new(
                MachineErrorCode::InvalidStackOperation,
                format!(
                    "{} index {} is invalid for stack size {}",
                    opcode_to_string(op),
                    n,
                    self.dstack.depth()
                ),
            )),
        }
    }
}
