//! Data inspection and equality operations.

use super::error::{MachineError, MachineErrorCode};
use super::scriptnum::ScriptNumber;
use super::ScriptMachine;

impl<'a> ScriptMachine<'a> {
    pub(crate) fn op_size(&mut self, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 1)?;
        let len = self.dstack.peek_byte_array(0)?.len();
        self.dstack.push_int(&ScriptNumber::new(len as i64));
        Ok(())
    }

    pub(crate) fn op_equal(&mut self, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 2)?;
        let a = self.dstack.pop_byte_array()?;
        let b = self.dstack.pop_byte_array()?;
        self.dstack.push_bool(a == b);
        Ok(())
    }

    pub(crate) fn op_equalverify(&mut self, op: u8) -> Result<(), MachineError> {
        self.op_equal(op)?;
        self.abstract_verify(op, MachineErrorCode::EqualVerify)
    }
}
