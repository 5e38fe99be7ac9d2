//! Numeric operations. Operands are minimally encoded numbers of at most
//! four bytes; results may be wider.

use super::error::{MachineError, MachineErrorCode};
use super::scriptnum::ScriptNumber;
use super::ScriptMachine;

impl<'a> ScriptMachine<'a> {
    pub(crate) fn op_unary_int(&mut self, op: u8, f: impl FnOnce(&mut ScriptNumber)) -> Result<(), MachineError> {
        self.require_depth(op, 1)?;
        let mut m = self.dstack.pop_int()?;
        f(&mut m);
        self.dstack.push_int(&m);
        Ok(())
    }

    pub(crate) fn op_not(&mut self, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 1)?;
        let m = self.dstack.pop_int()?;
        self.dstack.push_bool(m.is_zero());
        Ok(())
    }

    pub(crate) fn op_0notequal(&mut self, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 1)?;
        let m = self.dstack.pop_int()?;
        self.dstack.push_bool(!m.is_zero());
        Ok(())
    }

    pub(crate) fn op_add(&mut self, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 2)?;
        let v0 = self.dstack.pop_int()?;
        let mut v1 = self.dstack.pop_int()?;
        v1.add(&v0);
        self.dstack.push_int(&v1);
        Ok(())
    }

    pub(crate) fn op_sub(&mut self, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 2)?;
        let v0 = self.dstack.pop_int()?;
        let mut v1 = self.dstack.pop_int()?;
        v1.sub(&v0);
        self.dstack.push_int(&v1);
        Ok(())
    }

    /// Pop two numbers and push `f(second, top)` as a boolean.
    pub(crate) fn op_bool_binop(
        &mut self,
        op: u8,
        f: impl FnOnce(&ScriptNumber, &ScriptNumber) -> bool,
    ) -> Result<(), MachineError> {
        self.require_depth(op, 2)?;
        let v0 = self.dstack.pop_int()?;
        let v1 = self.dstack.pop_int()?;
        self.dstack.push_bool(f(&v1, &v0));
        Ok(())
    }

    pub(crate) fn op_numequalverify(&mut self, op: u8) -> Result<(), MachineError> {
        self.op_bool_binop(op, |a, b| a.equal(b))?;
        self.abstract_verify(op, MachineErrorCode::NumEqualVerify)
    }

    pub(crate) fn op_min(&mut self, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 2)?;
        let v0 = self.dstack.pop_int()?;
        let v1 = self.dstack.pop_int()?;
        self.dstack.push_int(if v1.less_than(&v0) { &v1 } else { &v0 });
        Ok(())
    }

    pub(crate) fn op_max(&mut self, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 2)?;
        let v0 = self.dstack.pop_int()?;
        let v1 = self.dstack.pop_int()?;
        self.dstack.push_int(if v1.greater_than(&v0) { &v1 } else { &v0 });
        Ok(())
    }

    /// `x min max -> (min <= x < max)`
    pub(crate) fn op_within(&mut self, op: u8) -> Result<(), MachineError> {
        self.require_depth(op, 3)?;
        let max_val = self.dstack.pop_int()?;
        let min_val = self.dstack.pop_int()?;
        let x = self.dstack.pop_int()?;
        self.dstack
            .push_bool(min_val.less_than_or_equal(&x) && x.less_than(&max_val));
        Ok(())
    }
}
