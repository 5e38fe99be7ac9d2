//! Script execution stack.

use super::config::MAX_SCRIPT_NUMBER_LENGTH;
use super::error::{MachineError, MachineErrorCode};
use super::scriptnum::ScriptNumber;

/// Convert byte array to boolean (Bitcoin consensus rules).
///
/// Empty and all-zero arrays are false, as is negative zero: all zero
/// bytes except a trailing 0x80.
pub fn as_bool(t: &[u8]) -> bool {
    for (i, &b) in t.iter().enumerate() {
        if b != 0 {
            return !(i == t.len() - 1 && b == 0x80);
        }
    }
    false
}

/// Convert boolean to byte array.
pub fn from_bool(v: bool) -> Vec<u8> {
    if v {
        vec![1]
    } else {
        vec![]
    }
}

/// The main or alt stack of a script machine. The last element is the top.
#[derive(Clone, Debug, Default)]
pub struct Stack {
    items: Vec<Vec<u8>>,
}

impl Stack {
    pub fn new() -> Self {
        Stack { items: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push_byte_array(&mut self, data: Vec<u8>) {
        self.items.push(data);
    }

    pub fn push_int(&mut self, n: &ScriptNumber) {
        self.push_byte_array(n.to_bytes());
    }

    pub fn push_bool(&mut self, val: bool) {
        self.push_byte_array(from_bool(val));
    }

    pub fn pop_byte_array(&mut self) -> Result<Vec<u8>, MachineError> {
        self.nip_n(0)
    }

    /// Pop a minimally encoded number of at most four bytes.
    pub fn pop_int(&mut self) -> Result<ScriptNumber, MachineError> {
        let data = self.pop_byte_array()?;
        ScriptNumber::from_bytes(&data, MAX_SCRIPT_NUMBER_LENGTH, true)
    }

    pub fn pop_bool(&mut self) -> Result<bool, MachineError> {
        let data = self.pop_byte_array()?;
        Ok(as_bool(&data))
    }

    /// Borrow the element `idx` positions below the top.
    pub fn peek_byte_array(&self, idx: usize) -> Result<&[u8], MachineError> {
        let sz = self.items.len();
        if idx >= sz {
            return Err(invalid_index(idx, sz));
        }
        Ok(&self.items[sz - idx - 1])
    }

    pub fn peek_bool(&self, idx: usize) -> Result<bool, MachineError> {
        Ok(as_bool(self.peek_byte_array(idx)?))
    }

    /// Remove and return the element `idx` positions below the top.
    pub fn nip_n(&mut self, idx: usize) -> Result<Vec<u8>, MachineError> {
        let sz = self.items.len();
        if idx >= sz {
            return Err(invalid_index(idx, sz));
        }
        Ok(self.items.remove(sz - idx - 1))
    }

    pub fn nip_n_discard(&mut self, idx: usize) -> Result<(), MachineError> {
        self.nip_n(idx)?;
        Ok(())
    }

    /// `x1 x2 -> x2 x1 x2`
    pub fn tuck(&mut self) -> Result<(), MachineError> {
        let so2 = self.pop_byte_array()?;
        let so1 = self.pop_byte_array()?;
        self.push_byte_array(so2.clone());
        self.push_byte_array(so1);
        self.push_byte_array(so2);
        Ok(())
    }

    pub fn drop_n(&mut self, n: usize) -> Result<(), MachineError> {
        for _ in 0..n {
            self.pop_byte_array()?;
        }
        Ok(())
    }

    /// Duplicate the top `n` items in order.
    pub fn dup_n(&mut self, n: usize) -> Result<(), MachineError> {
        for _ in 0..n {
            let so = self.peek_byte_array(n - 1)?.to_vec();
            self.push_byte_array(so);
        }
        Ok(())
    }

    /// Move the third group of `n` items to the top.
    pub fn rot_n(&mut self, n: usize) -> Result<(), MachineError> {
        let entry = 3 * n - 1;
        for _ in 0..n {
            let so = self.nip_n(entry)?;
            self.push_byte_array(so);
        }
        Ok(())
    }

    /// Swap the top two groups of `n` items.
    pub fn swap_n(&mut self, n: usize) -> Result<(), MachineError> {
        let entry = 2 * n - 1;
        for _ in 0..n {
            let so = self.nip_n(entry)?;
            self.push_byte_array(so);
        }
        Ok(())
    }

    /// Copy the second group of `n` items to the top.
    pub fn over_n(&mut self, n: usize) -> Result<(), MachineError> {
        let entry = 2 * n - 1;
        for _ in 0..n {
            let so = self.peek_byte_array(entry)?.to_vec();
            self.push_byte_array(so);
        }
        Ok(())
    }

    pub fn pick_n(&mut self, n: usize) -> Result<(), MachineError> {
        let so = self.peek_byte_array(n)?.to_vec();
        self.push_byte_array(so);
        Ok(())
    }

    pub fn roll_n(&mut self, n: usize) -> Result<(), MachineError> {
        let so = self.nip_n(n)?;
        self.push_byte_array(so);
        Ok(())
    }

    /// Stack contents, bottom to top.
    pub fn items(&self) -> &[Vec<u8>] {
        &self.items
    }

    /// Replace the contents (last = top).
    pub fn set_items(&mut self, data: Vec<Vec<u8>>) {
        self.items = data;
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

fn invalid_index(idx: usize, sz: usize) -> MachineError {
    MachineError::new(
        MachineErrorCode::InvalidStackOperation,
        format!("index {} is invalid for stack size {}", idx, sz),
    )
}
