//! Per-opcode execution: limits, conditional skipping and dispatch.

use log::trace;

use crate::chunk::ScriptChunk;
use crate::opcodes::*;
use crate::Script;

use super::error::{MachineError, MachineErrorCode};
use super::ops_crypto::HashType;
use super::scriptnum::ScriptNumber;
use super::ScriptMachine;

fn is_conditional(op: u8) -> bool {
    matches!(op, OP_IF | OP_NOTIF | OP_ELSE | OP_ENDIF)
}

impl<'a> ScriptMachine<'a> {
    /// Return true if every enclosing conditional branch is taken.
    pub(crate) fn is_branch_executing(&self) -> bool {
        self.cond_stack.iter().all(|&taken| taken)
    }

    /// Fail unless the main stack holds at least `n` items.
    pub(crate) fn require_depth(&self, op: u8, n: usize) -> Result<(), MachineError> {
        if self.dstack.depth() < n {
            return Err(MachineError::new(
                MachineErrorCode::InvalidStackOperation,
                format!(
                    "{} requires {} item{}",
                    opcode_to_string(op),
                    n,
                    if n == 1 { "" } else { "s" }
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn execute_opcode(
        &mut self,
        script: &Script,
        chunk: &ScriptChunk,
        data: Option<&[u8]>,
    ) -> Result<(), MachineError> {
        let op = chunk.op();

        if chunk.data_len() > self.config().max_element_size() {
            return Err(MachineError::new(
                MachineErrorCode::ElementTooBig,
                format!(
                    "element size {} exceeds max allowed size {}",
                    chunk.data_len(),
                    self.config().max_element_size()
                ),
            ));
        }

        if is_disabled(op) {
            return Err(MachineError::new(
                MachineErrorCode::DisabledOpcode,
                format!("attempt to execute disabled opcode {}", opcode_to_string(op)),
            ));
        }

        if op > OP_16 {
            self.op_count += 1;
            if self.op_count > self.config().max_ops() {
                return Err(MachineError::new(
                    MachineErrorCode::TooManyOperations,
                    format!("exceeded max operation limit of {}", self.config().max_ops()),
                ));
            }
        }

        // OP_VERIF and OP_VERNOTIF sit in the conditional range and fail even unexecuted.
        if op == OP_VERIF || op == OP_VERNOTIF {
            return self.op_reserved(op);
        }

        if !self.is_branch_executing() && !is_conditional(op) {
            trace!("skip {} {}", self.op_index, opcode_to_string(op));
            return Ok(());
        }

        trace!("exec {} {} depth={}", self.op_index, opcode_to_string(op), self.dstack.depth());

        if let Some(payload) = data {
            self.dstack.push_byte_array(payload.to_vec());
            return Ok(());
        }

        self.dispatch_opcode(script, op)
    }

    fn dispatch_opcode(&mut self, script: &Script, op: u8) -> Result<(), MachineError> {
        match op {
            OP_1NEGATE => {
                self.dstack.push_int(&ScriptNumber::new(-1));
                Ok(())
            }
            OP_1..=OP_16 => {
                self.dstack.push_byte_array(vec![op - (OP_1 - 1)]);
                Ok(())
            }
            OP_NOP | OP_NOP1..=OP_NOP10 => Ok(()),
            OP_RESERVED | OP_VER | OP_RESERVED1 | OP_RESERVED2 => self.op_reserved(op),

            // Flow control
            OP_IF => self.op_if(op, false),
            OP_NOTIF => self.op_if(op, true),
            OP_ELSE => self.op_else(op),
            OP_ENDIF => self.op_endif(op),
            OP_VERIFY => self.op_verify(op),
            OP_RETURN => self.op_return(),

            // Stack ops
            OP_TOALTSTACK => self.op_to_alt_stack(op),
            OP_FROMALTSTACK => self.op_from_alt_stack(op),
            OP_2DROP => self.op_shuffle(op, 2, |s| s.drop_n(2)),
            OP_2DUP => self.op_shuffle(op, 2, |s| s.dup_n(2)),
            OP_3DUP => self.op_shuffle(op, 3, |s| s.dup_n(3)),
            OP_2OVER => self.op_shuffle(op, 4, |s| s.over_n(2)),
            OP_2ROT => self.op_shuffle(op, 6, |s| s.rot_n(2)),
            OP_2SWAP => self.op_shuffle(op, 4, |s| s.swap_n(2)),
            OP_IFDUP => self.op_ifdup(op),
            OP_DEPTH => {
                let d = self.dstack.depth() as i64;
                self.dstack.push_int(&ScriptNumber::new(d));
                Ok(())
            }
            OP_DROP => self.op_shuffle(op, 1, |s| s.drop_n(1)),
            OP_DUP => self.op_shuffle(op, 1, |s| s.dup_n(1)),
            OP_NIP => self.op_shuffle(op, 2, |s| s.nip_n_discard(1)),
            OP_OVER => self.op_shuffle(op, 2, |s| s.over_n(1)),
            OP_PICK => self.op_pick(op),
            OP_ROLL => self.op_roll(op),
            OP_ROT => self.op_shuffle(op, 3, |s| s.rot_n(1)),
            OP_SWAP => self.op_shuffle(op, 2, |s| s.swap_n(1)),
            OP_TUCK => self.op_shuffle(op, 2, |s| s.tuck()),

            // Splice and bitwise logic
            OP_SIZE => self.op_size(op),
            OP_EQUAL => self.op_equal(op),
            OP_EQUALVERIFY => self.op_equalverify(op),

            // Arithmetic
            OP_1ADD => self.op_unary_int(op, |m| {
                m.incr();
            }),
            OP_1SUB => self.op_unary_int(op, |m| {
                m.decr();
            }),
            OP_NEGATE => self.op_unary_int(op, |m| {
                m.neg();
            }),
            OP_ABS => self.op_unary_int(op, |m| {
                m.abs();
            }),
            OP_NOT => self.op_not(op),
            OP_0NOTEQUAL => self.op_0notequal(op),
            OP_ADD => self.op_add(op),
            OP_SUB => self.op_sub(op),
            OP_BOOLAND => self.op_bool_binop(op, |a, b| !a.is_zero() && !b.is_zero()),
            OP_BOOLOR => self.op_bool_binop(op, |a, b| !a.is_zero() || !b.is_zero()),
            OP_NUMEQUAL => self.op_bool_binop(op, |a, b| a.equal(b)),
            OP_NUMEQUALVERIFY => self.op_numequalverify(op),
            OP_NUMNOTEQUAL => self.op_bool_binop(op, |a, b| !a.equal(b)),
            OP_LESSTHAN => self.op_bool_binop(op, |a, b| a.less_than(b)),
            OP_GREATERTHAN => self.op_bool_binop(op, |a, b| a.greater_than(b)),
            OP_LESSTHANOREQUAL => self.op_bool_binop(op, |a, b| a.less_than_or_equal(b)),
            OP_GREATERTHANOREQUAL => self.op_bool_binop(op, |a, b| a.greater_than_or_equal(b)),
            OP_MIN => self.op_min(op),
            OP_MAX => self.op_max(op),
            OP_WITHIN => self.op_within(op),

            // Crypto
            OP_RIPEMD160 => self.op_hash(op, HashType::Ripemd160),
            OP_SHA1 => self.op_hash(op, HashType::Sha1),
            OP_SHA256 => self.op_hash(op, HashType::Sha256),
            OP_HASH160 => self.op_hash(op, HashType::Hash160),
            OP_HASH256 => self.op_hash(op, HashType::Hash256),
            OP_CODESEPARATOR => {
                self.last_code_separator = Some(self.op_index);
                Ok(())
            }
            OP_CHECKSIG => self.op_checksig(script, op),
            OP_CHECKSIGVERIFY => self.op_checksigverify(script, op),
            OP_CHECKMULTISIG => self.op_checkmultisig(script, op),
            OP_CHECKMULTISIGVERIFY => self.op_checkmultisigverify(script, op),

            _ => Err(MachineError::new(
                MachineErrorCode::ReservedOpcode,
                format!("attempt to execute invalid opcode {}", opcode_to_string(op)),
            )),
        }
    }
}
