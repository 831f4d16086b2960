// crates/m72gen-core/src/layout/stream.rs

use super::op::{jump_label, Op};
use super::Unsatisfiable;

/// AVR `rjmp` displacement window in words, relative to the incremented
/// program counter: target - (jump + 1) must fit in a signed 12-bit field.
pub const RJMP_DISP_MIN: i64 = -2048;
pub const RJMP_DISP_MAX: i64 = 2047;

/// The append-only instruction stream. A slot's position is its word
/// address and therefore its jump-target identity; slots are never removed,
/// reordered, or retyped.
#[derive(Default)]
pub struct Stream {
    ops: Vec<Op>,
}

impl Stream {
    pub fn new() -> Self {
        Stream::default()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn op(&self, address: usize) -> &Op {
        &self.ops[address]
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Append one slot, returning its address.
    pub(crate) fn push(&mut self, op: Op) -> usize {
        self.ops.push(op);
        self.ops.len() - 1
    }

    /// Append a synthesized block delta, returning the first slot's address.
    pub(crate) fn append(&mut self, delta: Vec<Op>) -> usize {
        let base = self.ops.len();
        self.ops.extend(delta);
        base
    }

    /// Address of the first pending jump at or after `from`; `len()` if none.
    pub fn next_unresolved(&self, from: usize) -> usize {
        let mut loc = from;
        while loc < self.ops.len() {
            if self.ops[loc].is_pending_jump() {
                return loc;
            }
            loc += 1;
        }
        self.ops.len()
    }

    /// Give a jump target its address-derived label (idempotent; never
    /// overwrites a named label such as a jump-table origin).
    pub(crate) fn label_jump_target(&mut self, address: usize) {
        let op = &mut self.ops[address];
        if op.label.is_none() {
            op.label = Some(jump_label(address));
        }
    }

    pub(crate) fn set_label(&mut self, address: usize, name: &str) {
        self.ops[address].label = Some(name.to_string());
    }

    pub(crate) fn set_shared(&mut self, address: usize, shared: bool) {
        self.ops[address].shared = shared;
    }

    /// Resolve a pending jump to `target`, enforcing the hardware
    /// displacement window. An out-of-range target aborts the attempt.
    pub(crate) fn resolve_jump(&mut self, address: usize, target: usize) -> Result<(), Unsatisfiable> {
        let disp = target as i64 - (address as i64 + 1);
        if !(RJMP_DISP_MIN..=RJMP_DISP_MAX).contains(&disp) {
            return Err(Unsatisfiable::JumpOutOfRange {
                jump: address,
                target,
            });
        }
        let op = &mut self.ops[address];
        debug_assert!(op.is_pending_jump(), "resolving a non-pending slot");
        op.text = Some(format!("rjmp  {}", jump_label(target)));
        Ok(())
    }
}
