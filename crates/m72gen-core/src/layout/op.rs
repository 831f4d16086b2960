// crates/m72gen-core/src/layout/op.rs

/// What a stream slot is. Every slot is one output instruction word; the
/// kind never changes after the slot is appended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    /// No-op filler padding the gap ahead of a jump table.
    Free,
    /// Interior block word that is not a jump entry point.
    Used,
    /// Jump-table entry; always carries the full 8-pixel row.
    HeadJump,
    /// First word of a head block; carries the full 8-pixel row for matching.
    Head,
    /// Trailing jump of a head block; carries the 0..8 pixels still owed.
    TailJump,
    /// Tail entry point; carries the residual pixels emitted from here on.
    Tail,
    /// Trailing jump of a tail block; carries the 0..7 pixels still owed.
    CommonJump,
    /// Common entry point; residual pixels, then the shared epilogue.
    Common,
    /// The `dec r20` epilogue word the per-scan-line stubs re-enter through.
    RowEntry,
}

/// One stream slot. `text` is `None` until the slot is resolved; jumps are
/// the only slots created unresolved, and resolution happens exactly once.
#[derive(Clone, Debug)]
pub struct Op {
    pub kind: OpKind,
    pub pixels: Vec<u8>,
    pub text: Option<String>,
    pub label: Option<String>,
    /// Marks a pending jump whose suffix another pending jump subsumes, so
    /// common-suffix voting counts each distinct suffix once.
    pub shared: bool,
}

impl Op {
    pub fn new(kind: OpKind, pixels: Vec<u8>, text: Option<String>) -> Self {
        Op {
            kind,
            pixels,
            text,
            label: None,
            shared: false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.text.is_some()
    }

    pub fn is_pending_jump(&self) -> bool {
        matches!(
            self.kind,
            OpKind::HeadJump | OpKind::TailJump | OpKind::CommonJump
        ) && self.text.is_none()
    }
}

/// Jump-target labels are derived from the target's word address.
pub fn jump_label(address: usize) -> String {
    format!("bg_jump_{address}")
}
