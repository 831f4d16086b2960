// crates/m72gen-core/src/layout/mod.rs

pub(crate) mod blocks;
pub(crate) mod matcher;
pub mod op;
pub mod scheduler;
pub mod stream;

pub use op::{Op, OpKind};
pub use scheduler::{compile, CompileReport, Compiled, Tuning};
pub use stream::Stream;

use std::fmt;

/// Why a single compilation attempt had to be abandoned. The retry driver
/// reruns the whole layout with a tighter margin; there is no per-item
/// recovery and no partial output.
#[derive(Debug)]
pub(crate) enum Unsatisfiable {
    /// A resolved jump would need a displacement beyond the hardware window.
    JumpOutOfRange { jump: usize, target: usize },
    /// A freshly synthesized common block offered no entry point matching
    /// the jump it was built for.
    NoCommonEntry { jump: usize },
    /// The sealed stream still held a pending slot.
    Unresolved { address: usize },
    /// No common block (and so no row-loop entry word) was ever emitted.
    MissingRowEntry,
}

impl fmt::Display for Unsatisfiable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsatisfiable::JumpOutOfRange { jump, target } => {
                write!(f, "jump at word {jump} cannot reach word {target}")
            }
            Unsatisfiable::NoCommonEntry { jump } => {
                write!(f, "no common entry point for jump at word {jump}")
            }
            Unsatisfiable::Unresolved { address } => {
                write!(f, "slot {address} left unresolved")
            }
            Unsatisfiable::MissingRowEntry => write!(f, "no row entry word emitted"),
        }
    }
}
