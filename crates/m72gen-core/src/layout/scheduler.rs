// crates/m72gen-core/src/layout/scheduler.rs
//
// Drives one whole compilation: eight scan-line passes interleaving pending
// jump drains, jump-table placement at 256-word boundaries, speculative
// head pre-placement into the gap, and per-tile head resolution. A pass
// that would need an out-of-range jump abandons the attempt; the driver
// retries with a tighter margin until a layout satisfies every jump.

use super::blocks;
use super::matcher::{self, Placement};
use super::op::{Op, OpKind};
use super::stream::Stream;
use super::Unsatisfiable;
use crate::error::{M72Error, Result};
use crate::tiles::{TileSet, TILE_COUNT, TILE_DIM};

/// Words per jump table: one entry per possible tile index byte.
pub const JUMP_TABLE_WORDS: usize = 256;

/// Window and margin knobs. The defaults mirror the hardware headroom the
/// generator was tuned for; only the displacement window itself is law.
#[derive(Clone, Debug)]
pub struct Tuning {
    /// Backward scan window for block reuse, in words.
    pub match_window: usize,
    /// Starting value for the largest unresolved-jump distance tolerated
    /// before draining; tightened on every failed attempt.
    pub start_margin: usize,
    /// Margin decrease between attempts.
    pub margin_step: usize,
    /// Longest content the common-block suffix vote may grow to.
    pub common_vote_cap: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            match_window: 2048,
            start_margin: 2040,
            margin_step: 10,
            common_vote_cap: 4,
        }
    }
}

/// Diagnostics of a successful compilation. For reporting only; the stream
/// itself is the authoritative output.
#[derive(Clone, Debug)]
pub struct CompileReport {
    pub attempts: u32,
    /// The margin the successful attempt ran with.
    pub margin: usize,
    pub words: usize,
    pub table_addresses: [usize; TILE_DIM],
}

/// A sealed, fully resolved instruction stream plus its diagnostics.
pub struct Compiled {
    pub stream: Stream,
    pub report: CompileReport,
}

/// Compile a tileset, retrying with a strictly decreasing margin until an
/// attempt keeps every jump inside the displacement window. Each attempt
/// starts from a fresh stream; failed attempts leave nothing behind.
pub fn compile(tiles: &TileSet, tuning: &Tuning) -> Result<Compiled> {
    if tuning.margin_step == 0 {
        return Err(M72Error::Validation("layout: margin step must be > 0".into()));
    }
    let mut margin = tuning.start_margin;
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match compile_attempt(tiles, margin, tuning) {
            Ok((stream, table_addresses)) => {
                let words = stream.len();
                return Ok(Compiled {
                    stream,
                    report: CompileReport {
                        attempts,
                        margin,
                        words,
                        table_addresses,
                    },
                });
            }
            Err(reason) => {
                if margin <= tuning.margin_step {
                    return Err(M72Error::Layout(format!(
                        "no satisfiable layout down to margin {margin}: {reason}"
                    )));
                }
                margin -= tuning.margin_step;
            }
        }
    }
}

fn compile_attempt(
    tiles: &TileSet,
    margin: usize,
    tuning: &Tuning,
) -> std::result::Result<(Stream, [usize; TILE_DIM]), Unsatisfiable> {
    let mut stream = Stream::new();
    let mut first = 0usize;
    let mut tables = [0usize; TILE_DIM];

    for line in 0..TILE_DIM {
        // Drain pending jumps left over from earlier scan-lines before they
        // drift out of reach of freshly appended blocks.
        while first + margin < stream.len() {
            first = resolve_next_jump(&mut stream, first, None, tuning)?;
        }

        // The table goes to the next 256-word boundary. Resolve pending
        // jumps into the gap below it; when nothing more fits and the
        // oldest pending jump could not wait past the next table, push the
        // boundary out to make room for its blocks first.
        let mut table = stream.len().next_multiple_of(JUMP_TABLE_WORDS);
        while first < stream.len() {
            let next = resolve_next_jump(&mut stream, first, Some(table), tuning)?;
            if next == first {
                if first + margin < table + JUMP_TABLE_WORDS {
                    table += JUMP_TABLE_WORDS;
                } else {
                    break;
                }
            }
            first = next;
        }

        // Heads this scan-line will want anyway fill the rest of the gap;
        // nop filler covers whatever they leave.
        prefill_heads(&mut stream, tiles, line, table, tuning)?;
        while stream.len() < table {
            stream.push(blocks::filler());
        }

        tables[line] = table;
        for tile in 0..TILE_COUNT {
            let pixels = tiles.row_of(tile, line).pixels().to_vec();
            stream.push(Op::new(OpKind::HeadJump, pixels, None));
        }
        stream.set_label(table, &format!("tilerow_{line}_map"));

        for tile in 0..TILE_COUNT {
            while first + margin < stream.len() {
                first = resolve_next_jump(&mut stream, first, None, tuning)?;
            }
            // A deep drain may already have caught up with this entry.
            let entry = table + tile;
            if stream.op(entry).is_pending_jump() {
                matcher::gen_head(&mut stream, entry, None, tuning)?;
            }
        }
    }

    while first < stream.len() {
        first = resolve_next_jump(&mut stream, first, None, tuning)?;
    }

    match (0..stream.len()).find(|&a| stream.op(a).kind == OpKind::RowEntry) {
        Some(address) => stream.set_label(address, "tilerow_entry"),
        None => return Err(Unsatisfiable::MissingRowEntry),
    }
    if let Some(address) = (0..stream.len()).find(|&a| !stream.op(a).is_resolved()) {
        return Err(Unsatisfiable::Unresolved { address });
    }

    Ok((stream, tables))
}

/// Resolve the next pending jump at or after `from` whose block fits below
/// `limit`, then return the new first-pending address. Jumps whose
/// candidate would cross the limit are skipped, not failed; returning the
/// same address as `first` signals that nothing could be placed.
fn resolve_next_jump(
    stream: &mut Stream,
    from: usize,
    limit: Option<usize>,
    tuning: &Tuning,
) -> std::result::Result<usize, Unsatisfiable> {
    let first_pending = stream.next_unresolved(from);
    let mut loc = first_pending;
    while loc < stream.len() {
        let placed = match stream.op(loc).kind {
            OpKind::HeadJump => matcher::gen_head(stream, loc, limit, tuning)?,
            OpKind::TailJump => matcher::gen_tail(stream, loc, limit, tuning)?,
            _ => matcher::gen_common(stream, loc, limit, tuning)?,
        };
        if placed == Placement::Resolved {
            break;
        }
        loc = stream.next_unresolved(loc + 1);
    }
    Ok(stream.next_unresolved(first_pending))
}

/// Pre-place head blocks for the upcoming scan-line's rows into the gap
/// below its jump table, stopping at the first candidate that would cross
/// the boundary.
fn prefill_heads(
    stream: &mut Stream,
    tiles: &TileSet,
    line: usize,
    table: usize,
    tuning: &Tuning,
) -> std::result::Result<(), Unsatisfiable> {
    let mut rows: Vec<u16> = Vec::new();
    for tile in 0..TILE_COUNT {
        let id = tiles.row_id_of(tile, line);
        if !rows.contains(&id) {
            rows.push(id);
        }
    }
    let peers: Vec<[u8; TILE_DIM]> = rows
        .iter()
        .map(|&id| *tiles.rows()[id as usize].pixels())
        .collect();

    for (i, pixels) in peers.iter().enumerate() {
        let others: Vec<[u8; TILE_DIM]> = peers
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, p)| *p)
            .collect();
        if matcher::gen_head_ahead(stream, pixels, &others, table, tuning)? == Placement::NoFit {
            break;
        }
    }
    Ok(())
}
