// crates/m72gen-core/src/layout/matcher.rs
//
// Sharing heuristics: given a pending jump, find an existing block to reuse
// or merge with by common suffix, or synthesize new block content. All
// synthesis paths dry-run their delta against an optional end-of-gap limit
// and report NoFit instead of appending past it.

use super::blocks::{self, HEAD_MAX_WORDS, TAIL_MAX_WORDS};
use super::op::OpKind;
use super::scheduler::Tuning;
use super::stream::Stream;
use super::Unsatisfiable;

/// Outcome of trying to resolve one pending jump within a size limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Resolved,
    NoFit,
}

/// Length of the longest common trailing run of the two pixel sequences.
/// Every sharing decision in the generator reduces to this metric.
pub fn count_matching_suffix(a: &[u8], b: &[u8]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// First stream address whose slot a jump at `address` can still reach
/// backwards.
fn window_start(address: usize, window: usize) -> usize {
    (address + 1).saturating_sub(window)
}

/// Resolve a HeadJump: reuse a full-match head if one is in range, else
/// synthesize a head split at the largest suffix shared with pending jumps
/// ahead, wiring its tail jump straight into an existing tail when one
/// matches the split exactly.
pub fn gen_head(
    stream: &mut Stream,
    jump: usize,
    limit: Option<usize>,
    tuning: &Tuning,
) -> Result<Placement, Unsatisfiable> {
    let jump_pixels = stream.op(jump).pixels.clone();

    // A head with identical content resolves the jump with no new code.
    for address in window_start(jump, tuning.match_window)..stream.len() {
        let op = stream.op(address);
        if op.kind == OpKind::Head && count_matching_suffix(&op.pixels, &jump_pixels) == 8 {
            stream.label_jump_target(address);
            stream.resolve_jump(jump, address)?;
            return Ok(Placement::Resolved);
        }
    }

    // Pending tail jumps ahead show which tails will exist eventually.
    let mut best = 0usize;
    for address in jump + 1..stream.len() {
        let op = stream.op(address);
        if op.kind == OpKind::TailJump && !op.is_resolved() {
            let matched = count_matching_suffix(&op.pixels, &jump_pixels);
            if matched >= best {
                best = matched;
            }
        }
    }
    // Other pending head jumps are future heads; full matches are ignored
    // since this call generates the block those will reuse.
    for address in jump + 1..stream.len() {
        let op = stream.op(address);
        if op.kind == OpKind::HeadJump && !op.is_resolved() {
            let matched = count_matching_suffix(&op.pixels, &jump_pixels);
            if matched < 8 && matched >= best {
                best = matched;
            }
        }
    }
    // An existing tail already covering the whole split wins outright.
    let mut tail_target: Option<usize> = None;
    let tail_scan = stream
        .len()
        .saturating_sub(tuning.match_window.saturating_sub(HEAD_MAX_WORDS));
    for address in tail_scan..stream.len() {
        let op = stream.op(address);
        if op.kind == OpKind::Tail {
            let matched = count_matching_suffix(&op.pixels, &jump_pixels);
            if matched >= best && matched == op.pixels.len() {
                best = matched;
                tail_target = Some(address);
            }
        }
    }

    let mut pixels = [0u8; 8];
    pixels.copy_from_slice(&jump_pixels);
    let delta = blocks::head_block(&pixels, 8 - best);
    if let Some(limit) = limit {
        if stream.len() + delta.len() > limit {
            return Ok(Placement::NoFit);
        }
    }
    let head = stream.append(delta);
    if let Some(tail) = tail_target {
        let tail_jump = stream.len() - 1;
        stream.label_jump_target(tail);
        stream.resolve_jump(tail_jump, tail)?;
    }
    stream.label_jump_target(head);
    stream.resolve_jump(jump, head)?;
    Ok(Placement::Resolved)
}

/// Speculatively place a head for `pixels` into the gap below an upcoming
/// jump table at `table`, with no jump linked yet; the table's entries find
/// it later through the ordinary backward scan. `peers` are the other rows
/// of the same scan-line (its future head jumps) and take part in the split
/// choice exactly as pending jumps do. NoFit means the gap is exhausted.
pub fn gen_head_ahead(
    stream: &mut Stream,
    pixels: &[u8; 8],
    peers: &[[u8; 8]],
    table: usize,
    tuning: &Tuning,
) -> Result<Placement, Unsatisfiable> {
    // Reachable even from the table's last entry?
    let worst_entry = table + crate::tiles::TILE_COUNT - 1;
    for address in window_start(worst_entry, tuning.match_window)..stream.len() {
        let op = stream.op(address);
        if op.kind == OpKind::Head && count_matching_suffix(&op.pixels, pixels) == 8 {
            return Ok(Placement::Resolved);
        }
    }

    let mut best = 0usize;
    for address in stream.len().saturating_sub(tuning.match_window)..stream.len() {
        let op = stream.op(address);
        if !op.is_pending_jump() {
            continue;
        }
        let matched = count_matching_suffix(&op.pixels, pixels);
        if matched < 8 && matched >= best {
            best = matched;
        }
    }
    for peer in peers {
        let matched = count_matching_suffix(peer, pixels);
        if matched < 8 && matched >= best {
            best = matched;
        }
    }
    let mut tail_target: Option<usize> = None;
    let tail_scan = stream
        .len()
        .saturating_sub(tuning.match_window.saturating_sub(HEAD_MAX_WORDS));
    for address in tail_scan..stream.len() {
        let op = stream.op(address);
        if op.kind == OpKind::Tail {
            let matched = count_matching_suffix(&op.pixels, pixels);
            if matched >= best && matched == op.pixels.len() {
                best = matched;
                tail_target = Some(address);
            }
        }
    }

    let delta = blocks::head_block(pixels, 8 - best);
    if stream.len() + delta.len() > table {
        return Ok(Placement::NoFit);
    }
    stream.append(delta);
    if let Some(tail) = tail_target {
        let tail_jump = stream.len() - 1;
        stream.label_jump_target(tail);
        stream.resolve_jump(tail_jump, tail)?;
    }
    Ok(Placement::Resolved)
}

/// Suggest the pixel content a new common block should carry: the longest
/// residual any pending CommonJump already demands, grown leftwards while a
/// majority of distinct pending tail-jump suffixes agree on the next pixel.
pub fn suggest_common_pixels(stream: &mut Stream, tuning: &Tuning) -> Vec<u8> {
    let start = stream.len().saturating_sub(tuning.match_window);

    let mut common: Vec<u8> = Vec::new();
    for address in start..stream.len() {
        let op = stream.op(address);
        if op.kind == OpKind::CommonJump && !op.is_resolved() && op.pixels.len() > common.len() {
            common = op.pixels.clone();
        }
    }

    let pending: Vec<usize> = (start..stream.len())
        .filter(|&a| {
            let op = stream.op(a);
            op.kind == OpKind::TailJump && !op.is_resolved()
        })
        .collect();

    // Each distinct suffix votes once: a jump whose residual is a proper
    // suffix of another pending jump's residual (or a duplicate of an
    // earlier one) is marked shared and sits the vote out.
    for &a in &pending {
        stream.set_shared(a, false);
    }
    for (i, &a) in pending.iter().enumerate() {
        for (j, &b) in pending.iter().enumerate() {
            if i == j {
                continue;
            }
            let matched = count_matching_suffix(&stream.op(a).pixels, &stream.op(b).pixels);
            let (len_a, len_b) = (stream.op(a).pixels.len(), stream.op(b).pixels.len());
            if matched == len_a && (len_a < len_b || (len_a == len_b && j < i)) {
                stream.set_shared(a, true);
                break;
            }
        }
    }

    while common.len() < tuning.common_vote_cap {
        let mut buckets = [0usize; 16];
        for &a in &pending {
            let op = stream.op(a);
            if op.shared {
                continue;
            }
            if op.pixels.len() > common.len()
                && count_matching_suffix(&common, &op.pixels) >= common.len()
            {
                let next = op.pixels[op.pixels.len() - 1 - common.len()];
                buckets[next as usize] += 1;
            }
        }
        let mut top = 0usize;
        for color in 1..16 {
            if buckets[color] > buckets[top] {
                top = color;
            }
        }
        if buckets[top] <= 1 {
            break;
        }
        common.insert(0, top as u8);
    }
    common
}

/// Resolve a TailJump: reuse a tail entry of identical residual, else join
/// an existing common block (worst case at its zero-pixel entry), else
/// synthesize a tail split against the suggested common content.
pub fn gen_tail(
    stream: &mut Stream,
    jump: usize,
    limit: Option<usize>,
    tuning: &Tuning,
) -> Result<Placement, Unsatisfiable> {
    let jump_pixels = stream.op(jump).pixels.clone();

    for address in window_start(jump, tuning.match_window)..stream.len() {
        let op = stream.op(address);
        if op.kind == OpKind::Tail
            && op.pixels.len() == jump_pixels.len()
            && count_matching_suffix(&op.pixels, &jump_pixels) == op.pixels.len()
        {
            stream.label_jump_target(address);
            stream.resolve_jump(jump, address)?;
            return Ok(Placement::Resolved);
        }
    }

    let common_scan = stream
        .len()
        .saturating_sub(tuning.match_window.saturating_sub(TAIL_MAX_WORDS));
    for address in common_scan..stream.len() {
        let op = stream.op(address);
        if op.kind != OpKind::Common {
            continue;
        }
        let matched = count_matching_suffix(&op.pixels, &jump_pixels);
        if matched == op.pixels.len() {
            let delta = blocks::tail_block(&jump_pixels, 8 - matched);
            if let Some(limit) = limit {
                if stream.len() + delta.len() > limit {
                    return Ok(Placement::NoFit);
                }
            }
            let tail = stream.append(delta);
            let common_jump = stream.len() - 1;
            stream.label_jump_target(address);
            stream.resolve_jump(common_jump, address)?;
            stream.label_jump_target(tail);
            stream.resolve_jump(jump, tail)?;
            return Ok(Placement::Resolved);
        }
    }

    let suggestion = suggest_common_pixels(stream, tuning);
    let matched = count_matching_suffix(&suggestion, &jump_pixels);
    let delta = blocks::tail_block(&jump_pixels, 8 - matched);
    if let Some(limit) = limit {
        if stream.len() + delta.len() > limit {
            return Ok(Placement::NoFit);
        }
    }
    let tail = stream.append(delta);
    stream.label_jump_target(tail);
    stream.resolve_jump(jump, tail)?;
    Ok(Placement::Resolved)
}

/// Resolve a CommonJump: reuse a common entry of identical residual, else
/// synthesize a block from the suggested content and join at the matching
/// entry point. Should the suggestion not contain this jump's residual as a
/// suffix, a dedicated block is built from the residual itself so the
/// attempt can always finish resolving.
pub fn gen_common(
    stream: &mut Stream,
    jump: usize,
    limit: Option<usize>,
    tuning: &Tuning,
) -> Result<Placement, Unsatisfiable> {
    let jump_pixels = stream.op(jump).pixels.clone();

    for address in window_start(jump, tuning.match_window)..stream.len() {
        let op = stream.op(address);
        if op.kind == OpKind::Common
            && op.pixels.len() == jump_pixels.len()
            && count_matching_suffix(&op.pixels, &jump_pixels) == op.pixels.len()
        {
            stream.label_jump_target(address);
            stream.resolve_jump(jump, address)?;
            return Ok(Placement::Resolved);
        }
    }

    let mut content = suggest_common_pixels(stream, tuning);
    if count_matching_suffix(&content, &jump_pixels) < jump_pixels.len() {
        content = jump_pixels.clone();
    }
    let delta = blocks::common_block(&content);
    if let Some(limit) = limit {
        if stream.len() + delta.len() > limit {
            return Ok(Placement::NoFit);
        }
    }
    let entry_offset = delta.iter().position(|op| {
        op.kind == OpKind::Common
            && op.pixels.len() == jump_pixels.len()
            && count_matching_suffix(&op.pixels, &jump_pixels) == op.pixels.len()
    });
    let base = stream.append(delta);
    match entry_offset {
        Some(offset) => {
            let entry = base + offset;
            stream.label_jump_target(entry);
            stream.resolve_jump(jump, entry)?;
            Ok(Placement::Resolved)
        }
        None => Err(Unsatisfiable::NoCommonEntry { jump }),
    }
}
