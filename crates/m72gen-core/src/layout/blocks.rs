// crates/m72gen-core/src/layout/blocks.rs
//
// Block synthesizers. Each builds the slot delta for one block as a plain
// Vec<Op>; the caller either appends it (commit) or only measures it
// (dry run), so the two can never disagree on size or content.
//
// The st/out interleave is the raster timing contract of the scan-line
// kernel: the three PIXOUT writes of a head, and their counterparts in the
// tail and common blocks, must land on these exact word positions.

use super::op::{Op, OpKind};

/// A head block is at most 11 words: 7 stores, 3 port writes, 1 tail jump.
pub const HEAD_MAX_WORDS: usize = 11;
/// A tail block is at most 10 words for a 7-pixel residual.
pub const TAIL_MAX_WORDS: usize = 10;
/// A common block is at most 38 words: 8-word prefix plus 30-word epilogue.
pub const COMMON_MAX_WORDS: usize = 38;

/// Store one pixel: color index c lives in register r{c+2}.
fn st_pixel(color: u8) -> String {
    format!("st    X+,      r{}", color + 2)
}

fn used(text: &str) -> Op {
    Op::new(OpKind::Used, Vec::new(), Some(text.to_string()))
}

fn used_store(color: u8) -> Op {
    Op::new(OpKind::Used, Vec::new(), Some(st_pixel(color)))
}

fn entry(kind: OpKind, pixels: Vec<u8>, text: String) -> Op {
    Op::new(kind, pixels, Some(text))
}

/// One no-op filler word for the gap ahead of a jump table.
pub fn filler() -> Op {
    Op::new(OpKind::Free, Vec::new(), Some("nop".to_string()))
}

/// Head block: emit pixels[0..split_at), then hand the rest to a TailJump.
/// `split_at` is 1..=8; the eighth pixel always travels with the jump, so
/// splits 7 and 8 produce the same block.
pub fn head_block(pixels: &[u8; 8], split_at: usize) -> Vec<Op> {
    debug_assert!((1..=8).contains(&split_at));
    let mut ops = Vec::new();
    let mut rest = pixels.to_vec();
    for emitted in 0..split_at.min(7) {
        let text = st_pixel(rest[0]);
        if emitted == 0 {
            ops.push(entry(OpKind::Head, pixels.to_vec(), text));
        } else {
            ops.push(Op::new(OpKind::Used, Vec::new(), Some(text)));
        }
        rest.remove(0);
        match emitted {
            0 => ops.push(used("out   PIXOUT,  r1")),
            3 => ops.push(used("out   PIXOUT,  r22")),
            6 => ops.push(used("out   PIXOUT,  r23")),
            _ => {}
        }
    }
    ops.push(Op::new(OpKind::TailJump, rest, None));
    debug_assert!(ops.len() <= HEAD_MAX_WORDS);
    ops
}

/// Tail block: emit a prefix of the residual, then hand the remaining
/// `8 - common_at` pixels to a CommonJump. Every position that starts the
/// emission of k pixels is a Tail entry point carrying that residual.
pub fn tail_block(pixels: &[u8], common_at: usize) -> Vec<Op> {
    debug_assert!(pixels.len() <= 7);
    let mut ops = Vec::new();
    let mut rest = pixels.to_vec();
    loop {
        match rest.len() {
            7 => {
                ops.push(entry(OpKind::Tail, rest.clone(), st_pixel(rest[0])));
                rest.remove(0);
            }
            6 => {
                if common_at <= 2 {
                    break;
                }
                ops.push(entry(OpKind::Tail, rest.clone(), st_pixel(rest[0])));
                rest.remove(0);
            }
            5 => {
                ops.push(entry(
                    OpKind::Tail,
                    rest.clone(),
                    "out   PIXOUT,  r22".to_string(),
                ));
                if common_at == 3 {
                    break;
                }
                ops.push(used_store(rest[0]));
                rest.remove(0);
            }
            4 => {
                if common_at == 4 {
                    break;
                }
                ops.push(entry(OpKind::Tail, rest.clone(), st_pixel(rest[0])));
                rest.remove(0);
            }
            3 => {
                if common_at == 5 {
                    break;
                }
                ops.push(entry(OpKind::Tail, rest.clone(), st_pixel(rest[0])));
                rest.remove(0);
            }
            2 => {
                ops.push(entry(
                    OpKind::Tail,
                    rest.clone(),
                    "out   PIXOUT,  r23".to_string(),
                ));
                if common_at == 6 {
                    break;
                }
                ops.push(used_store(rest[0]));
                rest.remove(0);
            }
            1 => {
                if common_at == 7 {
                    break;
                }
                ops.push(entry(OpKind::Tail, rest.clone(), st_pixel(rest[0])));
                rest.remove(0);
            }
            _ => break,
        }
    }
    ops.push(Op::new(OpKind::CommonJump, rest, None));
    debug_assert!(ops.len() <= TAIL_MAX_WORDS);
    ops
}

/// Common block: emit any residual prefix, then the shared epilogue. The
/// epilogue has the block's two exits: `breq` leaves the tile row (falling
/// into the `brts` frame-exit ladder), `ijmp` re-dispatches the next tile;
/// the `dec r20` word is the RowEntry the per-scan-line stubs jump to.
pub fn common_block(pixels: &[u8]) -> Vec<Op> {
    debug_assert!(pixels.len() <= 6);
    let mut ops = Vec::new();
    let mut rest = pixels.to_vec();
    loop {
        match rest.len() {
            6 => {
                ops.push(entry(
                    OpKind::Common,
                    rest.clone(),
                    "out   PIXOUT,  r22".to_string(),
                ));
                ops.push(used_store(rest[0]));
                rest.remove(0);
            }
            5 | 4 => {
                ops.push(entry(OpKind::Common, rest.clone(), st_pixel(rest[0])));
                rest.remove(0);
            }
            3 => {
                ops.push(entry(
                    OpKind::Common,
                    rest.clone(),
                    "out   PIXOUT,  r23".to_string(),
                ));
                ops.push(used_store(rest[0]));
                rest.remove(0);
            }
            2 | 1 => {
                ops.push(entry(OpKind::Common, rest.clone(), st_pixel(rest[0])));
                rest.remove(0);
            }
            _ => break,
        }
    }
    ops.push(entry(
        OpKind::Common,
        Vec::new(),
        "out   PIXOUT,  r0".to_string(),
    ));
    ops.push(used("breq  .+26             ; Uses Z flag"));
    ops.push(used("pop   r0"));
    ops.push(Op::new(
        OpKind::RowEntry,
        Vec::new(),
        Some("dec   r20".to_string()),
    ));
    ops.push(used("ld    ZL,      Y+"));
    ops.push(used("out   PIXOUT,  r0"));
    ops.push(used("pop   r0"));
    ops.push(used("pop   r21"));
    ops.push(used("pop   r1"));
    ops.push(used("out   PIXOUT,  r0"));
    ops.push(used("pop   r22"));
    ops.push(used("pop   r23"));
    ops.push(used("pop   r0"));
    ops.push(used("out   PIXOUT,  r21"));
    ops.push(used("ijmp"));
    // The BREQ above enters here, exiting from the tile row
    ops.push(used("brts  .+14             ; (1582 / 1621)"));
    ops.push(used("mov   r22,     r17"));
    ops.push(used("mov   r23,     r17"));
    ops.push(used("movw  r0,      r22"));
    ops.push(used("out   PIXOUT,  r17"));
    ops.push(used("ld    ZL,      Y+"));
    ops.push(used("set"));
    ops.push(used("ijmp"));
    // The BRTS above enters here, exiting from the frame
    ops.push(used("sbic  GPR0,    1       ; (1622) Color 0 (bg) loading enabled?"));
    ops.push(used("in    r2,      GPR1    ; (1623) If so, load it"));
    ops.push(used("sbic  GPR0,    2       ; (1624) Color 15 (border) loading enabled?"));
    ops.push(used("in    r17,     GPR1    ; (1625) If so, load it"));
    ops.push(used("ldi   ZL,      LB_SPR - 1 ; (1626) 254(HI):255(LO): Sprite conf"));
    ops.push(used("out   STACKL,  ZL      ; (1627)"));
    ops.push(used("ret                    ; (1631)"));
    debug_assert!(ops.len() <= COMMON_MAX_WORDS);
    ops
}
