// crates/m72gen-core/src/asm.rs
//
// Renders a sealed instruction stream to the assembly file the scan-line
// kernel links against. Purely textual: every slot already carries its
// instruction, this module only adds the fixed surroundings.

use crate::error::{M72Error, Result};
use crate::layout::Compiled;

/// Pack an RGB triplet into the Uzebox BBGGGRRR palette byte.
pub fn uzebox_color(rgb: [u8; 3]) -> u8 {
    (rgb[0] / 32) + (rgb[1] / 32) * 8 + (rgb[2] / 64) * 64
}

pub fn render(compiled: &Compiled, palette: &[[u8; 3]; 16], row_count: usize) -> Result<String> {
    let mut out = String::new();

    out.push_str(";\n");
    out.push_str("; Mode 72 background tileset\n");
    out.push_str(";\n");
    out.push_str(";\n");
    out.push_str(&format!("; Number of tile rows: {row_count}\n"));
    out.push_str(";\n");
    out.push_str("\n\n");
    out.push_str("#include <avr/io.h>\n");
    out.push_str("#define  PIXOUT   _SFR_IO_ADDR(PORTC)\n");
    out.push_str("#define  GPR0     _SFR_IO_ADDR(GPIOR0)\n");
    out.push_str("#define  GPR1     _SFR_IO_ADDR(GPIOR1)\n");
    out.push_str("#define  STACKL   0x3D\n");
    out.push_str("#define  LB_SPR   254\n");
    out.push_str("#ifndef  M72_ALIGNED_SEC\n");
    out.push_str("#define  M72_ALIGNED_SEC .text.align512\n");
    out.push_str("#endif\n");
    out.push_str("\n\n");
    out.push_str(".global m72_defpalette\n");
    out.push_str(".global m72_deftilerows\n");
    out.push_str("\n\n");
    out.push_str(".section .text\n");
    out.push_str("\n\n\n");

    out.push_str("m72_defpalette:\n");
    for half in palette.chunks(8) {
        out.push_str("\t.byte");
        for (i, &rgb) in half.iter().enumerate() {
            if i + 1 < half.len() {
                out.push_str(&format!(" 0x{:02X},", uzebox_color(rgb)));
            } else {
                out.push_str(&format!(" 0x{:02X}\n", uzebox_color(rgb)));
            }
        }
    }
    out.push_str("\n\n\n");

    out.push_str("m72_deftilerows:\n");
    for line in 0..8 {
        out.push_str(&format!("\trjmp  tilerow_{line}\n"));
    }
    out.push('\n');
    for line in 0..8 {
        out.push_str(&format!("tilerow_{line}:\n"));
        out.push_str(&format!("\tldi   ZH,      hi8(pm(tilerow_{line}_map))\n"));
        out.push_str("\tout   PIXOUT,  r1      ; ( 599) Pixel 19\n");
        out.push_str("\tjmp   tilerow_entry\n");
        out.push('\n');
    }
    out.push_str("\n\n");
    out.push_str(".section M72_ALIGNED_SEC\n");
    out.push_str("\n.balign 512\n\n\n");

    for (address, op) in compiled.stream.ops().iter().enumerate() {
        if let Some(label) = &op.label {
            out.push_str(label);
            out.push_str(":\n");
        }
        match &op.text {
            Some(text) => {
                out.push('\t');
                out.push_str(text);
                out.push('\n');
            }
            None => {
                return Err(M72Error::Layout(format!(
                    "unresolved slot at word {address} reached the writer"
                )));
            }
        }
    }
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_packing_is_bbgggrrr() {
        assert_eq!(uzebox_color([0, 0, 0]), 0x00);
        assert_eq!(uzebox_color([255, 255, 255]), 0xFF);
        // full red is the low three bits
        assert_eq!(uzebox_color([255, 0, 0]), 0x07);
        // full green the middle three
        assert_eq!(uzebox_color([0, 255, 0]), 0x38);
        // full blue the top two
        assert_eq!(uzebox_color([0, 0, 255]), 0xC0);
        assert_eq!(uzebox_color([32, 64, 128]), 0x91);
    }
}
