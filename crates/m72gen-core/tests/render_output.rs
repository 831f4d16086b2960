// crates/m72gen-core/tests/render_output.rs

use m72gen_core::{asm, compile, TileSet, Tuning};

fn checkerboard_tileset() -> TileSet {
    let mut pixels = vec![0u8; 16 * 8];
    for (i, px) in pixels.iter_mut().enumerate() {
        let (x, y) = (i % 16, i / 16);
        *px = (((x + y) % 2) * 3) as u8;
    }
    TileSet::extract(16, 8, &pixels).unwrap()
}

#[test]
fn rendered_assembly_has_the_kernel_surroundings() {
    let tiles = checkerboard_tileset();
    let compiled = compile(&tiles, &Tuning::default()).unwrap();

    let mut palette = [[0u8; 3]; 16];
    palette[3] = [255, 255, 255];
    let text = asm::render(&compiled, &palette, tiles.row_count()).unwrap();

    assert!(text.contains("#define  PIXOUT   _SFR_IO_ADDR(PORTC)"));
    assert!(text.contains(".global m72_defpalette"));
    assert!(text.contains("m72_defpalette:\n\t.byte 0x00, 0x00, 0x00, 0xFF,"));
    assert!(text.contains(".balign 512"));
    for line in 0..8 {
        assert!(text.contains(&format!("tilerow_{line}_map:")));
        assert!(text.contains(&format!("\tldi   ZH,      hi8(pm(tilerow_{line}_map))")));
    }
    assert!(text.contains("tilerow_entry:"));
    assert!(!text.contains("ERROR"));

    // one body line (plus an optional label line) per stream word
    let body = text.split(".balign 512").nth(1).unwrap();
    let instructions = body
        .lines()
        .filter(|l| l.starts_with('\t'))
        .count();
    assert_eq!(instructions, compiled.report.words);
}

#[test]
fn header_reports_the_row_count() {
    let tiles = checkerboard_tileset();
    let compiled = compile(&tiles, &Tuning::default()).unwrap();
    let palette = [[0u8; 3]; 16];
    let text = asm::render(&compiled, &palette, tiles.row_count()).unwrap();
    assert!(text.contains(&format!("; Number of tile rows: {}", tiles.row_count())));
}
