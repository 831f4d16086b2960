// crates/m72gen-cli/tests/generate_e2e.rs

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn tmp_path(name: &str, ext: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let pid = std::process::id();
    p.push(format!("m72gen_{}_{}_{}.{}", name, pid, nanos, ext));
    p
}

fn run_ok(cmd: &mut Command) -> String {
    let out = cmd.output().expect("spawn command");
    assert!(
        out.status.success(),
        "command failed: status={:?}\nstdout:\n{}\nstderr:\n{}",
        out.status.code(),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).into_owned()
}

/// Write a 16x16 indexed PNG (four tiles) with a 16-entry palette.
fn write_test_png(path: &PathBuf) {
    let mut palette = Vec::with_capacity(48);
    for i in 0..16u8 {
        palette.extend_from_slice(&[i * 16, 255 - i * 16, (i % 4) * 64]);
    }
    let mut pixels = vec![0u8; 16 * 16];
    for (i, px) in pixels.iter_mut().enumerate() {
        let (x, y) = (i % 16, i / 16);
        // two solid tiles, one striped, one gradient-ish
        *px = match (x / 8, y / 8) {
            (0, 0) => 1,
            (1, 0) => (y % 2 * 5) as u8,
            (0, 1) => (x % 8) as u8,
            _ => 9,
        };
    }

    let file = fs::File::create(path).expect("create png");
    let mut encoder = png::Encoder::new(file, 16, 16);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette);
    let mut writer = encoder.write_header().expect("png header");
    writer.write_image_data(&pixels).expect("png data");
}

#[test]
fn generate_writes_a_complete_assembly_file() {
    let png_path = tmp_path("tiles", "png");
    let asm_path = tmp_path("tiles", "s");
    write_test_png(&png_path);

    let stdout = run_ok(Command::new(env!("CARGO_BIN_EXE_m72gen-cli")).args([
        "generate",
        "--in",
        png_path.to_str().unwrap(),
        "--out",
        asm_path.to_str().unwrap(),
    ]));

    assert!(stdout.contains("Tiles:"));
    assert!(stdout.contains("Rows:"));
    assert!(stdout.contains("Row 7 Jump table at "));
    assert!(stdout.contains("Size: "));

    let asm = fs::read_to_string(&asm_path).expect("read generated assembly");
    assert!(asm.contains("m72_defpalette:"));
    assert!(asm.contains("m72_deftilerows:"));
    assert!(asm.contains("tilerow_entry:"));
    assert!(asm.contains(".balign 512"));
    assert!(!asm.contains("ERROR"));

    let _ = fs::remove_file(&png_path);
    let _ = fs::remove_file(&asm_path);
}

#[test]
fn generate_is_deterministic_across_runs() {
    let png_path = tmp_path("det", "png");
    let asm_a = tmp_path("det_a", "s");
    let asm_b = tmp_path("det_b", "s");
    write_test_png(&png_path);

    for out in [&asm_a, &asm_b] {
        run_ok(Command::new(env!("CARGO_BIN_EXE_m72gen-cli")).args([
            "generate",
            "--in",
            png_path.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
        ]));
    }
    let a = fs::read(&asm_a).unwrap();
    let b = fs::read(&asm_b).unwrap();
    assert_eq!(a, b);

    let _ = fs::remove_file(&png_path);
    let _ = fs::remove_file(&asm_a);
    let _ = fs::remove_file(&asm_b);
}

#[test]
fn info_reports_row_usage_split() {
    let png_path = tmp_path("info", "png");
    write_test_png(&png_path);

    let stdout = run_ok(Command::new(env!("CARGO_BIN_EXE_m72gen-cli")).args([
        "info",
        "--in",
        png_path.to_str().unwrap(),
    ]));

    assert!(stdout.contains("Tiles:"));
    assert!(stdout.contains("Upper:"));
    assert!(stdout.contains("Lower:"));
    assert!(stdout.contains("Shared:"));

    let _ = fs::remove_file(&png_path);
}
