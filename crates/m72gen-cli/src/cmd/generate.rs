// crates/m72gen-cli/src/cmd/generate.rs

use anyhow::Context;
use clap::Args;
use m72gen_core::{asm, compile, TileSet, Tuning};

use crate::io::indexed_png;

#[derive(Args)]
pub struct GenerateArgs {
    /// Input indexed PNG to generate the tileset from
    #[arg(long)]
    pub r#in: String,

    /// Output AVR assembly path
    #[arg(long)]
    pub out: String,

    /// Starting safety margin for unresolved jump distance, in words.
    /// Tightened automatically when a layout attempt fails.
    #[arg(long, default_value_t = 2040)]
    pub start_margin: usize,

    /// Margin decrease applied between layout attempts, in words
    #[arg(long, default_value_t = 10)]
    pub margin_step: usize,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let img = indexed_png::load(&args.r#in)?;

    println!("Image:  {}", args.r#in);
    println!("Width:  {:4}", img.width);
    println!("Height: {:4}", img.height);

    let tiles = TileSet::extract(img.width, img.height, &img.pixels)?;
    println!("Tiles:  {:4}", tiles.source_tile_count());
    println!("Rows:   {:4}", tiles.row_count());

    let tuning = Tuning {
        start_margin: args.start_margin,
        margin_step: args.margin_step,
        ..Tuning::default()
    };
    let compiled = compile(&tiles, &tuning)?;

    for (line, address) in compiled.report.table_addresses.iter().enumerate() {
        println!("Row {line} Jump table at {address}");
    }
    println!(
        "Size: {} words / {} bytes",
        compiled.report.words,
        compiled.report.words * 2
    );
    if compiled.report.attempts > 1 {
        println!(
            "Layout settled after {} attempts (margin {})",
            compiled.report.attempts, compiled.report.margin
        );
    }

    let text = asm::render(&compiled, &img.palette, tiles.row_count())?;
    std::fs::write(&args.out, text).with_context(|| format!("write assembly {}", args.out))?;
    Ok(())
}
