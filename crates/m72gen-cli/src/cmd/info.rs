// crates/m72gen-cli/src/cmd/info.rs

use clap::Args;
use m72gen_core::TileSet;

use crate::io::indexed_png;

#[derive(Args)]
pub struct InfoArgs {
    /// Input indexed PNG to analyze
    #[arg(long)]
    pub r#in: String,
}

pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let img = indexed_png::load(&args.r#in)?;

    println!("Image:  {}", args.r#in);
    println!("Width:  {:4}", img.width);
    println!("Height: {:4}", img.height);

    let tiles = TileSet::extract(img.width, img.height, &img.pixels)?;
    let usage = tiles.usage();

    println!("Tiles:  {:4}", tiles.source_tile_count());
    println!("Rows:   {:4}", tiles.row_count());
    println!("Upper:  {:4}", usage.upper);
    println!("Lower:  {:4}", usage.lower);
    println!("Shared: {:4}", usage.shared);
    Ok(())
}
