// crates/m72gen-cli/src/main.rs

use clap::{Parser, Subcommand};

mod cmd;
mod io;

#[derive(Parser)]
#[command(name = "m72gen-cli")]
#[command(about = "Mode 72 background tileset generator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the scan-line renderer assembly from a tileset image
    Generate(cmd::generate::GenerateArgs),

    /// Report tile and row statistics for a tileset image
    Info(cmd::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Generate(args) => cmd::generate::run(args),
        Commands::Info(args) => cmd::info::run(args),
    }
}
