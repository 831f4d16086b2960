// crates/m72gen-cli/src/io/mod.rs

pub mod indexed_png;
