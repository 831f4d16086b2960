// crates/m72gen-cli/src/io/indexed_png.rs

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::BufReader;

/// An indexed image unpacked to one color index per byte, plus the first 16
/// palette entries (missing entries read as black).
pub struct IndexedImage {
    pub width: usize,
    pub height: usize,
    pub palette: [[u8; 3]; 16],
    pub pixels: Vec<u8>,
}

/// Load an indexed (palette) PNG. Sub-byte bit depths are unpacked here;
/// the palette is never expanded to RGB.
pub fn load(path: &str) -> Result<IndexedImage> {
    let file = File::open(path).with_context(|| format!("open image {path}"))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder
        .read_info()
        .with_context(|| format!("decode image {path}"))?;

    let info = reader.info();
    if info.color_type != png::ColorType::Indexed {
        bail!("image must be an indexed (palette) PNG: {path}");
    }
    let plte = match &info.palette {
        Some(plte) => plte.to_vec(),
        None => bail!("image has no palette: {path}"),
    };
    let width = info.width as usize;
    let height = info.height as usize;
    let bits = match info.bit_depth {
        png::BitDepth::One => 1usize,
        png::BitDepth::Two => 2,
        png::BitDepth::Four => 4,
        png::BitDepth::Eight => 8,
        png::BitDepth::Sixteen => bail!("16-bit depth is not valid for indexed images: {path}"),
    };
    // one sample per pixel, rows padded to byte boundaries
    let line_size = (width * bits).div_ceil(8);

    let mut buf = vec![0u8; line_size * height];
    reader
        .next_frame(&mut buf)
        .with_context(|| format!("read image data {path}"))?;

    let pixels = unpack_indices(&buf, width, height, line_size, bits);

    let mut palette = [[0u8; 3]; 16];
    for (slot, rgb) in palette.iter_mut().zip(plte.chunks_exact(3).take(16)) {
        slot.copy_from_slice(rgb);
    }

    Ok(IndexedImage {
        width,
        height,
        palette,
        pixels,
    })
}

fn unpack_indices(buf: &[u8], width: usize, height: usize, line_size: usize, bits: usize) -> Vec<u8> {
    let mask = ((1u16 << bits) - 1) as u8;
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        let line = &buf[y * line_size..y * line_size + line_size];
        for x in 0..width {
            let byte = line[x * bits / 8];
            let shift = 8 - bits - (x * bits) % 8;
            pixels.push((byte >> shift) & mask);
        }
    }
    pixels
}
