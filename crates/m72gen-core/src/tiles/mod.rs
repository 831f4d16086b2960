// crates/m72gen-core/src/tiles/mod.rs

use crate::error::{M72Error, Result};

/// Pixels per tile row, and scan-lines per tile.
pub const TILE_DIM: usize = 8;
/// Tile indices are one raw byte, so the renderer always dispatches over 256.
pub const TILE_COUNT: usize = 256;
/// 4-bit color indices.
pub const COLOR_COUNT: usize = 16;

/// One horizontal slice of a tile: 8 color indices in 0..16.
/// Identity is value equality; rows are deduplicated globally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRow(pub [u8; TILE_DIM]);

impl TileRow {
    pub fn solid(color: u8) -> Self {
        TileRow([color; TILE_DIM])
    }

    pub fn pixels(&self) -> &[u8; TILE_DIM] {
        &self.0
    }
}

/// Per-row usage over the 8 scan-line positions, split by tile half.
#[derive(Clone, Debug, Default)]
pub struct RowUsage {
    /// Bit r is set when the row appears on scan-line r of some tile.
    pub masks: Vec<u8>,
    /// Rows used only on scan-lines 0..4.
    pub upper: usize,
    /// Rows used only on scan-lines 4..8.
    pub lower: usize,
    /// Rows used in both halves.
    pub shared: usize,
}

/// Deduplicated row table plus the per-tile, per-scan-line index into it.
/// Always describes exactly 256 tiles after extraction.
pub struct TileSet {
    rows: Vec<TileRow>,
    tiles: Vec<[u16; TILE_DIM]>,
    source_tiles: usize,
}

impl TileSet {
    /// Extract from an indexed pixel buffer, left to right, top to bottom.
    /// Color indices >= 16 collapse to 0. Tiles beyond 256 are discarded;
    /// fewer than 256 are padded with an all-color-0 tile, because the jump
    /// table is addressed by a raw tile index byte.
    pub fn extract(width: usize, height: usize, pixels: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 || width % TILE_DIM != 0 || height % TILE_DIM != 0 {
            return Err(M72Error::Validation(format!(
                "image dimensions must be non-zero multiples of 8, got {width}x{height}"
            )));
        }
        if pixels.len() != width * height {
            return Err(M72Error::Validation(format!(
                "pixel buffer holds {} bytes, expected {}",
                pixels.len(),
                width * height
            )));
        }

        let mut rows: Vec<TileRow> = Vec::new();
        let mut tiles: Vec<[u16; TILE_DIM]> = Vec::new();

        'blocks: for ty in (0..height).step_by(TILE_DIM) {
            for tx in (0..width).step_by(TILE_DIM) {
                if tiles.len() == TILE_COUNT {
                    break 'blocks;
                }
                let mut ids = [0u16; TILE_DIM];
                for (line, id) in ids.iter_mut().enumerate() {
                    let mut px = [0u8; TILE_DIM];
                    for (x, p) in px.iter_mut().enumerate() {
                        let raw = pixels[(ty + line) * width + tx + x];
                        *p = if raw >= COLOR_COUNT as u8 { 0 } else { raw };
                    }
                    *id = intern_row(&mut rows, TileRow(px));
                }
                tiles.push(ids);
            }
        }

        let source_tiles = tiles.len();
        if tiles.len() < TILE_COUNT {
            let zero = intern_row(&mut rows, TileRow::solid(0));
            let pad = [zero; TILE_DIM];
            while tiles.len() < TILE_COUNT {
                tiles.push(pad);
            }
        }

        Ok(TileSet {
            rows,
            tiles,
            source_tiles,
        })
    }

    pub fn rows(&self) -> &[TileRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Tiles present in the source image (before padding), capped at 256.
    pub fn source_tile_count(&self) -> usize {
        self.source_tiles
    }

    /// The row shown on scan-line `line` of tile `tile`.
    pub fn row_of(&self, tile: usize, line: usize) -> &TileRow {
        &self.rows[self.tiles[tile][line] as usize]
    }

    pub fn row_id_of(&self, tile: usize, line: usize) -> u16 {
        self.tiles[tile][line]
    }

    pub fn usage(&self) -> RowUsage {
        let mut masks = vec![0u8; self.rows.len()];
        for ids in &self.tiles {
            for (line, &id) in ids.iter().enumerate() {
                masks[id as usize] |= 1 << line;
            }
        }
        let mut usage = RowUsage {
            masks,
            ..RowUsage::default()
        };
        for &mask in &usage.masks {
            let upper = mask & 0x0F != 0;
            let lower = mask & 0xF0 != 0;
            match (upper, lower) {
                (true, false) => usage.upper += 1,
                (false, true) => usage.lower += 1,
                (true, true) => usage.shared += 1,
                (false, false) => {}
            }
        }
        usage
    }
}

fn intern_row(rows: &mut Vec<TileRow>, row: TileRow) -> u16 {
    match rows.iter().position(|r| *r == row) {
        Some(idx) => idx as u16,
        None => {
            rows.push(row);
            (rows.len() - 1) as u16
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_of_tiles(tiles: &[[[u8; 8]; 8]]) -> (usize, usize, Vec<u8>) {
        let width = tiles.len() * 8;
        let mut pixels = vec![0u8; width * 8];
        for (t, tile) in tiles.iter().enumerate() {
            for (y, row) in tile.iter().enumerate() {
                for (x, &p) in row.iter().enumerate() {
                    pixels[y * width + t * 8 + x] = p;
                }
            }
        }
        (width, 8, pixels)
    }

    #[test]
    fn dedups_rows_and_pads_to_256_tiles() {
        let a = [[1u8; 8]; 8];
        let b = [[1u8; 8]; 8];
        let (w, h, px) = image_of_tiles(&[a, b]);
        let ts = TileSet::extract(w, h, &px).unwrap();

        assert_eq!(ts.source_tile_count(), 2);
        assert_eq!(ts.tiles.len(), 256);
        // one solid-1 row, plus the padding's solid-0 row
        assert_eq!(ts.row_count(), 2);
        assert_eq!(ts.row_of(0, 3), ts.row_of(1, 3));
        assert_eq!(*ts.row_of(255, 0), TileRow::solid(0));
    }

    #[test]
    fn out_of_range_colors_collapse_to_zero() {
        let mut tile = [[0u8; 8]; 8];
        tile[0][0] = 16;
        tile[0][1] = 200;
        tile[0][2] = 15;
        let (w, h, px) = image_of_tiles(&[tile]);
        let ts = TileSet::extract(w, h, &px).unwrap();
        assert_eq!(ts.row_of(0, 0).pixels()[..3], [0, 0, 15]);
    }

    #[test]
    fn rejects_bad_dimensions_and_short_buffers() {
        assert!(TileSet::extract(12, 8, &[0; 96]).is_err());
        assert!(TileSet::extract(0, 8, &[]).is_err());
        assert!(TileSet::extract(8, 8, &[0; 63]).is_err());
    }

    #[test]
    fn usage_splits_rows_by_tile_half() {
        let mut tile = [[0u8; 8]; 8];
        for y in 0..4 {
            tile[y] = [1; 8];
        }
        // rows: solid-1 in the upper half, solid-0 in the lower half of this
        // tile; padding tiles use solid-0 everywhere, making it shared
        let (w, h, px) = image_of_tiles(&[tile]);
        let ts = TileSet::extract(w, h, &px).unwrap();
        let usage = ts.usage();
        assert_eq!(usage.upper, 1);
        assert_eq!(usage.lower, 0);
        assert_eq!(usage.shared, 1);
    }
}
