/// Tiles per atlas row and column.
pub const ATLAS_SIZE_IN_BLOCKS: u16 = 16;
pub const NORMALIZED_TILE_SIZE: f32 = 1.0 / ATLAS_SIZE_IN_BLOCKS as f32;

/// Maps a tile-relative uv into the atlas.
/// Tiles are numbered row-major from the top-left; uv origin is bottom-left.
#[inline]
pub fn tile_uv(tile: u16, uv: [f32; 2]) -> [f32; 2] {
    let row = (tile / ATLAS_SIZE_IN_BLOCKS) as f32;
    let col = (tile % ATLAS_SIZE_IN_BLOCKS) as f32;
    let x = col * NORMALIZED_TILE_SIZE;
    let y = 1.0 - row * NORMALIZED_TILE_SIZE - NORMALIZED_TILE_SIZE;
    [
        x + NORMALIZED_TILE_SIZE * uv[0],
        y + NORMALIZED_TILE_SIZE * uv[1],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tile_sits_top_left() {
        assert_eq!(tile_uv(0, [0.0, 0.0]), [0.0, 1.0 - NORMALIZED_TILE_SIZE]);
        assert_eq!(tile_uv(0, [1.0, 1.0]), [NORMALIZED_TILE_SIZE, 1.0]);
    }

    #[test]
    fn tiles_wrap_by_row() {
        let [x, y] = tile_uv(17, [0.0, 0.0]);
        assert!((x - NORMALIZED_TILE_SIZE).abs() < 1e-6);
        assert!((y - (1.0 - 2.0 * NORMALIZED_TILE_SIZE)).abs() < 1e-6);
        let [x, _] = tile_uv(15, [1.0, 0.0]);
        assert!((x - 1.0).abs() < 1e-6);
    }
}
