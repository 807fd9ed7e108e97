//! Position Solver: places each cell's trim origin on the sheet, centering the
//! whole grid, and derives each cell's clip rectangle from its resolved bleed.

use crate::types::*;

/// Compute `trim_origin_x/y` and `clip_rect` for every cell. Must run after
/// [`crate::bleed::calculate_per_cell_bleed`] — it reads `bleed_per_edge`.
pub(crate) fn calculate_cell_positions(
    grid: &mut [GridCell],
    rows: usize,
    cols: usize,
    sheet: &SheetConfig,
    bleed_config: &BleedConfig,
    gap: f32,
    trim_w: f32,
    trim_h: f32,
) {
    let (sheet_w, sheet_h) = sheet.oriented_dimensions();

    let (grid_w, grid_h, pitch_x, pitch_y) = if gap == 0.0 {
        (
            cols as f32 * trim_w + bleed_config.left + bleed_config.right,
            rows as f32 * trim_h + bleed_config.top + bleed_config.bottom,
            trim_w,
            trim_h,
        )
    } else {
        let pitch_x = trim_w + bleed_config.left + bleed_config.right + gap;
        let pitch_y = trim_h + bleed_config.top + bleed_config.bottom + gap;
        (
            cols as f32 * pitch_x - gap,
            rows as f32 * pitch_y - gap,
            pitch_x,
            pitch_y,
        )
    };

    let offset_x = (sheet_w - grid_w) / 2.0 + bleed_config.left;
    let offset_y = (sheet_h - grid_h) / 2.0 + bleed_config.bottom;

    for cell in grid.iter_mut() {
        cell.trim_origin_x = offset_x + cell.col as f32 * pitch_x;
        cell.trim_origin_y = offset_y + cell.row as f32 * pitch_y;

        cell.clip_rect = Rectangle::new(
            cell.trim_origin_x - cell.bleed_per_edge.left,
            cell.trim_origin_y - cell.bleed_per_edge.bottom,
            trim_w + cell.bleed_per_edge.left + cell.bleed_per_edge.right,
            trim_h + cell.bleed_per_edge.top + cell.bleed_per_edge.bottom,
        );
    }
}
