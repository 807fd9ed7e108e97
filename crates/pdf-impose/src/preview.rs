//! Preview: resolves layout, bleed, positions and marks for a single representative
//! sheet, without touching any source PDF bytes or assembling output pages.

use crate::bleed::calculate_per_cell_bleed;
use crate::layout::{build_grid, planned_total_sheets, plan_layout};
use crate::marks::place_all_marks;
use crate::position::calculate_cell_positions;
use crate::types::*;

/// Build a [`PreviewData`] for `config` against a source of `page_count` pages.
/// Uses sheet 0's grid convention for every mode (see [`crate::layout::build_grid`]).
pub fn generate_preview(config: &ImpositionConfig, page_count: usize, filename: &str) -> Result<PreviewData> {
    config.validate()?;
    let planned = plan_layout(config, page_count)?;
    let total_sheets = planned_total_sheets(config.mode, page_count, planned.n_up, config.duplex);

    let mut grid = build_grid(
        config.mode,
        planned.rows,
        planned.cols,
        page_count,
        planned.cell_rotation,
        0,
        planned.n_up,
    );

    calculate_per_cell_bleed(&mut grid, planned.rows, planned.cols, &config.bleed, config.gap_between_items);
    calculate_cell_positions(
        &mut grid,
        planned.rows,
        planned.cols,
        &config.sheet,
        &config.bleed,
        config.gap_between_items,
        planned.effective_trim_w,
        planned.effective_trim_h,
    );

    let marks = place_all_marks(
        &grid,
        planned.cols,
        &config.marks,
        &config.sheet,
        planned.effective_trim_w,
        planned.effective_trim_h,
        filename,
        1,
        total_sheets,
    );

    let (sheet_width_mm, sheet_height_mm) = config.sheet.oriented_dimensions();

    let layout = ImpositionLayout {
        rows: planned.rows,
        cols: planned.cols,
        n_up: planned.n_up,
        total_sheets,
        cell_rotation: planned.cell_rotation,
        grid: grid.clone(),
    };

    Ok(PreviewData {
        layout,
        grid,
        marks,
        sheet_width_mm,
        sheet_height_mm,
        effective_trim_w: planned.effective_trim_w,
        effective_trim_h: planned.effective_trim_h,
        page_count,
    })
}
