//! Layout Planner + Grid Builder: how many items fit on a sheet, and the per-sheet
//! page ordering for each imposition mode.

mod grid;
mod planner;

pub(crate) use grid::{build_grid, saddle_stitch_sheets, SaddleStitchSheet};
pub(crate) use planner::{plan_layout, planned_total_sheets, PlannedLayout};
