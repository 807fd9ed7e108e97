//! Grid Builder: lays out `GridCell`s for one sheet, dispatching on imposition mode.

use crate::types::{GridCell, ImpositionMode};

/// Build the cell grid for one sheet.
///
/// `step_and_repeat` always assigns `page_index = 0` to every cell — this is the
/// preview convention; at render time the pipeline assigns the real per-sheet page
/// index directly rather than going through this function (see the orchestrator).
pub(crate) fn build_grid(
    mode: ImpositionMode,
    rows: usize,
    cols: usize,
    page_count: usize,
    rotation: u16,
    sheet_number: usize,
    n_up: usize,
) -> Vec<GridCell> {
    match mode {
        ImpositionMode::StepAndRepeat => {
            let mut grid = Vec::with_capacity(rows * cols);
            for r in 0..rows {
                for c in 0..cols {
                    grid.push(GridCell::new(r, c, Some(0), rotation));
                }
            }
            grid
        }
        ImpositionMode::CutAndStack | ImpositionMode::BookletPerfectBind => {
            let mut grid = Vec::with_capacity(rows * cols);
            let mut cursor = sheet_number * n_up;
            for r in 0..rows {
                for c in 0..cols {
                    let page_index = if cursor < page_count {
                        Some(cursor)
                    } else {
                        None
                    };
                    grid.push(GridCell::new(r, c, page_index, rotation));
                    cursor += 1;
                }
            }
            grid
        }
        ImpositionMode::BookletSaddleStitch => {
            build_saddle_stitch_grid(rows, cols, page_count, rotation, sheet_number)
        }
    }
}

/// One physical sheet's front/back page pairing for saddle-stitch booklet imposition.
/// Always exactly two pages per side — saddle-stitch signatures are inherently 2-up;
/// this does not generalize to larger `n_up` values (see [`saddle_stitch_sheets`]).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SaddleStitchSheet {
    pub front: [Option<usize>; 2],
    pub back: [Option<usize>; 2],
}

/// All saddle-stitch sheet pairings for a document of `page_count` pages, padded up
/// to a multiple of 4 (blank pages become `None`).
pub(crate) fn saddle_stitch_sheets(page_count: usize) -> Vec<SaddleStitchSheet> {
    let total = page_count.div_ceil(4) * 4;
    let num_sheets = total / 4;
    let mut sheets = Vec::with_capacity(num_sheets);

    for i in 0..num_sheets {
        let front_left = total - 2 * i - 1;
        let front_right = 2 * i;
        let back_left = 2 * i + 1;
        let back_right = total - 2 * i - 2;

        let clamp = |p: usize| if p < page_count { Some(p) } else { None };
        sheets.push(SaddleStitchSheet {
            front: [clamp(front_left), clamp(front_right)],
            back: [clamp(back_left), clamp(back_right)],
        });
    }
    sheets
}

/// Build the front grid for one saddle-stitch signature. Only the first two cells
/// (row-major) are populated — matches [`saddle_stitch_sheets`]'s fixed 2-up pairing.
fn build_saddle_stitch_grid(
    rows: usize,
    cols: usize,
    page_count: usize,
    rotation: u16,
    sheet_number: usize,
) -> Vec<GridCell> {
    let sheets = saddle_stitch_sheets(page_count);
    let mut grid = Vec::new();
    if sheets.is_empty() {
        return grid;
    }
    let idx = sheet_number.min(sheets.len() - 1);
    let front_pages = sheets[idx].front;

    for (i, page_index) in front_pages.into_iter().enumerate() {
        let col = i % cols.max(1);
        let row = i / cols.max(1);
        grid.push(GridCell::new(row, col, page_index, rotation));
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Step-and-repeat cells all carry the preview placeholder page index 0.
    #[test]
    fn step_and_repeat_grid_uses_placeholder_page_index() {
        let grid = build_grid(ImpositionMode::StepAndRepeat, 2, 3, 100, 0, 0, 6);
        assert_eq!(grid.len(), 6);
        assert!(grid.iter().all(|c| c.page_index == Some(0)));
    }

    /// Cut-and-stack advances the page cursor per sheet, leaving trailing cells on
    /// the last sheet unpopulated once the document runs out of pages.
    #[test]
    fn cut_and_stack_grid_leaves_trailing_cells_empty_on_final_sheet() {
        let grid = build_grid(ImpositionMode::CutAndStack, 2, 2, 5, 0, 1, 4);
        let pages: Vec<Option<usize>> = grid.iter().map(|c| c.page_index).collect();
        assert_eq!(pages, vec![Some(4), None, None, None]);
    }

    /// The saddle-stitch signature law: on every sheet, the two front page numbers
    /// sum to the same value as the two back page numbers (`total_padded_pages - 1`),
    /// which is what keeps pages in the correct reading order once folded and stitched.
    #[test]
    fn saddle_stitch_front_and_back_pairs_share_the_signature_sum() {
        let sheets = saddle_stitch_sheets(8);
        assert_eq!(sheets.len(), 2);
        for sheet in &sheets {
            let front_sum: usize = sheet.front.iter().filter_map(|p| *p).sum();
            let back_sum: usize = sheet.back.iter().filter_map(|p| *p).sum();
            assert_eq!(front_sum, 7);
            assert_eq!(back_sum, 7);
        }
    }

    /// Page counts that aren't a multiple of 4 pad out with blank (`None`) pages
    /// rather than failing.
    #[test]
    fn saddle_stitch_pads_non_multiple_of_four_with_blanks() {
        let sheets = saddle_stitch_sheets(6);
        assert_eq!(sheets.len(), 2); // padded to 8
        let blanks: usize = sheets
            .iter()
            .flat_map(|s| s.front.iter().chain(s.back.iter()))
            .filter(|p| p.is_none())
            .count();
        assert_eq!(blanks, 2);
    }

    /// The known inconsistency this module preserves: a generic `n_up != 2` total
    /// sheets formula would predict a different count than the saddle-stitch
    /// iterator's `ceil(page_count / 4)` actually produces.
    #[test]
    fn saddle_stitch_sheet_count_is_always_ceil_page_count_over_four() {
        for page_count in [1usize, 4, 5, 8, 9, 16] {
            let sheets = saddle_stitch_sheets(page_count);
            assert_eq!(sheets.len(), page_count.div_ceil(4));
        }
    }
}
