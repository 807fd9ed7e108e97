//! Duplex Mirror: derives a back-side grid from a front grid so pages line up
//! correctly once the sheet is flipped for the second pass.

use crate::bleed::calculate_per_cell_bleed;
use crate::position::calculate_cell_positions;
use crate::types::*;

/// Mirror `front_grid` into a back grid per `config.flip_edge`, then re-resolve
/// bleed and positions for the mirrored layout.
///
/// `flip_edge = long` reverses columns (a left-right flip); `flip_edge = short`
/// reverses rows and rotates each cell 180° (a top-bottom flip).
pub(crate) fn create_duplex_back(
    front_grid: &[GridCell],
    rows: usize,
    cols: usize,
    config: &ImpositionConfig,
    trim_w: f32,
    trim_h: f32,
) -> Vec<GridCell> {
    let mut back_grid: Vec<GridCell> = front_grid.to_vec();

    match config.flip_edge {
        FlipEdge::Long => {
            for cell in back_grid.iter_mut() {
                cell.col = (cols - 1) - cell.col;
            }
        }
        FlipEdge::Short => {
            for cell in back_grid.iter_mut() {
                cell.row = (rows - 1) - cell.row;
                cell.rotation = (cell.rotation + 180) % 360;
            }
        }
    }

    calculate_per_cell_bleed(&mut back_grid, rows, cols, &config.bleed, config.gap_between_items);
    calculate_cell_positions(
        &mut back_grid,
        rows,
        cols,
        &config.sheet,
        &config.bleed,
        config.gap_between_items,
        trim_w,
        trim_h,
    );

    back_grid
}

/// Assign sequential page indices to the back grid's cells, visiting them in
/// row-major order so pagination stays predictable regardless of the mirror applied.
/// Returns the advanced page cursor.
pub(crate) fn assign_back_pages(back_grid: &mut [GridCell], mut page_cursor: usize, page_count: usize) -> usize {
    let mut order: Vec<usize> = (0..back_grid.len()).collect();
    order.sort_by_key(|&i| (back_grid[i].row, back_grid[i].col));

    for i in order {
        if page_cursor < page_count {
            back_grid[i].page_index = Some(page_cursor);
            page_cursor += 1;
        } else {
            back_grid[i].page_index = None;
        }
    }
    page_cursor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_2x2() -> Vec<GridCell> {
        vec![
            GridCell::new(0, 0, Some(0), 0),
            GridCell::new(0, 1, Some(1), 0),
            GridCell::new(1, 0, Some(2), 0),
            GridCell::new(1, 1, Some(3), 0),
        ]
    }

    fn config_with(flip_edge: FlipEdge) -> ImpositionConfig {
        ImpositionConfig {
            flip_edge,
            ..ImpositionConfig::default()
        }
    }

    /// S6 — long-edge flip mirrors columns only; page assignments travel with
    /// the cell, so the cell that was at (0, 0) ends up at (0, 1) carrying page 0.
    #[test]
    fn long_edge_flip_reverses_columns_only() {
        let front = grid_2x2();
        let config = config_with(FlipEdge::Long);
        let back = create_duplex_back(&front, 2, 2, &config, 90.0, 55.0);

        let was_top_left = back.iter().find(|c| c.page_index == Some(0)).unwrap();
        assert_eq!((was_top_left.row, was_top_left.col), (0, 1));
        assert_eq!(was_top_left.rotation, 0);
    }

    /// Short-edge flip reverses rows and rotates every cell 180 degrees.
    #[test]
    fn short_edge_flip_reverses_rows_and_rotates_180() {
        let front = grid_2x2();
        let config = config_with(FlipEdge::Short);
        let back = create_duplex_back(&front, 2, 2, &config, 90.0, 55.0);

        let was_top_left = back.iter().find(|c| c.page_index == Some(0)).unwrap();
        assert_eq!((was_top_left.row, was_top_left.col), (1, 0));
        assert_eq!(was_top_left.rotation, 180);
    }

    /// A cell already rotated 90 degrees wraps around correctly under a short flip.
    #[test]
    fn short_edge_flip_wraps_existing_rotation() {
        let mut front = grid_2x2();
        front[0].rotation = 270;
        let config = config_with(FlipEdge::Short);
        let back = create_duplex_back(&front, 2, 2, &config, 90.0, 55.0);

        let rotated = back.iter().find(|c| c.page_index == Some(0)).unwrap();
        assert_eq!(rotated.rotation, (270 + 180) % 360);
    }

    #[test]
    fn assign_back_pages_visits_row_major_and_stops_at_page_count() {
        let mut back = grid_2x2();
        // Shuffle so grid order no longer matches row-major order.
        back.swap(0, 3);
        let next_cursor = assign_back_pages(&mut back, 0, 3);

        assert_eq!(next_cursor, 3);
        let in_row_major: Vec<Option<usize>> = {
            let mut ordered = back.clone();
            ordered.sort_by_key(|c| (c.row, c.col));
            ordered.into_iter().map(|c| c.page_index).collect()
        };
        assert_eq!(in_row_major, vec![Some(0), Some(1), Some(2), None]);
    }
}
