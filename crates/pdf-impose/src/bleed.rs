//! Bleed Resolver: decides, per cell edge, whether it's interior (touching another
//! cell, so no bleed is needed) or exterior (facing the sheet edge or empty space,
//! so it gets the full configured bleed).

use crate::types::*;
use std::collections::HashMap;

/// Resolve per-edge bleed and interior/exterior flags for every populated cell.
///
/// Neighbor lookup is O(1) via a `(row, col) -> index` map, rather than scanning the
/// whole grid per edge per cell.
pub(crate) fn calculate_per_cell_bleed(
    grid: &mut [GridCell],
    rows: usize,
    cols: usize,
    bleed_config: &BleedConfig,
    gap: f32,
) {
    let positions: HashMap<(usize, usize), usize> = grid
        .iter()
        .enumerate()
        .map(|(i, c)| ((c.row, c.col), i))
        .collect();

    for i in 0..grid.len() {
        if grid[i].page_index.is_none() {
            continue;
        }
        let (row, col) = (grid[i].row, grid[i].col);

        let mut bleed_values = EdgeBleed::default();
        let mut interior_flags = EdgeFlags::default();

        for edge in Edge::ALL {
            let neighbor_coord = neighbor_coord(row, col, edge, rows, cols);
            let neighbor_has_content = neighbor_coord
                .and_then(|coord| positions.get(&coord))
                .map(|&idx| grid[idx].page_index.is_some())
                .unwrap_or(false);

            let configured = bleed_config.get(edge);
            if gap > 0.0 || !neighbor_has_content {
                bleed_values.set(edge, configured);
                interior_flags.set(edge, false);
            } else {
                bleed_values.set(edge, 0.0);
                interior_flags.set(edge, true);
            }
        }

        grid[i].bleed_per_edge = bleed_values;
        grid[i].is_interior_edge = interior_flags;
    }
}

/// The grid coordinate one step across `edge` from `(row, col)`, or `None` if that
/// step runs off the grid. Rows increase upward (`top` = `row + 1`).
fn neighbor_coord(
    row: usize,
    col: usize,
    edge: Edge,
    total_rows: usize,
    total_cols: usize,
) -> Option<(usize, usize)> {
    let (row, col) = match edge {
        Edge::Top => (row.checked_add(1)?, col),
        Edge::Bottom => (row.checked_sub(1)?, col),
        Edge::Left => (row, col.checked_sub(1)?),
        Edge::Right => (row, col.checked_add(1)?),
    };
    if row >= total_rows || col >= total_cols {
        return None;
    }
    Some((row, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_grid(rows: usize, cols: usize) -> Vec<GridCell> {
        let mut grid = Vec::with_capacity(rows * cols);
        let mut idx = 0;
        for row in 0..rows {
            for col in 0..cols {
                grid.push(GridCell::new(row, col, Some(idx), 0));
                idx += 1;
            }
        }
        grid
    }

    fn bleed(amount: f32) -> BleedConfig {
        BleedConfig {
            top: amount,
            bottom: amount,
            left: amount,
            right: amount,
            uniform: true,
        }
    }

    /// S5 — a 3x3 tight-packed (gap=0) grid: the center cell shares all four edges
    /// with a neighbor, so it gets zero bleed and every edge marked interior.
    #[test]
    fn interior_cell_gets_no_bleed_when_gap_is_zero() {
        let mut grid = full_grid(3, 3);
        calculate_per_cell_bleed(&mut grid, 3, 3, &bleed(3.0), 0.0);

        let center = grid.iter().find(|c| c.row == 1 && c.col == 1).unwrap();
        assert_eq!(center.bleed_per_edge, EdgeBleed::default());
        assert!(center.is_interior_edge.top);
        assert!(center.is_interior_edge.bottom);
        assert!(center.is_interior_edge.left);
        assert!(center.is_interior_edge.right);
    }

    /// The corner cell of that same grid faces the sheet edge on two sides, so
    /// those two edges get full bleed while the two interior edges get none.
    #[test]
    fn exterior_cell_gets_full_bleed_on_sheet_facing_edges() {
        let mut grid = full_grid(3, 3);
        calculate_per_cell_bleed(&mut grid, 3, 3, &bleed(3.0), 0.0);

        let corner = grid.iter().find(|c| c.row == 0 && c.col == 0).unwrap();
        assert_eq!(corner.bleed_per_edge.bottom, 3.0);
        assert_eq!(corner.bleed_per_edge.left, 3.0);
        assert_eq!(corner.bleed_per_edge.top, 0.0);
        assert_eq!(corner.bleed_per_edge.right, 0.0);
        assert!(!corner.is_interior_edge.bottom);
        assert!(!corner.is_interior_edge.left);
        assert!(corner.is_interior_edge.top);
        assert!(corner.is_interior_edge.right);
    }

    /// With a nonzero gap every edge gets full bleed regardless of neighbors, since
    /// cells no longer share an edge.
    #[test]
    fn nonzero_gap_forces_full_bleed_on_every_edge() {
        let mut grid = full_grid(2, 2);
        calculate_per_cell_bleed(&mut grid, 2, 2, &bleed(3.0), 5.0);

        for cell in &grid {
            assert_eq!(cell.bleed_per_edge, EdgeBleed {
                top: 3.0,
                bottom: 3.0,
                left: 3.0,
                right: 3.0,
            });
            assert!(!cell.is_interior_edge.top);
            assert!(!cell.is_interior_edge.bottom);
            assert!(!cell.is_interior_edge.left);
            assert!(!cell.is_interior_edge.right);
        }
    }

    /// An empty cell (no page assigned) is skipped entirely — its bleed fields stay
    /// at their default, and a neighbor treats it as having no content.
    #[test]
    fn unpopulated_cell_is_not_resolved_and_does_not_count_as_content() {
        let mut grid = full_grid(2, 2);
        grid[3].page_index = None; // row 1, col 1 is empty
        calculate_per_cell_bleed(&mut grid, 2, 2, &bleed(3.0), 0.0);

        assert_eq!(grid[3].bleed_per_edge, EdgeBleed::default());

        // The cell above-left of the empty one (row 0, col 1) now faces empty space
        // on its top edge, so that edge gets full bleed instead of being interior.
        let neighbor = grid.iter().find(|c| c.row == 0 && c.col == 1).unwrap();
        assert_eq!(neighbor.bleed_per_edge.top, 3.0);
        assert!(!neighbor.is_interior_edge.top);
    }
}
