//! Layout Planner: given sheet + trim + bleed + gap + auto-rotate, compute rows,
//! cols, n-up, total sheets, and the chosen cell rotation.

use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlannedLayout {
    pub rows: usize,
    pub cols: usize,
    pub n_up: usize,
    pub cell_rotation: u16,
    /// Effective trim width/height after applying `cell_rotation` (swapped on 90°).
    pub effective_trim_w: f32,
    pub effective_trim_h: f32,
}

pub(crate) fn plan_layout(config: &ImpositionConfig, page_count: usize) -> Result<PlannedLayout> {
    let (sheet_w, sheet_h) = config.sheet.oriented_dimensions();

    if config.trim_width + config.bleed.left + config.bleed.right > sheet_w
        || config.trim_height + config.bleed.top + config.bleed.bottom > sheet_h
    {
        return Err(ImposeError::TrimExceedsSheet(
            config.trim_width,
            config.trim_height,
            sheet_w,
            sheet_h,
        ));
    }

    let mark_margin = config.sheet.mark_margin;
    let grip = config.sheet.grip_edge;
    let gap = config.gap_between_items;
    let _ = page_count;

    let (cols_n, rows_n) = calc_grid_count(
        sheet_w,
        sheet_h,
        mark_margin,
        grip,
        config.trim_width,
        config.trim_height,
        &config.bleed,
        gap,
    );
    let n_up_normal = cols_n * rows_n;

    let mut rotation = 0u16;
    let mut best_cols = cols_n;
    let mut best_rows = rows_n;
    let mut trim_w = config.trim_width;
    let mut trim_h = config.trim_height;

    if config.auto_rotate {
        let (cols_r, rows_r) = calc_grid_count(
            sheet_w,
            sheet_h,
            mark_margin,
            grip,
            config.trim_height,
            config.trim_width,
            &config.bleed,
            gap,
        );
        let n_up_rotated = cols_r * rows_r;

        // Strictly greater only — ties keep the unrotated orientation.
        if n_up_rotated > n_up_normal {
            best_cols = cols_r;
            best_rows = rows_r;
            rotation = 90;
            std::mem::swap(&mut trim_w, &mut trim_h);
        }
    }

    let n_up = best_cols * best_rows;
    if n_up == 0 {
        return Err(ImposeError::ZeroNUp);
    }

    Ok(PlannedLayout {
        rows: best_rows,
        cols: best_cols,
        n_up,
        cell_rotation: rotation,
        effective_trim_w: trim_w,
        effective_trim_h: trim_h,
    })
}

/// How many cols x rows of `(trim_w, trim_h)` fit in the printable area.
fn calc_grid_count(
    sheet_w: f32,
    sheet_h: f32,
    mark_margin: f32,
    grip: f32,
    trim_w: f32,
    trim_h: f32,
    bleed: &BleedConfig,
    gap: f32,
) -> (usize, usize) {
    let available_w = sheet_w - 2.0 * mark_margin;
    let available_h = sheet_h - 2.0 * mark_margin - grip;

    if available_w <= 0.0 || available_h <= 0.0 {
        return (0, 0);
    }

    if gap == 0.0 {
        // Tight packing: outer edges need bleed, interior edges share trim.
        let outer_extra_w = bleed.left + bleed.right;
        let outer_extra_h = bleed.top + bleed.bottom;

        let mut cols: i64 = if trim_w > 0.0 {
            (((available_w - outer_extra_w) / trim_w).floor() as i64).max(1)
        } else {
            0
        };
        while cols > 0 && (outer_extra_w + cols as f32 * trim_w) > available_w {
            cols -= 1;
        }

        let mut rows: i64 = if trim_h > 0.0 {
            (((available_h - outer_extra_h) / trim_h).floor() as i64).max(1)
        } else {
            0
        };
        while rows > 0 && (outer_extra_h + rows as f32 * trim_h) > available_h {
            rows -= 1;
        }

        (cols.max(0) as usize, rows.max(0) as usize)
    } else {
        let cell_w = trim_w + bleed.left + bleed.right + gap;
        let cell_h = trim_h + bleed.top + bleed.bottom + gap;

        let cols = if cell_w > 0.0 {
            (available_w / cell_w).floor().max(0.0) as usize
        } else {
            0
        };
        let rows = if cell_h > 0.0 {
            (available_h / cell_h).floor().max(0.0) as usize
        } else {
            0
        };
        (cols, rows)
    }
}

/// The "total sheets" figure as the generic formula computes it — this is the
/// number used for slug-text numbering and the preview endpoint.
///
/// Known inconsistency (preserved verbatim, not silently fixed): for
/// `booklet_saddle_stitch` this generic formula (`ceil(page_count / pages_per_sheet)`
/// with `pages_per_sheet = n_up` or `2*n_up` if duplex) diverges from the actual
/// number of signatures the saddle-stitch sheet iterator produces
/// (`ceil(page_count / 4)`) whenever `n_up != 2`. Both are computed independently
/// and neither is adjusted to match the other — see [`crate::layout::saddle_stitch_sheets`].
pub(crate) fn planned_total_sheets(
    mode: ImpositionMode,
    page_count: usize,
    n_up: usize,
    duplex: bool,
) -> usize {
    match mode {
        ImpositionMode::StepAndRepeat => {
            if duplex {
                (page_count as f32 / 2.0).ceil().max(1.0) as usize
            } else {
                page_count.max(1)
            }
        }
        _ => {
            let pages_per_sheet = if duplex { n_up * 2 } else { n_up }.max(1);
            ((page_count as f32 / pages_per_sheet as f32).ceil() as usize).max(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sra3_sheet() -> SheetConfig {
        SheetConfig {
            sheet_width: 320.0,
            sheet_height: 450.0,
            orientation: Orientation::Landscape,
            grip_edge: 10.0,
            mark_margin: 8.0,
        }
    }

    fn config_with(trim_w: f32, trim_h: f32, sheet: SheetConfig) -> ImpositionConfig {
        ImpositionConfig {
            trim_width: trim_w,
            trim_height: trim_h,
            bleed: BleedConfig {
                top: 3.0,
                bottom: 3.0,
                left: 3.0,
                right: 3.0,
                uniform: true,
            },
            sheet,
            gap_between_items: 0.0,
            auto_rotate: true,
            ..ImpositionConfig::default()
        }
    }

    /// S1 — Business card on SRA3.
    #[test]
    fn business_card_on_sra3_yields_20_up() {
        let config = config_with(90.0, 55.0, sra3_sheet());
        let planned = plan_layout(&config, 100).unwrap();
        assert_eq!(planned.n_up, 20);
        assert_eq!(planned.rows * planned.cols, planned.n_up);
    }

    /// S3 — A4 cut-and-stack on SRA3, 2-up after rotation.
    #[test]
    fn a4_cut_and_stack_on_sra3_rotates_to_2_up() {
        let config = config_with(210.0, 297.0, sra3_sheet());
        let planned = plan_layout(&config, 10).unwrap();
        assert_eq!(planned.n_up, 2);
        assert_eq!(planned.cell_rotation, 90);
    }

    /// S4 — Trim exceeds sheet.
    #[test]
    fn trim_exceeding_sheet_is_rejected() {
        let config = config_with(
            300.0,
            400.0,
            SheetConfig {
                sheet_width: 210.0,
                sheet_height: 297.0,
                orientation: Orientation::Portrait,
                ..SheetConfig::default()
            },
        );
        let err = plan_layout(&config, 1).unwrap_err();
        assert!(matches!(err, ImposeError::TrimExceedsSheet(..)));
    }

    /// Invariant 6 — auto_rotate never decreases n_up vs the unrotated layout.
    #[test]
    fn auto_rotate_never_decreases_n_up() {
        let sheet = sra3_sheet();
        let rotate_on = config_with(210.0, 297.0, sheet);
        let mut rotate_off = rotate_on.clone();
        rotate_off.auto_rotate = false;

        let with_rotation = plan_layout(&rotate_on, 10).unwrap();
        let without_rotation = plan_layout(&rotate_off, 10).unwrap();
        assert!(with_rotation.n_up >= without_rotation.n_up);
    }

    /// A sheet too small for even one item fails instead of being clamped to 1.
    #[test]
    fn zero_n_up_is_reachable_rather_than_clamped() {
        let mut sheet = sra3_sheet();
        sheet.mark_margin = 160.0; // leaves no printable area at all
        let config = config_with(90.0, 55.0, sheet);
        let err = plan_layout(&config, 1).unwrap_err();
        assert!(matches!(err, ImposeError::ZeroNUp));
    }
}
