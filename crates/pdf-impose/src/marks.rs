//! Mark Placer: turns a resolved grid + mark configuration into the concrete
//! [`MarkObject`] primitives the overlay renderer draws.

use crate::constants::*;
use crate::types::*;
use std::collections::HashSet;

#[allow(clippy::too_many_arguments)]
pub(crate) fn place_all_marks(
    grid: &[GridCell],
    cols: usize,
    mark_config: &MarkConfig,
    sheet_config: &SheetConfig,
    trim_w: f32,
    trim_h: f32,
    filename: &str,
    sheet_num: usize,
    total_sheets: usize,
) -> Vec<MarkObject> {
    let mut marks = Vec::new();

    if mark_config.crop_marks_enabled {
        marks.extend(place_crop_marks(grid, mark_config, trim_w, trim_h));
    }
    if mark_config.registration_marks_enabled {
        marks.extend(place_registration_marks(sheet_config));
    }
    if mark_config.color_bars_enabled {
        marks.extend(place_color_bars(sheet_config));
    }
    if mark_config.fold_marks_enabled {
        marks.extend(place_fold_marks(cols, sheet_config));
    }
    if mark_config.slug_info_enabled {
        marks.push(place_slug_info(
            sheet_config,
            mark_config,
            filename,
            sheet_num,
            total_sheets,
        ));
    }

    marks
}

/// Crop marks at every exterior trim corner, deduplicated and suppressed where
/// they'd land on top of a neighboring cell's trim area.
fn place_crop_marks(grid: &[GridCell], mark_config: &MarkConfig, trim_w: f32, trim_h: f32) -> Vec<MarkObject> {
    let length = mark_config.crop_mark_length;
    let offset = mark_config.crop_mark_offset;
    let stroke = mark_config.crop_mark_stroke_weight;
    let color = mark_config.crop_mark_color;

    // Only populated cells contribute suppression rects — indices into this list do
    // not line up with `grid`'s indices when cells are empty.
    let trim_rects: Vec<Rectangle> = grid
        .iter()
        .filter(|c| c.page_index.is_some())
        .map(|c| Rectangle::new(c.trim_origin_x, c.trim_origin_y, trim_w, trim_h))
        .collect();

    let mut marks = Vec::new();
    let mut seen: HashSet<(i64, i64, i64, i64)> = HashSet::new();

    for (cell_idx, cell) in grid.iter().enumerate() {
        if cell.page_index.is_none() {
            continue;
        }
        let tx = cell.trim_origin_x;
        let ty = cell.trim_origin_y;

        let corners = [
            (true, false, tx, ty),              // bottom_left
            (false, true, tx + trim_w, ty),      // bottom_right
            (true, false, tx, ty + trim_h),       // top_left
            (false, true, tx + trim_w, ty + trim_h), // top_right
        ];
        let is_bottom = [true, true, false, false];
        let is_top = [false, false, true, true];

        for (i, (is_left, is_right, cx, cy)) in corners.into_iter().enumerate() {
            if is_left && !cell.is_interior_edge.left {
                push_crop_mark(
                    &mut marks, &mut seen, &trim_rects, cell_idx,
                    cx - offset, cy, cx - offset - length, cy, stroke, color,
                );
            }
            if is_right && !cell.is_interior_edge.right {
                push_crop_mark(
                    &mut marks, &mut seen, &trim_rects, cell_idx,
                    cx + offset, cy, cx + offset + length, cy, stroke, color,
                );
            }
            if is_bottom[i] && !cell.is_interior_edge.bottom {
                push_crop_mark(
                    &mut marks, &mut seen, &trim_rects, cell_idx,
                    cx, cy - offset, cx, cy - offset - length, stroke, color,
                );
            }
            if is_top[i] && !cell.is_interior_edge.top {
                push_crop_mark(
                    &mut marks, &mut seen, &trim_rects, cell_idx,
                    cx, cy + offset, cx, cy + offset + length, stroke, color,
                );
            }
        }
    }

    marks
}

#[allow(clippy::too_many_arguments)]
fn push_crop_mark(
    marks: &mut Vec<MarkObject>,
    seen: &mut HashSet<(i64, i64, i64, i64)>,
    trim_rects: &[Rectangle],
    exclude_idx: usize,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    stroke: f32,
    color: CropMarkColor,
) {
    let key = (quantize(x1), quantize(y1), quantize(x2), quantize(y2));
    if seen.contains(&key) {
        return;
    }
    if line_overlaps_any_rect(x1, y1, x2, y2, trim_rects, exclude_idx) {
        return;
    }
    seen.insert(key);
    marks.push(MarkObject::Crop {
        x1,
        y1,
        x2,
        y2,
        stroke,
        color,
    });
}

fn quantize(v: f32) -> i64 {
    (v / DEDUP_QUANTIZATION_MM).round() as i64
}

fn line_overlaps_any_rect(x1: f32, y1: f32, x2: f32, y2: f32, rects: &[Rectangle], exclude_idx: usize) -> bool {
    let mid_x = (x1 + x2) / 2.0;
    let mid_y = (y1 + y2) / 2.0;
    for (i, rect) in rects.iter().enumerate() {
        if i == exclude_idx {
            continue;
        }
        if rect.contains_point(mid_x, mid_y) {
            return true;
        }
        if rect.contains_point(x1, y1) && rect.contains_point(x2, y2) {
            return true;
        }
    }
    false
}

/// Four registration targets, half a mark-margin in from each edge midpoint.
fn place_registration_marks(sheet_config: &SheetConfig) -> Vec<MarkObject> {
    let sw = sheet_config.sheet_width;
    let sh = sheet_config.sheet_height;
    let margin = sheet_config.mark_margin / 2.0;

    let positions = [
        (margin, sh / 2.0),
        (sw - margin, sh / 2.0),
        (sw / 2.0, margin),
        (sw / 2.0, sh - margin),
    ];

    positions
        .into_iter()
        .map(|(x, y)| MarkObject::Registration {
            x,
            y,
            radius: REGISTRATION_MARK_RADIUS_MM,
            crosshair_length: REGISTRATION_CROSSHAIR_LENGTH_MM,
            line_weight: REGISTRATION_LINE_WEIGHT_MM,
        })
        .collect()
}

/// The fixed 12-patch CMYK color bar, placed in the slug strip along the mark margin.
fn place_color_bars(sheet_config: &SheetConfig) -> Vec<MarkObject> {
    const COLORS: [(f32, f32, f32, f32); 12] = [
        (1.0, 0.0, 0.0, 0.0), // C
        (0.0, 1.0, 0.0, 0.0), // M
        (0.0, 0.0, 1.0, 0.0), // Y
        (0.0, 0.0, 0.0, 1.0), // K
        (1.0, 1.0, 0.0, 0.0), // C+M
        (1.0, 0.0, 1.0, 0.0), // C+Y
        (0.0, 1.0, 1.0, 0.0), // M+Y
        (1.0, 1.0, 1.0, 0.0), // C+M+Y
        (0.0, 0.0, 0.0, 1.0), // K 100%
        (0.0, 0.0, 0.0, 0.75),
        (0.0, 0.0, 0.0, 0.50),
        (0.0, 0.0, 0.0, 0.25),
    ];

    let bar_start_x = sheet_config.mark_margin;

    COLORS
        .into_iter()
        .enumerate()
        .map(|(i, cmyk)| MarkObject::ColorBar {
            x: bar_start_x + i as f32 * (COLOR_BAR_PATCH_SIZE_MM + COLOR_BAR_PATCH_GAP_MM),
            y: COLOR_BAR_Y_MM,
            width: COLOR_BAR_PATCH_SIZE_MM,
            height: COLOR_BAR_PATCH_SIZE_MM,
            cmyk,
        })
        .collect()
}

/// Fold marks, only meaningful for a 2-column booklet spread.
fn place_fold_marks(cols: usize, sheet_config: &SheetConfig) -> Vec<MarkObject> {
    if cols != 2 {
        return Vec::new();
    }
    let fold_x = sheet_config.sheet_width / 2.0;
    vec![
        MarkObject::Fold {
            x1: fold_x,
            y1: 0.0,
            x2: fold_x,
            y2: FOLD_MARK_LENGTH_MM,
        },
        MarkObject::Fold {
            x1: fold_x,
            y1: sheet_config.sheet_height,
            x2: fold_x,
            y2: sheet_config.sheet_height - FOLD_MARK_LENGTH_MM,
        },
    ]
}

fn place_slug_info(
    sheet_config: &SheetConfig,
    mark_config: &MarkConfig,
    filename: &str,
    sheet_num: usize,
    total_sheets: usize,
) -> MarkObject {
    let slug_y = sheet_config.sheet_height - SLUG_TEXT_TOP_OFFSET_MM;
    let slug_x = sheet_config.mark_margin;

    let parts: Vec<String> = mark_config
        .slug_text_content
        .iter()
        .map(|token| match token {
            SlugToken::Filename => format!("File: {filename}"),
            SlugToken::Date => format!("Date: {}", chrono::Local::now().format("%Y-%m-%d %H:%M")),
            SlugToken::SheetNumber => format!("Sheet: {sheet_num} of {total_sheets}"),
            SlugToken::ColorProfile => "Profile: CMYK".to_string(),
        })
        .collect();

    MarkObject::SlugText {
        x: slug_x,
        y: slug_y,
        text: parts.join("  |  "),
        font_size: SLUG_TEXT_FONT_SIZE_PT,
    }
}
