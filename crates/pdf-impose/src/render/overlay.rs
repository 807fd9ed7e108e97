//! Renders a sheet's [`MarkObject`] list into a single content stream.
//!
//! This is the one path that turns mark primitives into PDF drawing operators.
//! The result is wrapped into its own one-page document and imported as a Form
//! XObject by the sheet assembler, rather than duplicating this logic once per
//! output backend.

use crate::constants::{mm_to_pt, BEZIER_CIRCLE_FACTOR};
use crate::types::*;

/// Render all marks to content-stream operators. Returns the operators and whether
/// a text-drawing mark requires a `Font` resource to be present.
pub(crate) fn render_marks_overlay_stream(marks: &[MarkObject]) -> (Vec<u8>, bool) {
    let mut ops = String::new();
    let mut needs_font = false;

    for mark in marks {
        match mark {
            MarkObject::Crop {
                x1,
                y1,
                x2,
                y2,
                stroke,
                color,
            } => {
                let (c, m, y, k) = color.cmyk();
                ops.push_str("q\n");
                ops.push_str(&format!("{c} {m} {y} {k} K\n"));
                ops.push_str(&format!("{} w\n", mm_to_pt(*stroke)));
                ops.push_str(&draw_line(mm_to_pt(*x1), mm_to_pt(*y1), mm_to_pt(*x2), mm_to_pt(*y2)));
                ops.push_str("Q\n");
            }
            MarkObject::Registration {
                x,
                y,
                radius,
                crosshair_length,
                line_weight,
            } => {
                let (cx, cy) = (mm_to_pt(*x), mm_to_pt(*y));
                let r = mm_to_pt(*radius);
                let half = mm_to_pt(*crosshair_length) / 2.0;
                ops.push_str("q\n");
                ops.push_str("1 1 1 1 K\n");
                ops.push_str(&format!("{} w\n", mm_to_pt(*line_weight)));
                ops.push_str(&draw_circle(cx, cy, r));
                ops.push_str(&draw_circle(cx, cy, r * 0.3));
                ops.push_str(&draw_line(cx - half, cy, cx + half, cy));
                ops.push_str(&draw_line(cx, cy - half, cx, cy + half));
                ops.push_str("Q\n");
            }
            MarkObject::ColorBar {
                x,
                y,
                width,
                height,
                cmyk,
            } => {
                let (c, m, yy, k) = cmyk;
                ops.push_str("q\n");
                ops.push_str(&format!("{c} {m} {yy} {k} k\n"));
                ops.push_str("0 0 0 0.3 K\n0.1 w\n");
                ops.push_str(&format!(
                    "{} {} {} {} re B\n",
                    mm_to_pt(*x),
                    mm_to_pt(*y),
                    mm_to_pt(*width),
                    mm_to_pt(*height)
                ));
                ops.push_str("Q\n");
            }
            MarkObject::Fold { x1, y1, x2, y2 } => {
                ops.push_str("q\n");
                ops.push_str("1 1 1 1 K\n0.25 w\n[3 3] 0 d\n");
                ops.push_str(&draw_line(mm_to_pt(*x1), mm_to_pt(*y1), mm_to_pt(*x2), mm_to_pt(*y2)));
                ops.push_str("Q\n");
            }
            MarkObject::SlugText {
                x,
                y,
                text,
                font_size,
            } => {
                needs_font = true;
                ops.push_str("q\n0 0 0 1 k\n");
                ops.push_str(&format!(
                    "BT /F1 {} Tf {} {} Td ({}) Tj ET\n",
                    font_size,
                    mm_to_pt(*x),
                    mm_to_pt(*y),
                    escape_pdf_string(text)
                ));
                ops.push_str("Q\n");
            }
        }
    }

    (ops.into_bytes(), needs_font)
}

fn draw_line(x1: f32, y1: f32, x2: f32, y2: f32) -> String {
    format!("{x1} {y1} m {x2} {y2} l S\n")
}

/// Approximate a circle with four cubic Bezier segments.
fn draw_circle(cx: f32, cy: f32, r: f32) -> String {
    let k = r * BEZIER_CIRCLE_FACTOR;
    format!(
        "{sx} {sy0} m \
         {c1x} {c1y} {c2x} {c2y} {ex} {ey0} c \
         {c3x} {c3y} {c4x} {c4y} {sx} {sy1} c \
         {c5x} {c5y} {c6x} {c6y} {ex} {ey1} c \
         {c7x} {c7y} {c8x} {c8y} {sx} {sy0} c S\n",
        sx = cx + r,
        sy0 = cy,
        c1x = cx + r,
        c1y = cy + k,
        c2x = cx + k,
        c2y = cy + r,
        ex = cx,
        ey0 = cy + r,
        c3x = cx - k,
        c3y = cy + r,
        c4x = cx - r,
        c4y = cy + k,
        sy1 = cy - r,
        c5x = cx - r,
        c5y = cy - k,
        c6x = cx - k,
        c6y = cy - r,
        ey1 = cy - r,
        c7x = cx + k,
        c7y = cy - r,
        c8x = cx + r,
        c8y = cy - k,
    )
}

fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
}
