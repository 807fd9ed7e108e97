//! Source Analyzer: reads page boxes from an uploaded PDF, derives bleed where it
//! isn't already explicit, flags mixed page sizes, and heuristically detects marks
//! already present in the source content stream.

use crate::constants::*;
use crate::render::{get_page_content, read_page_boxes};
use crate::types::*;
use lopdf::{Document, ObjectId};

pub fn analyze_pdf(doc: &Document) -> Result<AnalysisResult> {
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(ImposeError::Encrypted);
    }

    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    if page_ids.is_empty() {
        return Err(ImposeError::NoPages);
    }

    let mut warnings = Vec::new();
    let mut pages = Vec::with_capacity(page_ids.len());
    let mut first_page_size: Option<(f32, f32)> = None;

    for (page_index, page_id) in page_ids.into_iter().enumerate() {
        let (media_pt, trim_pt, bleed_pt, art_pt) =
            read_page_boxes(doc, page_id).ok_or(ImposeError::MalformedBox(page_index + 1))?;

        let media_rect = rect_from_pt(media_pt);
        let bleed_rect = bleed_pt.map(rect_from_pt);
        let art_rect = art_pt.map(rect_from_pt);

        let (trim_rect, detected_bleed) = match (trim_pt.map(rect_from_pt), bleed_rect) {
            (Some(trim), Some(bleed)) => {
                let detected = DetectedBleed {
                    top: (bleed.top_edge() - trim.top_edge()).max(0.0),
                    bottom: (trim.bottom_edge() - bleed.bottom_edge()).max(0.0),
                    left: (trim.left_edge() - bleed.left_edge()).max(0.0),
                    right: (bleed.right_edge() - trim.right_edge()).max(0.0),
                };
                (trim, detected)
            }
            (Some(trim), None) => {
                let raw_top = (media_rect.top_edge() - trim.top_edge()).max(0.0);
                let raw_bottom = (trim.bottom_edge() - media_rect.bottom_edge()).max(0.0);
                let raw_left = (trim.left_edge() - media_rect.left_edge()).max(0.0);
                let raw_right = (media_rect.right_edge() - trim.right_edge()).max(0.0);

                let clamp = |v: f32| if v <= DETECTED_BLEED_CLAMP_MM { v } else { 0.0 };
                let detected = DetectedBleed {
                    top: clamp(raw_top),
                    bottom: clamp(raw_bottom),
                    left: clamp(raw_left),
                    right: clamp(raw_right),
                };
                (trim, detected)
            }
            (None, _) => {
                warnings.push(format!(
                    "Page {}: No TrimBox found. Using MediaBox as trim size. \
                     Please verify or manually specify the trim size.",
                    page_index + 1
                ));
                (media_rect, DetectedBleed::default())
            }
        };

        let page_size_key = (round1(trim_rect.width), round1(trim_rect.height));
        match first_page_size {
            None => first_page_size = Some(page_size_key),
            Some(first) if page_size_key != first => {
                warnings.push(format!(
                    "Page {} has a different size ({:.1}x{:.1}mm) than page 1 ({:.1}x{:.1}mm).",
                    page_index + 1,
                    trim_rect.width,
                    trim_rect.height,
                    first.0,
                    first.1
                ));
            }
            _ => {}
        }

        let has_existing_marks = detect_existing_marks(doc, page_id, &trim_rect, &media_rect);

        pages.push(PageGeometry {
            media_box: media_rect,
            trim_box: Some(trim_rect),
            bleed_box: bleed_rect,
            art_box: art_rect,
            detected_bleed,
            has_existing_marks,
            existing_marks_stripped: false,
            page_index,
        });
    }

    Ok(AnalysisResult {
        page_count: pages.len(),
        pages,
        warnings,
    })
}

fn rect_from_pt((x, y, w, h): (f32, f32, f32, f32)) -> Rectangle {
    Rectangle::new(pt_to_mm(x), pt_to_mm(y), pt_to_mm(w), pt_to_mm(h))
}

fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

/// Heuristic: is there already room outside the trim box for crop marks, and if so,
/// does the content stream look like it already draws some?
fn detect_existing_marks(doc: &Document, page_id: ObjectId, trim_rect: &Rectangle, media_rect: &Rectangle) -> bool {
    if (trim_rect.width - media_rect.width).abs() < EXISTING_MARKS_MIN_TRIM_MARGIN_MM
        && (trim_rect.height - media_rect.height).abs() < EXISTING_MARKS_MIN_TRIM_MARGIN_MM
    {
        return false;
    }

    let space_outside = (trim_rect.left_edge() - media_rect.left_edge()) > EXISTING_MARKS_SPACE_OUTSIDE_MM
        || (media_rect.right_edge() - trim_rect.right_edge()) > EXISTING_MARKS_SPACE_OUTSIDE_MM
        || (trim_rect.bottom_edge() - media_rect.bottom_edge()) > EXISTING_MARKS_SPACE_OUTSIDE_MM
        || (media_rect.top_edge() - trim_rect.top_edge()) > EXISTING_MARKS_SPACE_OUTSIDE_MM;

    if !space_outside {
        return false;
    }

    let content = page_content_text(doc, page_id);
    if !content.is_empty() {
        return scan_for_crop_marks(&content, trim_rect);
    }

    let margin = (trim_rect.left_edge() - media_rect.left_edge())
        .min(media_rect.right_edge() - trim_rect.right_edge())
        .min(trim_rect.bottom_edge() - media_rect.bottom_edge())
        .min(media_rect.top_edge() - trim_rect.top_edge());

    margin > EXISTING_MARKS_FALLBACK_MARGIN_MM
}

fn page_content_text(doc: &Document, page_id: ObjectId) -> String {
    let Ok(dict) = doc.get_dictionary(page_id) else {
        return String::new();
    };
    let bytes = get_page_content(doc, dict).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Scan a decompressed content stream line by line for `x1 y1 m x2 y2 l` sequences
/// drawn with a thin stroke, clustered near the trim box's corners.
fn scan_for_crop_marks(content: &str, trim_rect: &Rectangle) -> bool {
    let mut current_width_pt: f32 = 1.0;
    let mut thin_lines_outside = 0usize;

    let corners = [
        (trim_rect.left_edge(), trim_rect.bottom_edge()),
        (trim_rect.right_edge(), trim_rect.bottom_edge()),
        (trim_rect.left_edge(), trim_rect.top_edge()),
        (trim_rect.right_edge(), trim_rect.top_edge()),
    ];

    for line in content.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        for w in tokens.windows(2) {
            if w[1] == "w" {
                if let Ok(v) = w[0].parse::<f32>() {
                    current_width_pt = v;
                }
            }
        }

        if current_width_pt < EXISTING_MARKS_MIN_STROKE_PT || current_width_pt > EXISTING_MARKS_MAX_STROKE_PT {
            continue;
        }

        for w in tokens.windows(6) {
            if w[2] != "m" || w[5] != "l" {
                continue;
            }
            let (Ok(x1), Ok(y1), Ok(x2), Ok(y2)) =
                (w[0].parse::<f32>(), w[1].parse::<f32>(), w[3].parse::<f32>(), w[4].parse::<f32>())
            else {
                continue;
            };
            let (x1_mm, y1_mm, x2_mm, y2_mm) = (pt_to_mm(x1), pt_to_mm(y1), pt_to_mm(x2), pt_to_mm(y2));

            let is_h = (y1_mm - y2_mm).abs() < 0.5;
            let is_v = (x1_mm - x2_mm).abs() < 0.5;
            if !is_h && !is_v {
                continue;
            }
            let length = if is_h { (x2_mm - x1_mm).abs() } else { (y2_mm - y1_mm).abs() };
            if length < EXISTING_MARKS_MIN_LENGTH_MM || length > EXISTING_MARKS_MAX_LENGTH_MM {
                continue;
            }

            for (cx, cy) in corners {
                let dx = (x1_mm - cx).abs().min((x2_mm - cx).abs());
                let dy = (y1_mm - cy).abs().min((y2_mm - cy).abs());
                let dist = (dx * dx + dy * dy).sqrt();
                if dist < EXISTING_MARKS_CORNER_RADIUS_MM {
                    thin_lines_outside += 1;
                    break;
                }
            }
        }
    }

    thin_lines_outside >= EXISTING_MARKS_MIN_COUNT
}
