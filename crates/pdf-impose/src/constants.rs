//! Unit conversion and the numeric constants shared across the mark renderer.
//!
//! This system fixes `1 pt = 0.3528 mm` exactly. That is not the geometric
//! 72/25.4 ratio (≈ 2.83465 mm⁻¹) — it is the specific constant this system has
//! always used on the wire, and downstream behaviour must match it bit-for-bit
//! rather than re-derive it from first principles.
pub const PT_TO_MM: f32 = 0.3528;
pub const MM_TO_PT: f32 = 1.0 / PT_TO_MM;

pub const INCH_TO_MM: f32 = 25.4;
pub const MM_TO_INCH: f32 = 1.0 / INCH_TO_MM;

pub fn pt_to_mm(pt: f32) -> f32 {
    pt * PT_TO_MM
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

pub fn inch_to_mm(inch: f32) -> f32 {
    inch * INCH_TO_MM
}

pub fn mm_to_inch(mm: f32) -> f32 {
    mm * MM_TO_INCH
}

/// Fallback source page size (US Letter, points) when a page's boxes can't be read.
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (612.0, 792.0);

/// Bezier control-point factor for approximating a quarter circle with one cubic segment.
pub const BEZIER_CIRCLE_FACTOR: f32 = 0.552284749831;

/// Registration mark default outer radius, mm.
pub const REGISTRATION_MARK_RADIUS_MM: f32 = 4.0;
/// Registration mark inner circle as a fraction of the outer radius.
pub const REGISTRATION_INNER_RADIUS_RATIO: f32 = 0.3;
/// Registration mark crosshair total length, mm.
pub const REGISTRATION_CROSSHAIR_LENGTH_MM: f32 = 6.0;
/// Registration mark stroke weight, mm.
pub const REGISTRATION_LINE_WEIGHT_MM: f32 = 0.25;

/// Color bar patch size and gap, mm.
pub const COLOR_BAR_PATCH_SIZE_MM: f32 = 4.0;
pub const COLOR_BAR_PATCH_GAP_MM: f32 = 1.0;
pub const COLOR_BAR_Y_MM: f32 = 2.0;
pub const COLOR_BAR_STROKE_MM: f32 = 0.1;

/// Fold mark length and dash pattern, mm.
pub const FOLD_MARK_LENGTH_MM: f32 = 5.0;
pub const FOLD_MARK_STROKE_MM: f32 = 0.25;
pub const FOLD_MARK_DASH_MM: f32 = 3.0;

/// Slug text vertical offset from the sheet top, and font size, mm/pt.
pub const SLUG_TEXT_TOP_OFFSET_MM: f32 = 3.0;
pub const SLUG_TEXT_FONT_SIZE_PT: f32 = 6.0;
pub const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Quantization step used to dedup crop-mark keys, mm.
pub const DEDUP_QUANTIZATION_MM: f32 = 0.01;

/// Mixed page size tolerance used by the analyzer, mm.
pub const PAGE_SIZE_ROUNDING_MM: f32 = 0.1;

/// Detected-bleed clamp: a TrimBox/MediaBox gap larger than this is treated as
/// "not bleed, just a large media" and reset to zero.
pub const DETECTED_BLEED_CLAMP_MM: f32 = 10.0;

/// Existing-marks heuristic thresholds, mm/pt.
pub const EXISTING_MARKS_MIN_TRIM_MARGIN_MM: f32 = 1.0;
pub const EXISTING_MARKS_SPACE_OUTSIDE_MM: f32 = 5.0;
pub const EXISTING_MARKS_MIN_STROKE_PT: f32 = 0.05;
pub const EXISTING_MARKS_MAX_STROKE_PT: f32 = 1.0;
pub const EXISTING_MARKS_MIN_LENGTH_MM: f32 = 2.0;
pub const EXISTING_MARKS_MAX_LENGTH_MM: f32 = 20.0;
pub const EXISTING_MARKS_CORNER_RADIUS_MM: f32 = 20.0;
pub const EXISTING_MARKS_MIN_COUNT: usize = 4;
pub const EXISTING_MARKS_FALLBACK_MARGIN_MM: f32 = 8.0;
