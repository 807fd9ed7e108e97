//! Core data model: geometry primitives, configuration, and the imposition domain types.

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors produced anywhere in the imposition pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ImposeError {
    #[error("source PDF is encrypted")]
    Encrypted,

    #[error("source PDF contains zero pages")]
    NoPages,

    #[error("page {0} has no MediaBox")]
    MalformedBox(usize),

    #[error("trim size plus bleed ({0}x{1} mm) exceeds sheet size ({2}x{3} mm)")]
    TrimExceedsSheet(f32, f32, f32, f32),

    #[error("no item fits the printable area with the current sheet/trim/bleed settings")]
    ZeroNUp,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("PDF assembly failed: {0}")]
    AssemblyFailure(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[cfg(feature = "serde")]
    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ImposeError>;

/// An axis-aligned rectangle. Origin is bottom-left; y grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left_edge(&self) -> f32 {
        self.x
    }

    pub fn right_edge(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom_edge(&self) -> f32 {
        self.y
    }

    pub fn top_edge(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn expand(&self, top: f32, bottom: f32, left: f32, right: f32) -> Rectangle {
        Rectangle {
            x: self.x - left,
            y: self.y - bottom,
            width: self.width + left + right,
            height: self.height + top + bottom,
        }
    }

    pub fn overlaps(&self, other: &Rectangle) -> bool {
        if self.right_edge() <= other.left_edge() || other.right_edge() <= self.left_edge() {
            return false;
        }
        if self.top_edge() <= other.bottom_edge() || other.top_edge() <= self.bottom_edge() {
            return false;
        }
        true
    }

    pub fn contains_point(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// The four edges of a grid cell, as a fixed tag rather than a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];
}

/// Per-edge bleed amount, addressed by [`Edge`] instead of string keys.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeBleed {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl EdgeBleed {
    pub fn get(&self, edge: Edge) -> f32 {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    pub fn set(&mut self, edge: Edge, value: f32) {
        match edge {
            Edge::Top => self.top = value,
            Edge::Bottom => self.bottom = value,
            Edge::Left => self.left = value,
            Edge::Right => self.right = value,
        }
    }
}

/// Per-edge interior/exterior flags, addressed by [`Edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeFlags {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl EdgeFlags {
    pub fn get(&self, edge: Edge) -> bool {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    pub fn set(&mut self, edge: Edge, value: bool) {
        match edge {
            Edge::Top => self.top = value,
            Edge::Bottom => self.bottom = value,
            Edge::Left => self.left = value,
            Edge::Right => self.right = value,
        }
    }
}

/// Non-negative bleed detected on a source page by the analyzer, or configured outer bleed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectedBleed {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

/// Geometry of one source page, as derived by the analyzer. Produced once per upload,
/// then immutable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PageGeometry {
    pub media_box: Rectangle,
    pub trim_box: Option<Rectangle>,
    pub bleed_box: Option<Rectangle>,
    pub art_box: Option<Rectangle>,
    pub detected_bleed: DetectedBleed,
    pub has_existing_marks: bool,
    /// Whether the analyzer's mark heuristic already found and accounted for marks
    /// that were present in the source content stream (as opposed to marks this
    /// pipeline is about to add). Informational; does not change output.
    pub existing_marks_stripped: bool,
    pub page_index: usize,
}

/// Result of analyzing a source PDF.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisResult {
    pub page_count: usize,
    pub pages: Vec<PageGeometry>,
    pub warnings: Vec<String>,
}

/// Four non-negative edge bleeds plus a UI hint.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BleedConfig {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
    /// Informational only; consumed by UI collaborators, not by the core.
    pub uniform: bool,
}

impl Default for BleedConfig {
    fn default() -> Self {
        Self {
            top: 3.0,
            bottom: 3.0,
            left: 3.0,
            right: 3.0,
            uniform: true,
        }
    }
}

impl BleedConfig {
    pub fn get(&self, edge: Edge) -> f32 {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }
}

/// Which color a registration/crop mark renders in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CropMarkColor {
    Registration,
    BlackOnly,
}

impl CropMarkColor {
    /// CMYK tuple this color renders as.
    pub fn cmyk(self) -> (f32, f32, f32, f32) {
        match self {
            CropMarkColor::Registration => (1.0, 1.0, 1.0, 1.0),
            CropMarkColor::BlackOnly => (0.0, 0.0, 0.0, 1.0),
        }
    }
}

/// One item in the slug text content list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SlugToken {
    Filename,
    Date,
    SheetNumber,
    ColorProfile,
}

/// Toggles and numeric parameters for each mark kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarkConfig {
    pub crop_marks_enabled: bool,
    pub crop_mark_length: f32,
    pub crop_mark_offset: f32,
    pub crop_mark_stroke_weight: f32,
    pub crop_mark_color: CropMarkColor,

    pub registration_marks_enabled: bool,
    pub color_bars_enabled: bool,
    pub fold_marks_enabled: bool,

    pub slug_info_enabled: bool,
    pub slug_text_content: Vec<SlugToken>,
}

impl Default for MarkConfig {
    fn default() -> Self {
        Self {
            crop_marks_enabled: true,
            crop_mark_length: 5.0,
            crop_mark_offset: 3.0,
            crop_mark_stroke_weight: 0.25,
            crop_mark_color: CropMarkColor::Registration,
            registration_marks_enabled: true,
            color_bars_enabled: true,
            fold_marks_enabled: true,
            slug_info_enabled: true,
            slug_text_content: vec![SlugToken::Filename, SlugToken::Date, SlugToken::SheetNumber],
        }
    }
}

/// Sheet orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    Landscape,
    Portrait,
}

/// Physical sheet dimensions and reserved strips.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SheetConfig {
    pub sheet_width: f32,
    pub sheet_height: f32,
    pub orientation: Orientation,
    pub grip_edge: f32,
    pub mark_margin: f32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            sheet_width: 488.0,
            sheet_height: 330.0,
            orientation: Orientation::Landscape,
            grip_edge: 10.0,
            mark_margin: 8.0,
        }
    }
}

impl SheetConfig {
    /// Actual (width, height) after applying the orientation swap rule.
    pub fn oriented_dimensions(&self) -> (f32, f32) {
        let (mut w, mut h) = (self.sheet_width, self.sheet_height);
        match self.orientation {
            Orientation::Landscape if w < h => std::mem::swap(&mut w, &mut h),
            Orientation::Portrait if w > h => std::mem::swap(&mut w, &mut h),
            _ => {}
        }
        (w, h)
    }
}

/// Which edge a sheet is flipped around for duplex printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FlipEdge {
    Long,
    Short,
}

/// The imposition strategy driving grid construction and page ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ImpositionMode {
    StepAndRepeat,
    BookletSaddleStitch,
    BookletPerfectBind,
    CutAndStack,
}

/// Top-level configuration for one imposition job.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImpositionConfig {
    pub mode: ImpositionMode,
    pub trim_width: f32,
    pub trim_height: f32,
    pub bleed: BleedConfig,
    pub marks: MarkConfig,
    pub sheet: SheetConfig,
    pub gap_between_items: f32,
    pub duplex: bool,
    pub flip_edge: FlipEdge,
    pub auto_rotate: bool,
    /// Progressive inward shift for saddle-stitch inner pages. Exposed as a knob;
    /// not applied anywhere in the core geometry.
    pub creep_adjustment: f32,
}

impl Default for ImpositionConfig {
    fn default() -> Self {
        Self {
            mode: ImpositionMode::StepAndRepeat,
            trim_width: 90.0,
            trim_height: 55.0,
            bleed: BleedConfig::default(),
            marks: MarkConfig::default(),
            sheet: SheetConfig::default(),
            gap_between_items: 0.0,
            duplex: false,
            flip_edge: FlipEdge::Long,
            auto_rotate: true,
            creep_adjustment: 0.0,
        }
    }
}

impl ImpositionConfig {
    /// Reject negative lengths up front, independent of layout feasibility.
    pub fn validate(&self) -> Result<()> {
        let negatives = [
            ("trim_width", self.trim_width),
            ("trim_height", self.trim_height),
            ("bleed.top", self.bleed.top),
            ("bleed.bottom", self.bleed.bottom),
            ("bleed.left", self.bleed.left),
            ("bleed.right", self.bleed.right),
            ("gap_between_items", self.gap_between_items),
            ("sheet.sheet_width", self.sheet.sheet_width),
            ("sheet.sheet_height", self.sheet.sheet_height),
            ("sheet.grip_edge", self.sheet.grip_edge),
            ("sheet.mark_margin", self.sheet.mark_margin),
        ];
        for (name, value) in negatives {
            if value < 0.0 {
                return Err(ImposeError::InvalidConfig(format!(
                    "{name} must not be negative (got {value})"
                )));
            }
        }
        Ok(())
    }
}

/// One placement slot in an imposition grid. Rows are indexed from 0 at the bottom;
/// columns from 0 at the left.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub page_index: Option<usize>,
    pub rotation: u16,
    pub trim_origin_x: f32,
    pub trim_origin_y: f32,
    pub clip_rect: Rectangle,
    pub bleed_per_edge: EdgeBleed,
    pub is_interior_edge: EdgeFlags,
}

impl GridCell {
    pub fn new(row: usize, col: usize, page_index: Option<usize>, rotation: u16) -> Self {
        Self {
            row,
            col,
            page_index,
            rotation,
            ..Default::default()
        }
    }

    pub fn trim_rect(&self, trim_w: f32, trim_h: f32) -> Rectangle {
        Rectangle::new(self.trim_origin_x, self.trim_origin_y, trim_w, trim_h)
    }
}

/// The computed sheet layout: grid dimensions, sheet count, and the per-sheet grid.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImpositionLayout {
    pub rows: usize,
    pub cols: usize,
    pub n_up: usize,
    pub total_sheets: usize,
    pub cell_rotation: u16,
    pub grid: Vec<GridCell>,
}

/// A mark primitive to be rendered on the marks overlay. One variant per kind,
/// each carrying exactly the parameters it needs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MarkObject {
    Crop {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: f32,
        color: CropMarkColor,
    },
    Registration {
        x: f32,
        y: f32,
        radius: f32,
        crosshair_length: f32,
        line_weight: f32,
    },
    ColorBar {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        cmyk: (f32, f32, f32, f32),
    },
    Fold {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    SlugText {
        x: f32,
        y: f32,
        text: String,
        font_size: f32,
    },
}

/// A named, persisted imposition configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PresetConfig {
    pub name: String,
    pub config: ImpositionConfig,
}

/// Layout + marks for a single sheet, returned by the preview entry point so a
/// collaborator can render a fast, non-PDF preview without assembling pages.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreviewData {
    pub layout: ImpositionLayout,
    pub grid: Vec<GridCell>,
    pub marks: Vec<MarkObject>,
    pub sheet_width_mm: f32,
    pub sheet_height_mm: f32,
    pub effective_trim_w: f32,
    pub effective_trim_h: f32,
    pub page_count: usize,
}

/// Options for the top-level job: input files plus the imposition configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImpositionOptions {
    pub input_files: Vec<PathBuf>,
    pub config: ImpositionConfig,
    pub filename: String,
}

impl Default for ImpositionOptions {
    fn default() -> Self {
        Self {
            input_files: Vec::new(),
            config: ImpositionConfig::default(),
            filename: "document.pdf".to_string(),
        }
    }
}

impl ImpositionOptions {
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_files.is_empty() {
            return Err(ImposeError::InvalidConfig(
                "no input files specified".to_string(),
            ));
        }
        self.config.validate()
    }
}
