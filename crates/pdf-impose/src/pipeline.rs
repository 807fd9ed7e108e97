//! Pipeline Orchestrator: analyze -> plan -> (grid -> bleed -> position -> marks
//! -> assemble) per sheet, driven per mode until every source page is placed.

use crate::analyzer::analyze_pdf;
use crate::assemble::{assemble_sheet, create_helvetica_font};
use crate::bleed::calculate_per_cell_bleed;
use crate::duplex::create_duplex_back;
use crate::layout::{planned_total_sheets, plan_layout, saddle_stitch_sheets, PlannedLayout};
use crate::marks::place_all_marks;
use crate::position::calculate_cell_positions;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

/// Run one imposition job end to end. The core is synchronous and CPU-bound, so
/// the actual work is offloaded to a blocking thread.
pub async fn impose(source: &Document, config: &ImpositionConfig, filename: &str) -> Result<Document> {
    config.validate()?;
    let source = source.clone();
    let config = config.clone();
    let filename = filename.to_string();
    tokio::task::spawn_blocking(move || impose_sync(&source, &config, &filename)).await?
}

fn impose_sync(source: &Document, config: &ImpositionConfig, filename: &str) -> Result<Document> {
    let analysis = analyze_pdf(source)?;
    let page_count = analysis.page_count;

    // A zero trim dimension means "derive it from the first source page".
    let mut effective_config = config.clone();
    if effective_config.trim_width == 0.0 || effective_config.trim_height == 0.0 {
        if let Some(first) = analysis.pages.first() {
            let fallback = first.trim_box.unwrap_or(first.media_box);
            effective_config.trim_width = fallback.width;
            effective_config.trim_height = fallback.height;
        }
    }

    let planned = plan_layout(&effective_config, page_count)?;
    let total_sheets = planned_total_sheets(
        effective_config.mode,
        page_count,
        planned.n_up,
        effective_config.duplex,
    );

    let source_page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();

    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();
    let helvetica_font_id = create_helvetica_font(&mut output);
    let mut xobj_cache: HashMap<ObjectId, ObjectId> = HashMap::new();
    let mut page_refs: Vec<ObjectId> = Vec::new();

    let mut ctx = Ctx {
        output: &mut output,
        source,
        source_page_ids: &source_page_ids,
        config: &effective_config,
        filename,
        pages_tree_id,
        helvetica_font_id,
        xobj_cache: &mut xobj_cache,
        page_refs: &mut page_refs,
    };

    match effective_config.mode {
        ImpositionMode::StepAndRepeat => build_step_and_repeat(&mut ctx, &planned, page_count, total_sheets)?,
        ImpositionMode::BookletSaddleStitch => build_saddle_stitch(&mut ctx, &planned, page_count)?,
        ImpositionMode::CutAndStack | ImpositionMode::BookletPerfectBind => {
            build_sequential(&mut ctx, &planned, page_count, total_sheets)?
        }
    }

    finish_document(&mut output, pages_tree_id, page_refs, filename);
    Ok(output)
}

/// Bundles everything a builder needs so per-mode functions don't carry a dozen
/// positional arguments.
struct Ctx<'a> {
    output: &'a mut Document,
    source: &'a Document,
    source_page_ids: &'a [ObjectId],
    config: &'a ImpositionConfig,
    filename: &'a str,
    pages_tree_id: ObjectId,
    helvetica_font_id: ObjectId,
    xobj_cache: &'a mut HashMap<ObjectId, ObjectId>,
    page_refs: &'a mut Vec<ObjectId>,
}

impl Ctx<'_> {
    /// Resolve bleed and positions for a freshly built grid, then assemble it.
    /// Not for grids [`create_duplex_back`] already resolved — use
    /// [`Ctx::assemble_resolved`] for those, or bleed/position get recomputed twice.
    fn resolve_and_assemble(
        &mut self,
        mut grid: Vec<GridCell>,
        rows: usize,
        cols: usize,
        eff_trim_w: f32,
        eff_trim_h: f32,
        sheet_num: usize,
        total_sheets: usize,
    ) -> Result<()> {
        calculate_per_cell_bleed(&mut grid, rows, cols, &self.config.bleed, self.config.gap_between_items);
        calculate_cell_positions(
            &mut grid,
            rows,
            cols,
            &self.config.sheet,
            &self.config.bleed,
            self.config.gap_between_items,
            eff_trim_w,
            eff_trim_h,
        );
        self.assemble_resolved(&grid, cols, eff_trim_w, eff_trim_h, sheet_num, total_sheets)
    }

    /// Place marks and assemble a grid whose bleed/positions are already resolved.
    fn assemble_resolved(
        &mut self,
        grid: &[GridCell],
        cols: usize,
        eff_trim_w: f32,
        eff_trim_h: f32,
        sheet_num: usize,
        total_sheets: usize,
    ) -> Result<()> {
        let marks = place_all_marks(
            &grid,
            cols,
            &self.config.marks,
            &self.config.sheet,
            eff_trim_w,
            eff_trim_h,
            self.filename,
            sheet_num,
            total_sheets,
        );
        let page_id = assemble_sheet(
            self.output,
            self.source,
            self.source_page_ids,
            &grid,
            &marks,
            &self.config.sheet,
            eff_trim_w,
            eff_trim_h,
            self.pages_tree_id,
            self.helvetica_font_id,
            self.xobj_cache,
        )?;
        self.page_refs.push(page_id);
        Ok(())
    }
}

/// Every output page has one imposed source page repeated across the whole grid.
/// With duplex, the back takes the very next source page, uniformly across its grid too.
fn build_step_and_repeat(ctx: &mut Ctx, planned: &PlannedLayout, page_count: usize, total_sheets: usize) -> Result<()> {
    let (rows, cols) = (planned.rows, planned.cols);
    let mut page_idx = 0usize;
    let mut sheet_num = 0usize;

    while page_idx < page_count {
        sheet_num += 1;

        let front_grid = uniform_grid(rows, cols, Some(page_idx), planned.cell_rotation);
        ctx.resolve_and_assemble(
            front_grid,
            rows,
            cols,
            planned.effective_trim_w,
            planned.effective_trim_h,
            sheet_num,
            total_sheets,
        )?;
        page_idx += 1;

        if ctx.config.duplex {
            let back_page_idx = if page_idx < page_count { Some(page_idx) } else { None };
            let back_grid = uniform_grid(rows, cols, back_page_idx, planned.cell_rotation);
            let back_grid = create_duplex_back(
                &back_grid,
                rows,
                cols,
                ctx.config,
                planned.effective_trim_w,
                planned.effective_trim_h,
            );
            ctx.assemble_resolved(
                &back_grid,
                cols,
                planned.effective_trim_w,
                planned.effective_trim_h,
                sheet_num,
                total_sheets,
            )?;
            if back_page_idx.is_some() {
                page_idx += 1;
            }
        }
    }
    Ok(())
}

/// Cut-and-stack / perfect-bind: each sheet's cells get consecutive source pages,
/// row-major, advancing a running cursor shared across front and back.
fn build_sequential(ctx: &mut Ctx, planned: &PlannedLayout, page_count: usize, total_sheets: usize) -> Result<()> {
    let (rows, cols) = (planned.rows, planned.cols);
    let mut page_cursor = 0usize;
    let mut sheet_num = 0usize;

    while page_cursor < page_count {
        sheet_num += 1;

        let front_grid = sequential_grid(rows, cols, planned.cell_rotation, &mut page_cursor, page_count);
        ctx.resolve_and_assemble(
            front_grid,
            rows,
            cols,
            planned.effective_trim_w,
            planned.effective_trim_h,
            sheet_num,
            total_sheets,
        )?;

        if ctx.config.duplex {
            let back_grid = sequential_grid(rows, cols, planned.cell_rotation, &mut page_cursor, page_count);
            let back_grid = create_duplex_back(
                &back_grid,
                rows,
                cols,
                ctx.config,
                planned.effective_trim_w,
                planned.effective_trim_h,
            );
            ctx.assemble_resolved(
                &back_grid,
                cols,
                planned.effective_trim_w,
                planned.effective_trim_h,
                sheet_num,
                total_sheets,
            )?;
        }
    }
    Ok(())
}

/// Saddle-stitch: signatures come from [`saddle_stitch_sheets`], always exactly
/// 2 pages per side; the back side only ever mirrors column, never rotation,
/// regardless of the configured `flip_edge` — that knob only applies to the
/// other modes' duplex mirroring.
fn build_saddle_stitch(ctx: &mut Ctx, planned: &PlannedLayout, page_count: usize) -> Result<()> {
    let (rows, cols) = (planned.rows, planned.cols);
    let sheets = saddle_stitch_sheets(page_count);
    let total_sheets = sheets.len();

    for (i, sheet) in sheets.into_iter().enumerate() {
        let sheet_num = i + 1;

        let front_grid = row_major_grid(sheet.front, cols, planned.cell_rotation);
        ctx.resolve_and_assemble(
            front_grid,
            rows,
            cols,
            planned.effective_trim_w,
            planned.effective_trim_h,
            sheet_num,
            total_sheets,
        )?;

        let mut back_grid = row_major_grid(sheet.back, cols, planned.cell_rotation);
        for cell in back_grid.iter_mut() {
            cell.col = (cols.max(1) - 1) - cell.col;
        }
        ctx.resolve_and_assemble(
            back_grid,
            rows,
            cols,
            planned.effective_trim_w,
            planned.effective_trim_h,
            sheet_num,
            total_sheets,
        )?;
    }
    Ok(())
}

fn uniform_grid(rows: usize, cols: usize, page_index: Option<usize>, rotation: u16) -> Vec<GridCell> {
    let mut grid = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            grid.push(GridCell::new(r, c, page_index, rotation));
        }
    }
    grid
}

fn sequential_grid(
    rows: usize,
    cols: usize,
    rotation: u16,
    cursor: &mut usize,
    page_count: usize,
) -> Vec<GridCell> {
    let mut grid = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let page_index = if *cursor < page_count {
                let idx = *cursor;
                *cursor += 1;
                Some(idx)
            } else {
                None
            };
            grid.push(GridCell::new(r, c, page_index, rotation));
        }
    }
    grid
}

fn row_major_grid(slots: [Option<usize>; 2], cols: usize, rotation: u16) -> Vec<GridCell> {
    let cols = cols.max(1);
    slots
        .into_iter()
        .enumerate()
        .map(|(i, page_index)| GridCell::new(i / cols, i % cols, page_index, rotation))
        .collect()
}

fn finish_document(output: &mut Document, pages_tree_id: ObjectId, page_refs: Vec<ObjectId>, filename: &str) {
    let count = page_refs.len() as i64;
    let kids: Vec<Object> = page_refs.into_iter().map(Object::Reference).collect();
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(count)),
    ]);
    output.objects.insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    let info_id = output.add_object(Dictionary::from_iter(vec![
        ("Title", Object::string_literal(format!("Imposed Output - {filename}"))),
        ("Creator", Object::string_literal("Print Imposition System")),
        (
            "CreationDate",
            Object::string_literal(chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string()),
        ),
    ]));
    output.trailer.set("Info", Object::Reference(info_id));
}
