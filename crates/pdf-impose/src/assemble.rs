//! Sheet Assembler: places each grid cell's source page as a clipped Form
//! XObject, then composites the marks overlay as one more Form XObject on top.

use crate::constants::mm_to_pt;
use crate::render::{create_page_xobject, get_page_trim_or_media_pt, render_marks_overlay_stream};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Build one output page for `grid`, clip-placing every populated cell's source
/// page and the rendered marks overlay, and link it under `parent_pages_id`.
/// `helvetica_font_id` is only referenced (and only needs to exist) when `marks`
/// contains a `SlugText`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn assemble_sheet(
    output: &mut Document,
    source: &Document,
    source_page_ids: &[ObjectId],
    grid: &[GridCell],
    marks: &[MarkObject],
    sheet: &SheetConfig,
    eff_trim_w: f32,
    eff_trim_h: f32,
    parent_pages_id: ObjectId,
    helvetica_font_id: ObjectId,
    xobj_cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let (sheet_w, sheet_h) = sheet.oriented_dimensions();
    let sheet_w_pt = mm_to_pt(sheet_w);
    let sheet_h_pt = mm_to_pt(sheet_h);
    let target_trim_w_pt = mm_to_pt(eff_trim_w);
    let target_trim_h_pt = mm_to_pt(eff_trim_h);

    let mut content_ops = String::new();
    let mut xobjects = Dictionary::new();
    let mut xobj_names: HashMap<ObjectId, String> = HashMap::new();

    for cell in grid {
        let Some(page_index) = cell.page_index else {
            continue;
        };
        let Some(&source_page_id) = source_page_ids.get(page_index) else {
            continue;
        };

        let xobj_id = create_page_xobject(output, source, source_page_id, xobj_cache)?;
        let xobj_name = xobj_names.entry(xobj_id).or_insert_with(|| {
            let name = format!("P{}", xobj_names.len());
            xobjects.set(name.as_bytes(), Object::Reference(xobj_id));
            name
        });

        let (src_trim_x, src_trim_y, src_trim_w, src_trim_h) =
            get_page_trim_or_media_pt(source, source_page_id);

        let target_x = mm_to_pt(cell.trim_origin_x);
        let target_y = mm_to_pt(cell.trim_origin_y);

        let clip_x = mm_to_pt(cell.clip_rect.x);
        let clip_y = mm_to_pt(cell.clip_rect.y);
        let clip_w = mm_to_pt(cell.clip_rect.width);
        let clip_h = mm_to_pt(cell.clip_rect.height);

        let matrix = match cell.rotation {
            90 => {
                let tx = target_x + src_trim_y + target_trim_w_pt;
                let ty = target_y - src_trim_x;
                format!("0 1 -1 0 {tx:.4} {ty:.4}")
            }
            180 => {
                let tx = target_x + src_trim_x + src_trim_w;
                let ty = target_y + src_trim_y + src_trim_h;
                format!("-1 0 0 -1 {tx:.4} {ty:.4}")
            }
            270 => {
                let tx = target_x - src_trim_y;
                let ty = target_y + src_trim_x + target_trim_h_pt;
                format!("0 -1 1 0 {tx:.4} {ty:.4}")
            }
            _ => {
                let tx = target_x - src_trim_x;
                let ty = target_y - src_trim_y;
                format!("1 0 0 1 {tx:.4} {ty:.4}")
            }
        };

        content_ops.push_str(&format!(
            "q\n{clip_x:.4} {clip_y:.4} {clip_w:.4} {clip_h:.4} re W n\n{matrix} cm\n/{xobj_name} Do\nQ\n"
        ));
    }

    let (marks_ops, needs_font) = render_marks_overlay_stream(marks);
    if !marks_ops.is_empty() {
        let marks_doc = build_marks_document(sheet_w_pt, sheet_h_pt, &marks_ops);
        let marks_page_id = marks_doc
            .get_pages()
            .into_values()
            .next()
            .ok_or_else(|| ImposeError::AssemblyFailure("marks overlay produced no page".into()))?;
        let marks_xobj_id = create_page_xobject(output, &marks_doc, marks_page_id, xobj_cache)?;
        xobjects.set("Marks", Object::Reference(marks_xobj_id));
        content_ops.push_str("q\n/Marks Do\nQ\n");
    }

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));
    if needs_font {
        let mut fonts = Dictionary::new();
        fonts.set("F1", Object::Reference(helvetica_font_id));
        resources.set("Font", Object::Dictionary(fonts));
    }

    let content_id = output.add_object(Stream::new(Dictionary::new(), content_ops.into_bytes()));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(sheet_w_pt),
            Object::Real(sheet_h_pt),
        ]),
    );
    page_dict.set("Resources", Object::Dictionary(resources));
    page_dict.set("Contents", Object::Reference(content_id));

    Ok(output.add_object(page_dict))
}

/// Build a Helvetica Type1 font dictionary, shared across every sheet that needs
/// slug text rather than re-created per page.
pub(crate) fn create_helvetica_font(output: &mut Document) -> ObjectId {
    let mut font_dict = Dictionary::new();
    font_dict.set("Type", Object::Name(b"Font".to_vec()));
    font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
    font_dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    output.add_object(font_dict)
}

/// Wrap a rendered content stream into its own single-page document, so it can
/// be imported as a Form XObject through the same path as any source page.
fn build_marks_document(width_pt: f32, height_pt: f32, content_ops: &[u8]) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let content_id = doc.add_object(Stream::new(Dictionary::new(), content_ops.to_vec()));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width_pt),
            Object::Real(height_pt),
        ]),
    );
    page_dict.set("Resources", Object::Dictionary(Dictionary::new()));
    page_dict.set("Contents", Object::Reference(content_id));
    let page_id = doc.add_object(page_dict);

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}
