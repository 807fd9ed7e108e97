//! End-to-end tests against the public API: analyze a hand-built source document,
//! impose it under a handful of real-world scenarios, and check the resulting
//! sheet count, page geometry and structure without depending on any fixture PDF
//! files on disk.

use lopdf::{Dictionary, Document, Object, Stream};
use pdf_impose::*;

/// Build a source `Document` with `page_count` pages, each `width_pt x height_pt`,
/// with a TrimBox set `trim_margin_pt` inside the MediaBox on every edge.
fn fixture_document(page_count: usize, width_pt: f32, height_pt: f32, trim_margin_pt: f32) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let media_box = vec![
        Object::Real(0.0),
        Object::Real(0.0),
        Object::Real(width_pt),
        Object::Real(height_pt),
    ];
    let trim_box = vec![
        Object::Real(trim_margin_pt),
        Object::Real(trim_margin_pt),
        Object::Real(width_pt - trim_margin_pt),
        Object::Real(height_pt - trim_margin_pt),
    ];

    let mut kids = Vec::with_capacity(page_count);
    for _ in 0..page_count {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set("MediaBox", Object::Array(media_box.clone()));
        page_dict.set("TrimBox", Object::Array(trim_box.clone()));
        page_dict.set("Resources", Object::Dictionary(Dictionary::new()));
        page_dict.set("Contents", Object::Reference(content_id));
        let page_id = doc.add_object(page_dict);
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(page_count as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

fn sra3_business_card_config() -> ImpositionConfig {
    ImpositionConfig {
        mode: ImpositionMode::StepAndRepeat,
        trim_width: 90.0,
        trim_height: 55.0,
        bleed: BleedConfig {
            top: 3.0,
            bottom: 3.0,
            left: 3.0,
            right: 3.0,
            uniform: true,
        },
        sheet: SheetConfig {
            sheet_width: 320.0,
            sheet_height: 450.0,
            orientation: Orientation::Landscape,
            grip_edge: 10.0,
            mark_margin: 8.0,
        },
        ..ImpositionConfig::default()
    }
}

#[test]
fn analyze_reports_trim_box_and_detected_bleed_in_mm() {
    // A4-ish page at 595x842pt with a 10pt trim margin on every edge.
    let doc = fixture_document(1, 595.0, 842.0, 10.0);
    let analysis = analyze_pdf(&doc).unwrap();

    assert_eq!(analysis.page_count, 1);
    let page = &analysis.pages[0];
    assert!(page.trim_box.is_some());
    let trim = page.trim_box.unwrap();
    // 10pt margin means the trim box is narrower/shorter than the media box.
    assert!(trim.width < page.media_box.width);
    assert!(trim.height < page.media_box.height);
}

#[test]
fn analyze_rejects_documents_with_no_pages() {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(Vec::new())),
        ("Count", Object::Integer(0)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let err = analyze_pdf(&doc).unwrap_err();
    assert!(matches!(err, ImposeError::NoPages));
}

/// S1 — business cards on an SRA3 sheet: the preview reports 20-up (4x5) and the
/// right number of sheets for a short run.
#[test]
fn preview_reports_twenty_up_for_business_cards_on_sra3() {
    let config = sra3_business_card_config();
    let preview = generate_preview(&config, 7, "cards.pdf").unwrap();

    assert_eq!(preview.layout.n_up, 20);
    assert_eq!(preview.layout.rows * preview.layout.cols, 20);
    // 7 cards at 20-up, non-duplex step-and-repeat: one sheet per source page.
    assert_eq!(preview.layout.total_sheets, 7);
}

/// Imposing a single-page business-card source under step-and-repeat produces one
/// sheet whose page count matches `n_up`, reusing a single source page.
#[tokio::test]
async fn step_and_repeat_imposes_single_page_onto_one_sheet() {
    let source = fixture_document(1, 255.0, 156.0, 0.0); // ~90x55mm at 72dpi
    let config = sra3_business_card_config();

    let output = impose(&source, &config, "cards.pdf").await.unwrap();
    let page_ids: Vec<_> = output.get_pages().into_values().collect();
    assert_eq!(page_ids.len(), 1);
}

/// S3 — A4 pages cut-and-stack onto an SRA3 sheet: auto-rotate kicks in and the
/// sheet count matches `ceil(page_count / n_up)`.
#[tokio::test]
async fn cut_and_stack_imposes_a4_pages_across_multiple_sheets() {
    let source = fixture_document(5, 595.0, 842.0, 0.0); // A4 in points
    let config = ImpositionConfig {
        mode: ImpositionMode::CutAndStack,
        trim_width: 210.0,
        trim_height: 297.0,
        sheet: SheetConfig {
            sheet_width: 320.0,
            sheet_height: 450.0,
            orientation: Orientation::Landscape,
            grip_edge: 10.0,
            mark_margin: 8.0,
        },
        ..ImpositionConfig::default()
    };
    config.validate().unwrap();

    let preview = generate_preview(&config, 5, "a4.pdf").unwrap();
    assert_eq!(preview.layout.cell_rotation, 90); // rotated to fit 2-up

    let output = impose(&source, &config, "a4.pdf").await.unwrap();
    let page_ids: Vec<_> = output.get_pages().into_values().collect();
    assert_eq!(page_ids.len(), preview.layout.total_sheets);
}

/// S4 — trim larger than the sheet is rejected before any assembly work starts.
#[tokio::test]
async fn imposing_oversized_trim_fails_before_assembly() {
    let source = fixture_document(1, 2000.0, 2000.0, 0.0);
    let config = ImpositionConfig {
        trim_width: 300.0,
        trim_height: 400.0,
        sheet: SheetConfig {
            sheet_width: 210.0,
            sheet_height: 297.0,
            orientation: Orientation::Portrait,
            ..SheetConfig::default()
        },
        ..ImpositionConfig::default()
    };

    let err = impose(&source, &config, "oversized.pdf").await.unwrap_err();
    assert!(matches!(err, ImposeError::TrimExceedsSheet(..)));
}

/// S6 — duplex step-and-repeat produces one front and one mirrored back sheet per
/// pair of source pages, doubling the output page count for a non-duplex run.
#[tokio::test]
async fn duplex_step_and_repeat_produces_front_and_back_sheets() {
    let source = fixture_document(2, 255.0, 156.0, 0.0);
    let mut config = sra3_business_card_config();
    config.duplex = true;
    config.flip_edge = FlipEdge::Long;

    let output = impose(&source, &config, "cards.pdf").await.unwrap();
    let page_ids: Vec<_> = output.get_pages().into_values().collect();
    assert_eq!(page_ids.len(), 2); // one front, one back
}

/// Saddle-stitch booklets pad to a multiple of 4 pages; an 8-page source yields
/// exactly 2 physical sheets (4 sides total across front/back).
#[tokio::test]
async fn saddle_stitch_booklet_imposes_eight_pages_onto_two_sheets() {
    let source = fixture_document(8, 595.0, 842.0, 0.0);
    let config = ImpositionConfig {
        mode: ImpositionMode::BookletSaddleStitch,
        trim_width: 148.0,
        trim_height: 210.0, // A5
        duplex: true,
        sheet: SheetConfig {
            sheet_width: 420.0,
            sheet_height: 297.0,
            orientation: Orientation::Landscape,
            grip_edge: 10.0,
            mark_margin: 8.0,
        },
        ..ImpositionConfig::default()
    };

    let output = impose(&source, &config, "booklet.pdf").await.unwrap();
    let page_ids: Vec<_> = output.get_pages().into_values().collect();
    assert_eq!(page_ids.len(), 4); // 2 sheets x (front + back)
}

#[test]
fn builtin_presets_apply_cleanly_to_a_preview() {
    for (id, preset) in presets::builtin_presets() {
        preset.config.validate().unwrap_or_else(|e| panic!("preset {id} failed validation: {e}"));
        generate_preview(&preset.config, 12, "preset-check.pdf")
            .unwrap_or_else(|e| panic!("preset {id} failed to preview: {e}"));
    }
}

#[tokio::test]
async fn round_trip_save_and_load_preserves_page_count() {
    let source = fixture_document(3, 595.0, 842.0, 0.0);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.pdf");

    save_pdf(source, &path).await.unwrap();
    let reloaded = load_pdf(&path).await.unwrap();
    let analysis = analyze_pdf(&reloaded).unwrap();
    assert_eq!(analysis.page_count, 3);
}
