use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pdf_impose::{
    BleedConfig, FlipEdge, ImpositionConfig, ImpositionMode, MarkConfig, Orientation, SheetConfig,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfimpose", about = "Print imposition CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Impose a source PDF onto press sheets
    Impose {
        /// Source PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file; omitted with --stats-only
        #[arg(short, long, required_unless_present = "stats_only")]
        output: Option<PathBuf>,

        /// Use a built-in preset as the starting config; explicit flags below override it
        #[arg(long)]
        preset: Option<String>,

        #[arg(long, value_enum, default_value = "step-and-repeat")]
        mode: ModeArg,

        /// Trim width, mm. 0 derives it from the source's first page.
        #[arg(long, default_value = "0.0")]
        trim_width: f32,
        /// Trim height, mm. 0 derives it from the source's first page.
        #[arg(long, default_value = "0.0")]
        trim_height: f32,

        /// Uniform bleed on all four edges, mm.
        #[arg(long, default_value = "3.0")]
        bleed: f32,

        #[arg(long, default_value = "488.0")]
        sheet_width: f32,
        #[arg(long, default_value = "330.0")]
        sheet_height: f32,
        #[arg(long, value_enum, default_value = "landscape")]
        orientation: OrientationArg,
        #[arg(long, default_value = "10.0")]
        grip_edge: f32,
        #[arg(long, default_value = "8.0")]
        mark_margin: f32,

        /// Gap between grid cells, mm. 0 means cells share trim edges (tight packing).
        #[arg(long, default_value = "0.0")]
        gap: f32,

        /// Produce a mirrored back side for every front sheet.
        #[arg(long)]
        duplex: bool,
        #[arg(long, value_enum, default_value = "long")]
        flip_edge: FlipEdgeArg,

        /// Prefer whichever of the two trim orientations fits more items per sheet.
        #[arg(long, default_value = "true")]
        auto_rotate: bool,

        #[arg(long)]
        no_crop_marks: bool,
        #[arg(long)]
        no_registration_marks: bool,
        #[arg(long)]
        no_color_bars: bool,
        #[arg(long)]
        no_fold_marks: bool,
        #[arg(long)]
        no_slug_info: bool,

        /// Print the computed layout and exit without assembling any output pages.
        #[arg(long)]
        stats_only: bool,
    },

    /// List or inspect the built-in presets
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand)]
enum PresetAction {
    /// List every built-in preset id and name
    List,
    /// Print one built-in preset's full configuration
    Show {
        /// Preset id, e.g. business_card_sra3
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    StepAndRepeat,
    SaddleStitch,
    PerfectBind,
    CutAndStack,
}

impl From<ModeArg> for ImpositionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::StepAndRepeat => Self::StepAndRepeat,
            ModeArg::SaddleStitch => Self::BookletSaddleStitch,
            ModeArg::PerfectBind => Self::BookletPerfectBind,
            ModeArg::CutAndStack => Self::CutAndStack,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Landscape,
    Portrait,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Landscape => Self::Landscape,
            OrientationArg::Portrait => Self::Portrait,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FlipEdgeArg {
    Long,
    Short,
}

impl From<FlipEdgeArg> for FlipEdge {
    fn from(arg: FlipEdgeArg) -> Self {
        match arg {
            FlipEdgeArg::Long => Self::Long,
            FlipEdgeArg::Short => Self::Short,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Impose { .. } => run_impose(cli.command).await,
        Commands::Presets { action } => run_presets(action),
    };

    if let Err(err) = &result {
        log::error!("{err}");
    }
    result
}

async fn run_impose(command: Commands) -> Result<()> {
    let Commands::Impose {
        input,
        output,
        preset,
        mode,
        trim_width,
        trim_height,
        bleed,
        sheet_width,
        sheet_height,
        orientation,
        grip_edge,
        mark_margin,
        gap,
        duplex,
        flip_edge,
        auto_rotate,
        no_crop_marks,
        no_registration_marks,
        no_color_bars,
        no_fold_marks,
        no_slug_info,
        stats_only,
    } = command
    else {
        unreachable!("run_impose only ever receives Commands::Impose");
    };

    let mut config = match &preset {
        Some(id) => pdf_impose::presets::builtin_preset(id)
            .with_context(|| format!("unknown preset id: {id}"))?
            .config,
        None => ImpositionConfig::default(),
    };

    config.mode = mode.into();
    if preset.is_none() || trim_width != 0.0 {
        config.trim_width = trim_width;
    }
    if preset.is_none() || trim_height != 0.0 {
        config.trim_height = trim_height;
    }
    config.bleed = BleedConfig {
        top: bleed,
        bottom: bleed,
        left: bleed,
        right: bleed,
        uniform: true,
    };
    config.sheet = SheetConfig {
        sheet_width,
        sheet_height,
        orientation: orientation.into(),
        grip_edge,
        mark_margin,
    };
    config.gap_between_items = gap;
    config.duplex = duplex;
    config.flip_edge = flip_edge.into();
    config.auto_rotate = auto_rotate;
    config.marks = MarkConfig {
        crop_marks_enabled: !no_crop_marks,
        registration_marks_enabled: !no_registration_marks,
        color_bars_enabled: !no_color_bars,
        fold_marks_enabled: !no_fold_marks,
        slug_info_enabled: !no_slug_info,
        ..MarkConfig::default()
    };
    config.validate()?;

    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());

    let source = pdf_impose::load_pdf(&input).await?;
    let analysis = pdf_impose::analyze_pdf(&source)?;
    for warning in &analysis.warnings {
        log::warn!("{warning}");
    }

    let preview = pdf_impose::generate_preview(&config, analysis.page_count, &filename)?;
    println!("Imposition layout:");
    println!("  Source pages: {}", analysis.page_count);
    println!(
        "  Grid: {} cols x {} rows ({} per sheet, rotation {}deg)",
        preview.layout.cols, preview.layout.rows, preview.layout.n_up, preview.layout.cell_rotation
    );
    println!("  Total sheets: {}", preview.layout.total_sheets);
    println!(
        "  Effective trim: {:.1} x {:.1} mm",
        preview.effective_trim_w, preview.effective_trim_h
    );

    if stats_only {
        return Ok(());
    }

    let output = output.expect("clap enforces output is present unless stats_only");
    log::info!(
        "imposing {} ({} pages) in {:?} mode -> {}",
        filename,
        analysis.page_count,
        config.mode,
        output.display()
    );
    let imposed = pdf_impose::impose(&source, &config, &filename).await?;
    pdf_impose::save_pdf(imposed, &output).await?;
    log::info!("wrote {}", output.display());
    println!("Imposed -> {}", output.display());

    Ok(())
}

fn run_presets(action: PresetAction) -> Result<()> {
    match action {
        PresetAction::List => {
            for (id, preset) in pdf_impose::presets::builtin_presets() {
                println!("{id:24} {}", preset.name);
            }
        }
        PresetAction::Show { id } => {
            let preset = pdf_impose::presets::builtin_preset(&id)
                .with_context(|| format!("unknown preset id: {id}"))?;
            println!("{}: {}", id, preset.name);
            println!("{:#?}", preset.config);
        }
    }
    Ok(())
}
