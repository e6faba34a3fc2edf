//! yolococo: YOLO ⇄ COCO annotation conversion and COCO dataset merging.
//!
//! The library is usable on its own; the `yolococo` binary is a thin clap
//! front-end over the same functions.
//!
//! # Modules
//!
//! - [`coco`]: COCO record types, JSON I/O and integrity checks
//! - [`yolo`]: YOLO label rows, class name files and size overrides
//! - [`convert`]: YOLO → COCO and COCO → YOLO converters
//! - [`merge`]: Merging several COCO documents with id reconciliation
//! - [`geom`]: Typed bounding boxes in pixel and normalized space
//! - [`error`]: Error types for yolococo operations

pub mod coco;
pub mod convert;
pub mod error;
pub mod geom;
pub mod merge;
pub mod yolo;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use error::{ValidationError, YoloCocoError};

/// The yolococo CLI application.
#[derive(Parser)]
#[command(name = "yolococo")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert a YOLO label directory to a COCO JSON file.
    Yolo2coco(Yolo2CocoArgs),
    /// Convert a COCO JSON file to YOLO label files.
    Coco2yolo(Coco2YoloArgs),
    /// Merge several COCO JSON files into one.
    Merge(MergeArgs),
}

#[derive(clap::Args)]
struct Yolo2CocoArgs {
    /// Directory containing the images (searched recursively).
    #[arg(long)]
    images: PathBuf,

    /// Directory containing the YOLO .txt label files.
    #[arg(long)]
    labels: PathBuf,

    /// classes.txt, or an Ultralytics data.yaml.
    #[arg(long)]
    classes: Option<PathBuf>,

    /// CSV of `file_name,width,height` rows overriding probed image sizes.
    #[arg(long)]
    sizes: Option<PathBuf>,

    /// Decimal places for bbox/area values; negative disables rounding.
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    bbox_round: i32,

    /// How image file names are written to the COCO document.
    #[arg(long, value_enum, default_value_t = FileNameModeArg::Name)]
    file_name_mode: FileNameModeArg,

    /// Keep boxes that extend past the image instead of clipping them.
    #[arg(long)]
    no_clip: bool,

    /// Output COCO JSON file.
    #[arg(long)]
    out: PathBuf,
}

#[derive(clap::Args)]
struct Coco2YoloArgs {
    /// Input COCO JSON file.
    #[arg(long)]
    coco: PathBuf,

    /// Directory to write YOLO .txt label files into.
    #[arg(long)]
    out_labels: PathBuf,

    /// Output classes file (classes.txt, or data.yaml for Ultralytics).
    #[arg(long)]
    out_classes: PathBuf,

    /// Use COCO category ids as YOLO class indices instead of 0..K-1.
    #[arg(long)]
    keep_category_ids: bool,

    /// Don't write label files for images without annotations.
    #[arg(long)]
    skip_empty_labels: bool,
}

#[derive(clap::Args)]
struct MergeArgs {
    /// COCO JSON files to merge, in order.
    #[arg(long, num_args = 1.., required = true)]
    inputs: Vec<PathBuf>,

    /// Output COCO JSON file.
    #[arg(long)]
    out: PathBuf,

    /// How to prefix image file names per input.
    #[arg(long, value_enum, default_value_t = PrefixModeArg::None)]
    prefix_mode: PrefixModeArg,

    /// One prefix per input, used with `--prefix-mode custom`.
    #[arg(long, num_args = 1..)]
    custom_prefixes: Vec<String>,

    /// Merge categories by name instead of by id.
    #[arg(long)]
    align_by_name: bool,

    /// Keep only the first image for each file name.
    #[arg(long)]
    drop_duplicate_filenames: bool,
}

/// File name mode as accepted on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FileNameModeArg {
    /// Base file name only.
    Name,
    /// Path relative to the images directory.
    Relative,
}

impl From<FileNameModeArg> for convert::FileNameMode {
    fn from(value: FileNameModeArg) -> Self {
        match value {
            FileNameModeArg::Name => convert::FileNameMode::Name,
            FileNameModeArg::Relative => convert::FileNameMode::Relative,
        }
    }
}

/// Prefix mode as accepted on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PrefixModeArg {
    None,
    /// `<input file stem>_`
    Basename,
    /// Values of `--custom-prefixes`.
    Custom,
}

/// Run the yolococo CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), YoloCocoError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Yolo2coco(args)) => run_yolo2coco(args),
        Some(Commands::Coco2yolo(args)) => run_coco2yolo(args),
        Some(Commands::Merge(args)) => run_merge(args),
        None => {
            println!("yolococo {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("YOLO <-> COCO annotation conversion and COCO dataset merging.");
            println!();
            println!("Run 'yolococo --help' for usage information.");
            Ok(())
        }
    }
}

fn run_yolo2coco(args: Yolo2CocoArgs) -> Result<(), YoloCocoError> {
    let opts = convert::YoloToCocoOptions {
        classes_path: args.classes,
        sizes_csv: args.sizes,
        file_name_mode: args.file_name_mode.into(),
        boxes: convert::BoxOptions {
            bbox_round: args.bbox_round,
            clip_to_image: !args.no_clip,
        },
    };

    let doc = convert::yolo_to_coco(&args.images, &args.labels, &opts)?;
    coco::write_coco_json(&args.out, &doc)?;

    println!(
        "Wrote {} ({} images, {} annotations, {} categories)",
        args.out.display(),
        doc.images.len(),
        doc.annotations.len(),
        doc.categories.len()
    );
    Ok(())
}

fn run_coco2yolo(args: Coco2YoloArgs) -> Result<(), YoloCocoError> {
    let doc = coco::read_coco_json(&args.coco)?;
    let name = args.coco.display().to_string();
    let opts = convert::CocoToYoloOptions {
        keep_category_ids: args.keep_category_ids,
        skip_empty_labels: args.skip_empty_labels,
    };

    let summary = convert::coco_to_yolo(&doc, &name, &args.out_labels, &args.out_classes, &opts)?;

    println!(
        "Wrote {} label files ({} rows) to {}",
        summary.label_files,
        summary.rows,
        args.out_labels.display()
    );
    println!("Wrote {}", args.out_classes.display());
    if summary.skipped_crowd > 0 {
        println!("Skipped {} crowd annotations", summary.skipped_crowd);
    }
    Ok(())
}

fn run_merge(args: MergeArgs) -> Result<(), YoloCocoError> {
    let prefix_mode = match args.prefix_mode {
        PrefixModeArg::None => merge::PrefixMode::None,
        PrefixModeArg::Basename => merge::PrefixMode::Basename,
        PrefixModeArg::Custom => merge::PrefixMode::Custom(args.custom_prefixes),
    };
    let opts = merge::MergeOptions {
        prefix_mode,
        align_by_name: args.align_by_name,
        drop_duplicate_filenames: args.drop_duplicate_filenames,
    };
    opts.prefix_mode.check_input_count(args.inputs.len())?;

    let inputs = args
        .inputs
        .iter()
        .map(|path| merge::MergeInput::from_path(path))
        .collect::<Result<Vec<_>, _>>()?;

    let merged = merge::merge(&inputs, &opts)?;
    coco::write_coco_json(&args.out, &merged)?;

    println!("Merged {} datasets -> {}", inputs.len(), args.out.display());
    println!(
        "Images: {} | Annotations: {} | Categories: {}",
        merged.images.len(),
        merged.annotations.len(),
        merged.categories.len()
    );
    Ok(())
}
