//! YOLO label directories to a COCO document.
//!
//! [`yolo_to_coco`] walks the image tree, resolves sizes and reads label
//! files; [`build_coco_document`] does the pure assembly from records that
//! are already in memory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::coco::{Annotation, Category, CocoDocument, Image};
use crate::error::{ValidationError, YoloCocoError};
use crate::geom::round_to;
use crate::yolo::{read_class_names, read_label_file, read_sizes_csv, SizeTable, YoloLabelRow};

const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];
const LABEL_EXTENSION: &str = "txt";

/// How `images[].file_name` is derived from an image path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FileNameMode {
    /// The bare file name, e.g. `img001.jpg`.
    #[default]
    Name,
    /// The path relative to the images root, always `/`-separated.
    Relative,
}

/// Box post-processing applied while converting rows to COCO.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxOptions {
    /// Decimal places for `bbox` and `area`; negative disables rounding.
    pub bbox_round: i32,
    /// Clamp boxes to the image extent.
    pub clip_to_image: bool,
}

impl Default for BoxOptions {
    fn default() -> Self {
        Self {
            bbox_round: 2,
            clip_to_image: true,
        }
    }
}

/// Options for [`yolo_to_coco`].
#[derive(Clone, Debug, Default)]
pub struct YoloToCocoOptions {
    /// `classes.txt` or `data.yaml`; class names are synthesized when absent.
    pub classes_path: Option<PathBuf>,
    /// Headerless `filename,width,height` CSV, consulted before probing images.
    pub sizes_csv: Option<PathBuf>,
    pub file_name_mode: FileNameMode,
    pub boxes: BoxOptions,
}

/// An image with its resolved size and label rows.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledImage {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub rows: Vec<YoloLabelRow>,
}

/// Converts a YOLO dataset on disk into a COCO document.
///
/// Images are found recursively under `images_dir` and ordered by their
/// relative path. For each image the label file is looked up at the same
/// relative path under `labels_dir`, falling back to `<stem>.txt` directly
/// under it; an image with no label file has no annotations.
pub fn yolo_to_coco(
    images_dir: &Path,
    labels_dir: &Path,
    opts: &YoloToCocoOptions,
) -> Result<CocoDocument, YoloCocoError> {
    let class_names = opts
        .classes_path
        .as_deref()
        .map(read_class_names)
        .transpose()?;
    let sizes = match &opts.sizes_csv {
        Some(path) => read_sizes_csv(path)?,
        None => SizeTable::new(),
    };

    let mut image_files = collect_image_files(images_dir)?;
    if image_files.is_empty() {
        return Err(YoloCocoError::NoImagesFound {
            path: images_dir.to_path_buf(),
        });
    }
    image_files.sort_by_cached_key(|path| rel_string(images_dir, path));

    let mut labeled = Vec::with_capacity(image_files.len());
    for image_path in &image_files {
        let file_name = match opts.file_name_mode {
            FileNameMode::Name => image_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            FileNameMode::Relative => rel_string(images_dir, image_path),
        };

        let (width, height) = match sizes.get(&file_name) {
            Some(&size) => size,
            None => read_image_dimensions(image_path)?,
        };

        let rows = match find_label_for_image(images_dir, labels_dir, image_path) {
            Some(label_path) => read_label_file(&label_path)?,
            None => Vec::new(),
        };
        log::debug!(
            "{}: {}x{}, {} label row(s)",
            file_name,
            width,
            height,
            rows.len()
        );

        labeled.push(LabeledImage {
            file_name,
            width,
            height,
            rows,
        });
    }

    Ok(build_coco_document(
        &labeled,
        class_names.as_deref(),
        &opts.boxes,
    )?)
}

/// Assembles a COCO document from images whose sizes and rows are known.
///
/// Image and annotation ids are 1-based in input order. With `class_names`,
/// category `i` is `class_names[i]` and YOLO class `i` maps to category id
/// `i`; a class outside the list is an error. Without, one `class_<k>`
/// category is synthesized per class index seen.
pub fn build_coco_document(
    images: &[LabeledImage],
    class_names: Option<&[String]>,
    opts: &BoxOptions,
) -> Result<CocoDocument, ValidationError> {
    let mut doc = CocoDocument::default();
    let mut seen_classes = BTreeSet::new();
    let mut next_annotation_id: u64 = 1;

    for (index, labeled) in images.iter().enumerate() {
        let image_id = (index + 1) as u64;
        doc.images.push(Image::new(
            image_id,
            labeled.file_name.clone(),
            labeled.width,
            labeled.height,
        ));

        for row in &labeled.rows {
            if let Some(names) = class_names {
                if row.class_id >= names.len() {
                    return Err(ValidationError::ClassOutOfRange {
                        file_name: labeled.file_name.clone(),
                        class_id: row.class_id,
                        class_count: names.len(),
                    });
                }
            }
            seen_classes.insert(row.class_id);

            doc.annotations.push(row_to_annotation(
                row,
                next_annotation_id,
                image_id,
                labeled.width,
                labeled.height,
                opts,
            ));
            next_annotation_id += 1;
        }
    }

    doc.categories = match class_names {
        Some(names) => names
            .iter()
            .enumerate()
            .map(|(i, name)| Category::new(i as u64, name.clone()))
            .collect(),
        None => seen_classes
            .into_iter()
            .map(|k| Category::new(k as u64, format!("class_{k}")))
            .collect(),
    };

    Ok(doc)
}

fn row_to_annotation(
    row: &YoloLabelRow,
    id: u64,
    image_id: u64,
    width: u32,
    height: u32,
    opts: &BoxOptions,
) -> Annotation {
    let (w_px, h_px) = (width as f64, height as f64);
    let mut bbox = row.bbox().to_pixel(w_px, h_px);
    if opts.clip_to_image {
        bbox = bbox.clip_to_image(w_px, h_px);
    }
    let (x, y, w, h) = bbox.to_xywh();
    let digits = opts.bbox_round;

    let mut ann = Annotation::new(
        id,
        image_id,
        row.class_id as u64,
        [
            round_to(x, digits),
            round_to(y, digits),
            round_to(w, digits),
            round_to(h, digits),
        ],
    )
    .with_area(round_to(w * h, digits))
    .with_iscrowd(0);
    ann.score = row.confidence;
    ann.extra
        .insert("segmentation".to_string(), Value::Array(Vec::new()));
    ann
}

fn collect_image_files(root: &Path) -> Result<Vec<PathBuf>, YoloCocoError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| {
            YoloCocoError::Io(source.into_io_error().unwrap_or_else(|| {
                std::io::Error::other(format!(
                    "failed while traversing directory {}",
                    root.display()
                ))
            }))
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), &IMAGE_EXTENSIONS) {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

fn read_image_dimensions(path: &Path) -> Result<(u32, u32), YoloCocoError> {
    let size = imagesize::size(path).map_err(|source| YoloCocoError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    match (u32::try_from(size.width), u32::try_from(size.height)) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(YoloCocoError::ImageTooLarge {
            path: path.to_path_buf(),
            width: size.width,
            height: size.height,
        }),
    }
}

fn find_label_for_image(images_dir: &Path, labels_dir: &Path, image_path: &Path) -> Option<PathBuf> {
    let mirrored = image_path
        .strip_prefix(images_dir)
        .ok()
        .map(|rel| labels_dir.join(rel).with_extension(LABEL_EXTENSION));
    if let Some(candidate) = mirrored.filter(|p| p.is_file()) {
        return Some(candidate);
    }

    let stem = image_path.file_stem()?.to_string_lossy();
    let flat = labels_dir.join(format!("{stem}.{LABEL_EXTENSION}"));
    flat.is_file().then_some(flat)
}

fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
