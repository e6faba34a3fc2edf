//! A COCO document to YOLO label files plus a class list.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::coco::{check_integrity, Annotation, Category, CategoryId, CocoDocument, ImageId};
use crate::error::{ValidationError, YoloCocoError};
use crate::yolo::{write_class_names, YoloLabelRow};

const LABEL_EXTENSION: &str = "txt";

/// Upper bound on category ids used verbatim as class indices.
const MAX_KEPT_CATEGORY_ID: u64 = 1_000_000;

/// Options for [`coco_to_yolo`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CocoToYoloOptions {
    /// Write COCO category ids as class indices instead of a dense 0..K-1 remap.
    pub keep_category_ids: bool,
    /// Write no label file for images without annotations.
    pub skip_empty_labels: bool,
}

/// Label rows for one image, to be written as `<stem>.txt`.
#[derive(Clone, Debug, PartialEq)]
pub struct YoloLabelFile {
    pub stem: String,
    pub rows: Vec<YoloLabelRow>,
}

/// Everything [`coco_to_yolo`] writes, computed without touching disk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct YoloExport {
    pub label_files: Vec<YoloLabelFile>,
    /// Entry `i` names YOLO class `i`.
    pub class_names: Vec<String>,
    /// Crowd annotations (`iscrowd == 1`) left out of the labels.
    pub skipped_crowd: usize,
}

/// What [`coco_to_yolo`] wrote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct YoloWriteSummary {
    pub label_files: usize,
    pub rows: usize,
    pub skipped_crowd: usize,
}

/// Converts `doc` to YOLO, writing one label file per image into
/// `out_labels_dir` and the class list to `out_classes_path`.
///
/// `name` identifies the document in error messages.
pub fn coco_to_yolo(
    doc: &CocoDocument,
    name: &str,
    out_labels_dir: &Path,
    out_classes_path: &Path,
    opts: &CocoToYoloOptions,
) -> Result<YoloWriteSummary, YoloCocoError> {
    let export = plan_yolo_export(doc, name, opts)?;

    fs::create_dir_all(out_labels_dir).map_err(YoloCocoError::Io)?;

    let mut rows = 0;
    for file in &export.label_files {
        let path: PathBuf = out_labels_dir.join(format!("{}.{LABEL_EXTENSION}", file.stem));
        let mut writer = BufWriter::new(fs::File::create(&path).map_err(YoloCocoError::Io)?);
        for row in &file.rows {
            writeln!(writer, "{}", row.to_line()).map_err(YoloCocoError::Io)?;
        }
        writer.flush().map_err(YoloCocoError::Io)?;
        rows += file.rows.len();
    }

    write_class_names(out_classes_path, &export.class_names)?;

    Ok(YoloWriteSummary {
        label_files: export.label_files.len(),
        rows,
        skipped_crowd: export.skipped_crowd,
    })
}

/// Computes the label files and class list for `doc`.
///
/// A document without categories gets `category_<id>` for every category id
/// its annotations use. The document must otherwise be structurally valid,
/// every image must have a positive size, and crowd annotations are
/// skipped. Label files follow image order, rows follow annotation order.
pub fn plan_yolo_export(
    doc: &CocoDocument,
    name: &str,
    opts: &CocoToYoloOptions,
) -> Result<YoloExport, ValidationError> {
    if doc.images.is_empty() {
        return Err(ValidationError::NoImages {
            document: name.to_string(),
        });
    }

    let doc = with_synthesized_categories(doc);
    check_integrity(&doc, name)?;

    let (class_index, class_names) = if opts.keep_category_ids {
        sparse_class_map(&doc.categories, name)?
    } else {
        dense_class_map(&doc.categories)
    };

    let mut skipped_crowd = 0;
    let mut annotations_by_image: HashMap<ImageId, Vec<&Annotation>> = HashMap::new();
    for ann in &doc.annotations {
        if ann.is_crowd() {
            skipped_crowd += 1;
            continue;
        }
        annotations_by_image
            .entry(ann.image_id)
            .or_default()
            .push(ann);
    }
    if skipped_crowd > 0 {
        log::warn!("{name}: skipped {skipped_crowd} crowd annotation(s)");
    }

    let mut label_files = Vec::with_capacity(doc.images.len());
    let mut stems = HashSet::new();
    for image in &doc.images {
        if image.width == 0 || image.height == 0 {
            return Err(ValidationError::InvalidImageSize {
                document: name.to_string(),
                file_name: image.file_name.clone(),
                width: image.width,
                height: image.height,
            });
        }
        let (w, h) = (image.width as f64, image.height as f64);

        let rows: Vec<YoloLabelRow> = annotations_by_image
            .remove(&image.id)
            .unwrap_or_default()
            .into_iter()
            .map(|ann| {
                let class_id = *class_index.get(&ann.category_id).ok_or_else(|| {
                    ValidationError::UnmappedCategory {
                        document: name.to_string(),
                        annotation_id: ann.id.as_u64(),
                        category_id: ann.category_id.as_u64(),
                    }
                })?;
                let (cx, cy, bw, bh) = ann.bbox_xyxy().to_normalized(w, h).to_cxcywh();
                Ok(YoloLabelRow::new(
                    class_id,
                    clamp01(cx),
                    clamp01(cy),
                    clamp01(bw),
                    clamp01(bh),
                ))
            })
            .collect::<Result<_, ValidationError>>()?;

        if rows.is_empty() && opts.skip_empty_labels {
            continue;
        }

        let stem = Path::new(&image.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| image.file_name.clone());
        if !stems.insert(stem.clone()) {
            log::warn!(
                "{name}: label file '{stem}.{LABEL_EXTENSION}' is shared by several images; later images overwrite earlier ones"
            );
        }

        label_files.push(YoloLabelFile { stem, rows });
    }

    Ok(YoloExport {
        label_files,
        class_names,
        skipped_crowd,
    })
}

fn with_synthesized_categories(doc: &CocoDocument) -> Cow<'_, CocoDocument> {
    if !doc.categories.is_empty() {
        return Cow::Borrowed(doc);
    }

    let used: BTreeSet<CategoryId> = doc.annotations.iter().map(|a| a.category_id).collect();
    let mut owned = doc.clone();
    owned.categories = used
        .into_iter()
        .map(|id| Category::new(id, format!("category_{id}")))
        .collect();
    Cow::Owned(owned)
}

fn class_name(category: &Category) -> String {
    if category.name.is_empty() {
        format!("category_{}", category.id)
    } else {
        category.name.clone()
    }
}

/// Categories in ascending id order become classes 0..K-1.
fn dense_class_map(categories: &[Category]) -> (HashMap<CategoryId, usize>, Vec<String>) {
    let mut sorted: Vec<&Category> = categories.iter().collect();
    sorted.sort_by_key(|cat| cat.id);

    let index = sorted
        .iter()
        .enumerate()
        .map(|(i, cat)| (cat.id, i))
        .collect();
    let names = sorted.iter().map(|cat| class_name(cat)).collect();
    (index, names)
}

/// Category ids are the class indices; gaps get placeholder names.
fn sparse_class_map(
    categories: &[Category],
    document: &str,
) -> Result<(HashMap<CategoryId, usize>, Vec<String>), ValidationError> {
    let mut by_id: BTreeMap<u64, &Category> = BTreeMap::new();
    for cat in categories {
        if cat.id.as_u64() > MAX_KEPT_CATEGORY_ID {
            return Err(ValidationError::CategoryIdTooLarge {
                document: document.to_string(),
                id: cat.id.as_u64(),
            });
        }
        by_id.insert(cat.id.as_u64(), cat);
    }

    let len = by_id.keys().next_back().map_or(0, |max| *max as usize + 1);
    let names = (0..len)
        .map(|i| match by_id.get(&(i as u64)) {
            Some(cat) => class_name(cat),
            None => format!("category_{i}"),
        })
        .collect();
    let index = categories
        .iter()
        .map(|cat| (cat.id, cat.id.as_u64() as usize))
        .collect();
    Ok((index, names))
}

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}
