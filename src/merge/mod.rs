//! Merging several COCO documents into one.
//!
//! Every input is validated up front, then folded into a single output in
//! input order. Image, annotation and license ids in the output are freshly
//! allocated; category ids are reconciled (see [`CategoryTable`]). Nothing
//! is returned unless every input merged cleanly.
//!
//! ```
//! use yolococo::coco::{Annotation, Category, CocoDocument, Image};
//! use yolococo::merge::{merge, MergeInput, MergeOptions};
//!
//! let doc = |file: &str| CocoDocument {
//!     images: vec![Image::new(7u64, file, 64, 48)],
//!     annotations: vec![Annotation::new(3u64, 7u64, 1u64, [1.0, 2.0, 3.0, 4.0])],
//!     categories: vec![Category::new(1u64, "car")],
//!     ..Default::default()
//! };
//!
//! let inputs = [
//!     MergeInput::new("a", doc("x.jpg")),
//!     MergeInput::new("b", doc("y.jpg")),
//! ];
//! let merged = merge(&inputs, &MergeOptions::default()).unwrap();
//!
//! assert_eq!(merged.images.len(), 2);
//! assert_eq!(merged.annotations[1].image_id.as_u64(), 2);
//! assert_eq!(merged.categories.len(), 1);
//! ```

mod alloc;
mod categories;
mod licenses;

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde_json::Value;

use crate::coco::{check_integrity, read_coco_json, CocoDocument, ImageId, Passthrough};
use crate::error::{ValidationError, YoloCocoError};

pub use alloc::IdAllocator;
pub use categories::{CategoryMap, CategoryTable};
pub use licenses::LicenseTable;

/// Description written when the first input carries no `info` block.
pub const DEFAULT_INFO_DESCRIPTION: &str = "Merged COCO dataset";

/// One named document to merge. The name is used in diagnostics and, with
/// [`PrefixMode::Basename`], as the file name prefix.
#[derive(Clone, Debug)]
pub struct MergeInput {
    pub name: String,
    pub document: CocoDocument,
}

impl MergeInput {
    pub fn new(name: impl Into<String>, document: CocoDocument) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }

    /// Reads a COCO JSON file; the file stem becomes the input name.
    pub fn from_path(path: &Path) -> Result<Self, YoloCocoError> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let document = read_coco_json(path)?;
        Ok(Self { name, document })
    }
}

/// How image file names are disambiguated across inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PrefixMode {
    /// File names are kept as-is.
    #[default]
    None,
    /// `<input name>_` is prepended.
    Basename,
    /// One prefix per input, prepended verbatim.
    Custom(Vec<String>),
}

impl PrefixMode {
    /// Custom prefixes must pair up one-to-one with `input_count` inputs.
    pub fn check_input_count(&self, input_count: usize) -> Result<(), ValidationError> {
        match self {
            PrefixMode::Custom(prefixes) if prefixes.len() != input_count => {
                Err(ValidationError::PrefixCountMismatch {
                    expected: input_count,
                    found: prefixes.len(),
                })
            }
            _ => Ok(()),
        }
    }

    fn prefix_for<'a>(&'a self, index: usize, name: &str) -> Cow<'a, str> {
        match self {
            PrefixMode::None => Cow::Borrowed(""),
            PrefixMode::Basename => Cow::Owned(format!("{name}_")),
            PrefixMode::Custom(prefixes) => prefixes
                .get(index)
                .map(|p| Cow::Borrowed(p.as_str()))
                .unwrap_or(Cow::Borrowed("")),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MergeOptions {
    pub prefix_mode: PrefixMode,
    /// Reconcile categories by name instead of by id.
    pub align_by_name: bool,
    /// Keep only the first image for each (prefixed) file name, along with
    /// its annotations.
    pub drop_duplicate_filenames: bool,
}

/// Merges `inputs` in order.
///
/// Fails with [`ValidationError::NoInputs`] on an empty slice, with
/// [`ValidationError::PrefixCountMismatch`] when custom prefixes don't line
/// up with the inputs, and with the first integrity error of any input
/// before anything is merged.
pub fn merge(inputs: &[MergeInput], opts: &MergeOptions) -> Result<CocoDocument, ValidationError> {
    let Some(first) = inputs.first() else {
        return Err(ValidationError::NoInputs);
    };
    opts.prefix_mode.check_input_count(inputs.len())?;
    for input in inputs {
        check_integrity(&input.document, &input.name)?;
    }

    let mut alloc = IdAllocator::new();
    let (mut categories, first_categories) = CategoryTable::seed(&first.document.categories);
    let mut first_categories = Some(first_categories);
    let mut licenses = LicenseTable::default();
    let mut seen_file_names: HashSet<String> = HashSet::new();

    let mut images = Vec::new();
    let mut annotations = Vec::new();
    let mut dropped_images = 0usize;
    let mut dropped_annotations = 0usize;

    for (index, input) in inputs.iter().enumerate() {
        let doc = &input.document;
        let category_map = match first_categories.take() {
            Some(map) => map,
            None => categories.reconcile(&doc.categories, &input.name, opts.align_by_name)?,
        };
        let license_map = licenses.absorb(&doc.licenses, &mut alloc);
        let prefix = opts.prefix_mode.prefix_for(index, &input.name);

        // Images absent from this map were dropped as duplicates.
        let mut image_map: HashMap<ImageId, ImageId> = HashMap::with_capacity(doc.images.len());

        for image in &doc.images {
            let file_name = format!("{prefix}{}", image.file_name);
            if opts.drop_duplicate_filenames {
                if seen_file_names.contains(&file_name) {
                    log::debug!("{}: dropping duplicate image '{}'", input.name, file_name);
                    dropped_images += 1;
                    continue;
                }
                seen_file_names.insert(file_name.clone());
            }

            let mut merged = image.clone();
            merged.id = alloc.next_image();
            merged.file_name = file_name;
            merged.license = image.license.and_then(|old| match license_map.get(&old) {
                Some(&new) => Some(new),
                None => {
                    log::warn!(
                        "{}: image {} references missing license {}; reference dropped",
                        input.name,
                        image.id,
                        old
                    );
                    None
                }
            });
            image_map.insert(image.id, merged.id);
            images.push(merged);
        }

        for ann in &doc.annotations {
            let Some(&image_id) = image_map.get(&ann.image_id) else {
                dropped_annotations += 1;
                continue;
            };
            let category_id = *category_map.get(&ann.category_id).ok_or_else(|| {
                ValidationError::UnmappedCategory {
                    document: input.name.clone(),
                    annotation_id: ann.id.as_u64(),
                    category_id: ann.category_id.as_u64(),
                }
            })?;

            let mut merged = ann.clone();
            merged.id = alloc.next_annotation();
            merged.image_id = image_id;
            merged.category_id = category_id;
            annotations.push(merged);
        }
    }

    if dropped_images > 0 {
        log::info!(
            "dropped {dropped_images} duplicate image(s) and {dropped_annotations} annotation(s)"
        );
    }

    Ok(CocoDocument {
        info: Some(first.document.info.clone().unwrap_or_else(default_info)),
        licenses: licenses.into_licenses(),
        images,
        annotations,
        categories: categories.into_categories(),
    })
}

fn default_info() -> Passthrough {
    let mut info = Passthrough::new();
    info.insert(
        "description".to_string(),
        Value::from(DEFAULT_INFO_DESCRIPTION),
    );
    info
}
