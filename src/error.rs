use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for yolococo operations.
#[derive(Debug, Error)]
pub enum YoloCocoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write COCO JSON to {path}: {source}")]
    CocoJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse sizes CSV {path}: {source}")]
    SizesCsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid class names file {path}: {message}")]
    ClassesParse { path: PathBuf, message: String },

    #[error("Failed to parse data.yaml {path}: {source}")]
    DataYamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid YOLO label {path}:{line}: {message}")]
    YoloLabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Missing image size for {path}: {source} (provide --sizes CSV)")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Image {path} is too large: {width}x{height}")]
    ImageTooLarge {
        path: PathBuf,
        width: usize,
        height: usize,
    },

    #[error("No images found under: {path}")]
    NoImagesFound { path: PathBuf },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Which id space a [`ValidationError::DuplicateId`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdKind {
    Image,
    Annotation,
    Category,
    License,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdKind::Image => "image",
            IdKind::Annotation => "annotation",
            IdKind::Category => "category",
            IdKind::License => "license",
        };
        f.write_str(name)
    }
}

/// A COCO document, or a set of documents, is malformed or internally
/// inconsistent.
///
/// `document` fields carry the name the caller gave the input (usually the
/// file stem) so messages point at the offending file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("no input documents given")]
    NoInputs,

    #[error("custom prefixes must match number of inputs: expected {expected}, found {found}")]
    PrefixCountMismatch { expected: usize, found: usize },

    #[error("{document}: duplicate {kind} id {id}")]
    DuplicateId {
        document: String,
        kind: IdKind,
        id: u64,
    },

    #[error("{document}: annotation {annotation_id} references missing image {image_id}")]
    DanglingImageRef {
        document: String,
        annotation_id: u64,
        image_id: u64,
    },

    #[error("{document}: annotation {annotation_id} references missing category {category_id}")]
    DanglingCategoryRef {
        document: String,
        annotation_id: u64,
        category_id: u64,
    },

    #[error(
        "category id/name conflict in {document}: '{name}' has id {id} but was already merged as id {existing_id} (use --align-by-name to unify by name)"
    )]
    CategoryConflict {
        document: String,
        name: String,
        id: u64,
        existing_id: u64,
    },

    #[error("{document}: no category id left for '{name}' (output ids already reach u64::MAX)")]
    CategoryIdExhausted { document: String, name: String },

    #[error("{document}: annotation {annotation_id} has unmapped category {category_id}")]
    UnmappedCategory {
        document: String,
        annotation_id: u64,
        category_id: u64,
    },

    #[error("{file_name}: class index {class_id} is out of range for {class_count} class name(s)")]
    ClassOutOfRange {
        file_name: String,
        class_id: usize,
        class_count: usize,
    },

    #[error("{document}: category id {id} is too large to use as a YOLO class index")]
    CategoryIdTooLarge { document: String, id: u64 },

    #[error("{document}: no images found in COCO document")]
    NoImages { document: String },

    #[error("{document}: image '{file_name}' has invalid size {width}x{height}")]
    InvalidImageSize {
        document: String,
        file_name: String,
        width: u32,
        height: u32,
    },
}
