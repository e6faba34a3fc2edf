//! The COCO record model.
//!
//! COCO documents are the currency of the whole crate: the YOLO importer
//! produces one, the YOLO exporter consumes one, and the merger turns many
//! into one.
//!
//! # Example
//!
//! ```
//! use yolococo::coco::{Annotation, Category, CocoDocument, Image};
//!
//! let doc = CocoDocument {
//!     images: vec![Image::new(1u64, "image.jpg", 640, 480)],
//!     categories: vec![Category::new(1u64, "person")],
//!     annotations: vec![Annotation::new(1u64, 1u64, 1u64, [10.0, 20.0, 90.0, 180.0])],
//!     ..Default::default()
//! };
//! assert!(yolococo::coco::check_integrity(&doc, "example").is_ok());
//! ```

mod ids;
mod integrity;
mod io;
mod model;

pub use ids::{AnnotationId, CategoryId, ImageId, LicenseId};
pub use integrity::check_integrity;
pub use io::{from_coco_slice, from_coco_str, read_coco_json, to_coco_string, write_coco_json};
pub use model::{Annotation, Category, CocoDocument, Image, License, Passthrough};
