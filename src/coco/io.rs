//! COCO JSON reading and writing.
//!
//! Records are written in document order; nothing is re-sorted.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::model::CocoDocument;
use crate::error::YoloCocoError;

/// Reads a COCO document from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be opened, is not valid JSON, or a
/// record lacks one of its required fields.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use yolococo::coco::read_coco_json;
///
/// let doc = read_coco_json(Path::new("instances_train.json"))?;
/// println!("{} images", doc.images.len());
/// # Ok::<(), yolococo::YoloCocoError>(())
/// ```
pub fn read_coco_json(path: &Path) -> Result<CocoDocument, YoloCocoError> {
    let file = File::open(path).map_err(YoloCocoError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| YoloCocoError::CocoJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a COCO document as pretty-printed JSON, creating parent
/// directories as needed.
pub fn write_coco_json(path: &Path, doc: &CocoDocument) -> Result<(), YoloCocoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(YoloCocoError::Io)?;
    }

    let file = File::create(path).map_err(YoloCocoError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, doc).map_err(|source| {
        YoloCocoError::CocoJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.write_all(b"\n").map_err(YoloCocoError::Io)?;
    writer.flush().map_err(YoloCocoError::Io)
}

/// Parses a COCO document from a string. Handy in tests.
pub fn from_coco_str(json: &str) -> Result<CocoDocument, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses a COCO document from raw bytes without a UTF-8 pre-pass.
pub fn from_coco_slice(bytes: &[u8]) -> Result<CocoDocument, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Serializes a COCO document to a pretty-printed string.
pub fn to_coco_string(doc: &CocoDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coco::{Annotation, Category, Image, LicenseId};

    fn sample_coco_json() -> &'static str {
        r#"{
            "info": {"year": 2024, "version": "1.0", "description": "Test dataset"},
            "licenses": [
                {"id": 1, "name": "CC BY 4.0", "url": "https://creativecommons.org/licenses/by/4.0/"}
            ],
            "images": [
                {"id": 1, "width": 640, "height": 480, "file_name": "image001.jpg", "license": 1}
            ],
            "categories": [
                {"id": 1, "name": "person", "supercategory": "human"}
            ],
            "annotations": [
                {
                    "id": 1, "image_id": 1, "category_id": 1,
                    "bbox": [10.0, 20.0, 90.0, 60.0], "area": 5400.0, "iscrowd": 0,
                    "segmentation": [[10, 20, 100, 20, 100, 80]]
                }
            ]
        }"#
    }

    #[test]
    fn test_parse_basic_document() {
        let doc = from_coco_str(sample_coco_json()).expect("parse failed");

        assert_eq!(doc.images.len(), 1);
        assert_eq!(doc.categories.len(), 1);
        assert_eq!(doc.annotations.len(), 1);
        assert_eq!(doc.licenses.len(), 1);

        let info = doc.info.as_ref().expect("info present");
        assert_eq!(info["year"], 2024);

        let img = &doc.images[0];
        assert_eq!(img.file_name, "image001.jpg");
        assert_eq!(img.license, Some(LicenseId::new(1)));

        assert_eq!(doc.categories[0].supercategory.as_deref(), Some("human"));

        let ann = &doc.annotations[0];
        assert_eq!(ann.bbox, [10.0, 20.0, 90.0, 60.0]);
        assert_eq!(ann.area, Some(5400.0));
        assert!(ann.extra.contains_key("segmentation"));
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let doc = from_coco_str(r#"{"images": []}"#).expect("parse failed");
        assert!(doc.info.is_none());
        assert!(doc.licenses.is_empty());
        assert!(doc.annotations.is_empty());
        assert!(doc.categories.is_empty());
    }

    #[test]
    fn test_roundtrip_preserves_passthrough_and_order() {
        let original = from_coco_str(sample_coco_json()).expect("parse failed");
        let json = to_coco_string(&original).expect("serialize failed");
        let restored = from_coco_str(&json).expect("reparse failed");
        assert_eq!(original, restored);
    }

    #[test]
    fn test_writer_keeps_record_order() {
        let doc = CocoDocument {
            images: vec![
                Image::new(3u64, "c.jpg", 100, 100),
                Image::new(1u64, "a.jpg", 100, 100),
            ],
            categories: vec![Category::new(2u64, "cat"), Category::new(1u64, "dog")],
            annotations: vec![Annotation::new(9u64, 1u64, 1u64, [0.0, 0.0, 1.0, 1.0])],
            ..Default::default()
        };

        let parsed: serde_json::Value =
            serde_json::from_str(&to_coco_string(&doc).unwrap()).unwrap();
        assert_eq!(parsed["images"][0]["id"], 3);
        assert_eq!(parsed["images"][1]["id"], 1);
        assert_eq!(parsed["categories"][0]["id"], 2);
        assert!(parsed.get("info").is_none());
    }

    #[test]
    fn test_write_creates_parent_dirs_and_keeps_unicode() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("nested/out/merged.json");
        let doc = CocoDocument {
            images: vec![Image::new(1u64, "фото.jpg", 10, 10)],
            ..Default::default()
        };

        write_coco_json(&path, &doc).expect("write");
        let text = fs::read_to_string(&path).expect("read back");
        assert!(text.contains("фото.jpg"));

        let back = read_coco_json(&path).expect("reparse");
        assert_eq!(back, doc);
    }

    #[test]
    fn test_read_reports_path_on_parse_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("broken.json");
        fs::write(&path, "{not json").expect("write");

        let err = read_coco_json(&path).unwrap_err();
        assert!(matches!(err, YoloCocoError::CocoJsonParse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
