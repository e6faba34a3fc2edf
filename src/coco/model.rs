//! COCO record types.
//!
//! Each record names the fields this crate reasons about and keeps every
//! other key in a flattened `extra` map, so `segmentation`, `coco_url`,
//! `date_captured` and friends pass through a merge untouched. Required
//! fields are enforced by deserialization: a record missing one fails to
//! parse instead of being patched up later.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::{AnnotationId, CategoryId, ImageId, LicenseId};
use crate::geom::{BBoxXYXY, Pixel};

/// Keys not modelled explicitly, preserved verbatim.
pub type Passthrough = Map<String, Value>;

/// A complete COCO detection document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CocoDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Passthrough>,

    #[serde(default)]
    pub licenses: Vec<License>,

    #[serde(default)]
    pub images: Vec<Image>,

    #[serde(default)]
    pub annotations: Vec<Annotation>,

    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub id: LicenseId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: Passthrough,
}

impl License {
    pub fn new(id: impl Into<LicenseId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: None,
            extra: Passthrough::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Identity used when de-duplicating licenses across documents.
    ///
    /// A missing url compares equal to an empty one.
    pub fn dedup_key(&self) -> (&str, &str) {
        (self.name.as_str(), self.url.as_deref().unwrap_or(""))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub file_name: String,
    pub width: u32,
    pub height: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseId>,

    #[serde(flatten)]
    pub extra: Passthrough,
}

impl Image {
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
            license: None,
            extra: Passthrough::new(),
        }
    }

    pub fn with_license(mut self, license: impl Into<LicenseId>) -> Self {
        self.license = Some(license.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supercategory: Option<String>,

    #[serde(flatten)]
    pub extra: Passthrough,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: None,
            extra: Passthrough::new(),
        }
    }

    pub fn with_supercategory(mut self, supercategory: impl Into<String>) -> Self {
        self.supercategory = Some(supercategory.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub category_id: CategoryId,

    /// `[x, y, width, height]` in pixels, (x, y) being the top-left corner.
    pub bbox: [f64; 4],

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iscrowd: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(flatten)]
    pub extra: Passthrough,
}

impl Annotation {
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        bbox: [f64; 4],
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
            bbox,
            area: None,
            iscrowd: None,
            score: None,
            extra: Passthrough::new(),
        }
    }

    pub fn with_area(mut self, area: f64) -> Self {
        self.area = Some(area);
        self
    }

    pub fn with_iscrowd(mut self, iscrowd: u8) -> Self {
        self.iscrowd = Some(iscrowd);
        self
    }

    pub fn is_crowd(&self) -> bool {
        self.iscrowd == Some(1)
    }

    pub fn bbox_xyxy(&self) -> BBoxXYXY<Pixel> {
        let [x, y, w, h] = self.bbox;
        BBoxXYXY::from_xywh(x, y, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_pass_through() {
        let json = r#"{
            "id": 3, "file_name": "a.jpg", "width": 10, "height": 20,
            "coco_url": "http://x/a.jpg", "date_captured": "2020-01-01"
        }"#;
        let image: Image = serde_json::from_str(json).expect("parse image");
        assert_eq!(image.id, ImageId(3));
        assert_eq!(image.extra.len(), 2);

        let back = serde_json::to_value(&image).unwrap();
        assert_eq!(back["coco_url"], "http://x/a.jpg");
        assert_eq!(back["date_captured"], "2020-01-01");
        assert!(back.get("license").is_none());
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let json = r#"{"id": 1, "image_id": 1, "bbox": [0, 0, 1, 1]}"#;
        let err = serde_json::from_str::<Annotation>(json).unwrap_err();
        assert!(err.to_string().contains("category_id"));
    }

    #[test]
    fn test_license_dedup_key_treats_missing_url_as_empty() {
        let a = License::new(1u64, "CC BY");
        let b = License::new(2u64, "CC BY").with_url("");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_annotation_bbox_xyxy() {
        let ann = Annotation::new(1u64, 1u64, 1u64, [10.0, 20.0, 90.0, 60.0]);
        let bbox = ann.bbox_xyxy();
        assert_eq!(bbox.xmax(), 100.0);
        assert_eq!(bbox.ymax(), 80.0);
    }
}
