//! Structural integrity checks for a single COCO document.
//!
//! A document is structurally valid when ids are unique within each id
//! space and every annotation points at an image and a category of the same
//! document. The merger and the YOLO exporter refuse to run on anything
//! else, since remapping a dangling reference has no meaningful result.

use std::collections::HashSet;
use std::hash::Hash;

use super::ids::{CategoryId, ImageId};
use super::model::CocoDocument;
use crate::error::{IdKind, ValidationError};

/// Checks `doc` for duplicate ids and dangling annotation references.
///
/// `name` identifies the document in error messages. The first problem found
/// is returned; images are checked before categories, annotations and
/// licenses, then references.
pub fn check_integrity(doc: &CocoDocument, name: &str) -> Result<(), ValidationError> {
    let image_ids: HashSet<ImageId> =
        unique_ids(doc.images.iter().map(|i| i.id), name, IdKind::Image, |id| {
            id.as_u64()
        })?;
    let category_ids: HashSet<CategoryId> = unique_ids(
        doc.categories.iter().map(|c| c.id),
        name,
        IdKind::Category,
        |id| id.as_u64(),
    )?;
    unique_ids(
        doc.annotations.iter().map(|a| a.id),
        name,
        IdKind::Annotation,
        |id| id.as_u64(),
    )?;
    unique_ids(
        doc.licenses.iter().map(|l| l.id),
        name,
        IdKind::License,
        |id| id.as_u64(),
    )?;

    for ann in &doc.annotations {
        if !image_ids.contains(&ann.image_id) {
            return Err(ValidationError::DanglingImageRef {
                document: name.to_string(),
                annotation_id: ann.id.as_u64(),
                image_id: ann.image_id.as_u64(),
            });
        }
        if !category_ids.contains(&ann.category_id) {
            return Err(ValidationError::DanglingCategoryRef {
                document: name.to_string(),
                annotation_id: ann.id.as_u64(),
                category_id: ann.category_id.as_u64(),
            });
        }
    }

    Ok(())
}

fn unique_ids<T: Copy + Eq + Hash>(
    ids: impl Iterator<Item = T>,
    name: &str,
    kind: IdKind,
    raw: impl Fn(T) -> u64,
) -> Result<HashSet<T>, ValidationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId {
                document: name.to_string(),
                kind,
                id: raw(id),
            });
        }
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coco::{Annotation, Category, Image, License};

    fn valid_doc() -> CocoDocument {
        CocoDocument {
            licenses: vec![License::new(1u64, "CC0")],
            images: vec![
                Image::new(1u64, "a.jpg", 10, 10),
                Image::new(2u64, "b.jpg", 10, 10),
            ],
            categories: vec![Category::new(1u64, "car")],
            annotations: vec![Annotation::new(1u64, 2u64, 1u64, [0.0, 0.0, 1.0, 1.0])],
            ..Default::default()
        }
    }

    #[test]
    fn accepts_valid_document() {
        assert_eq!(check_integrity(&valid_doc(), "a"), Ok(()));
    }

    #[test]
    fn rejects_duplicate_image_id() {
        let mut doc = valid_doc();
        doc.images.push(Image::new(1u64, "c.jpg", 10, 10));
        assert_eq!(
            check_integrity(&doc, "a"),
            Err(ValidationError::DuplicateId {
                document: "a".into(),
                kind: IdKind::Image,
                id: 1
            })
        );
    }

    #[test]
    fn rejects_duplicate_license_id() {
        let mut doc = valid_doc();
        doc.licenses.push(License::new(1u64, "other"));
        let err = check_integrity(&doc, "a").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::DuplicateId {
                kind: IdKind::License,
                ..
            }
        ));
    }

    #[test]
    fn rejects_dangling_image_ref() {
        let mut doc = valid_doc();
        doc.annotations[0].image_id = ImageId(42);
        assert!(matches!(
            check_integrity(&doc, "a"),
            Err(ValidationError::DanglingImageRef { image_id: 42, .. })
        ));
    }

    #[test]
    fn rejects_dangling_category_ref() {
        let mut doc = valid_doc();
        doc.annotations[0].category_id = CategoryId(7);
        let err = check_integrity(&doc, "train").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::DanglingCategoryRef { category_id: 7, .. }
        ));
        assert!(err.to_string().starts_with("train:"));
    }
}
