//! Newtype ids for the four COCO id spaces.
//!
//! The merger juggles image, annotation, category and license ids from many
//! documents at once; distinct types keep an image id from being looked up in
//! a category remap table.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! coco_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            #[inline]
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

coco_id!(
    /// Id of an entry in `images`.
    ImageId
);
coco_id!(
    /// Id of an entry in `annotations`.
    AnnotationId
);
coco_id!(
    /// Id of an entry in `categories`. YOLO class indices map onto these.
    CategoryId
);
coco_id!(
    /// Id of an entry in `licenses`.
    LicenseId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_ordering_and_display() {
        assert!(ImageId(1) < ImageId(2));
        assert!(CategoryId(10) > CategoryId(5));
        assert_eq!(LicenseId(7).to_string(), "7");
        assert_eq!(format!("{:?}", AnnotationId(3)), "AnnotationId(3)");
    }

    #[test]
    fn test_ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&[CategoryId(4), CategoryId(9)]).unwrap();
        assert_eq!(json, "[4,9]");
        let back: Vec<CategoryId> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![CategoryId(4), CategoryId(9)]);
    }
}
