//! Coordinate space markers.
//!
//! Zero-sized types used as type parameters so that a YOLO box (fractions of
//! the image) can never be written where a COCO box (pixels) is expected.

use std::fmt;

/// Absolute pixel positions, origin at the top-left corner of the image.
///
/// COCO `bbox` values live in this space.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Positions as fractions (0.0 to 1.0) of the image width and height.
///
/// YOLO label rows live in this space.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
