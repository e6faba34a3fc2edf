//! Box geometry shared by the YOLO and COCO converters.
//!
//! Marker types keep normalized (YOLO) and pixel (COCO) coordinates apart at
//! compile time; the only way between the two spaces is through an explicit
//! image size.

mod bbox;
mod coord;
mod space;

pub use bbox::{round_to, BBoxXYXY};
pub use coord::Coord;
pub use space::{Normalized, Pixel};
