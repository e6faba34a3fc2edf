//! YOLO-side file formats: label rows, class name lists and the sizes CSV
//! used when image headers cannot be probed.

mod classes;
mod label;
mod sizes;

#[cfg(feature = "fuzzing")]
pub use label::fuzz_parse_label_line;
pub use classes::{read_class_names, write_class_names};
pub use label::{parse_label_line, read_label_file, YoloLabelRow};
pub use sizes::{read_sizes_csv, SizeTable};
