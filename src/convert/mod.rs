//! Conversion between YOLO label sets and COCO documents.
//!
//! Both directions are split the same way: a pure function over in-memory
//! records ([`build_coco_document`], [`plan_yolo_export`]) and a thin driver
//! that does the filesystem work around it ([`yolo_to_coco`],
//! [`coco_to_yolo`]).

mod coco_to_yolo;
mod yolo_to_coco;

pub use coco_to_yolo::{
    coco_to_yolo, plan_yolo_export, CocoToYoloOptions, YoloExport, YoloLabelFile,
    YoloWriteSummary,
};
pub use yolo_to_coco::{
    build_coco_document, yolo_to_coco, BoxOptions, FileNameMode, LabeledImage, YoloToCocoOptions,
};
