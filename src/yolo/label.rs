//! YOLO label rows: `class x_center y_center width height [confidence]`.

use std::fs;
use std::path::Path;

use crate::error::YoloCocoError;
use crate::geom::{BBoxXYXY, Normalized};

/// One object in a YOLO label file, coordinates normalized to the image.
#[derive(Clone, Debug, PartialEq)]
pub struct YoloLabelRow {
    pub class_id: usize,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
    /// Present on prediction files that append a sixth column.
    pub confidence: Option<f64>,
}

impl YoloLabelRow {
    pub fn new(class_id: usize, cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self {
            class_id,
            cx,
            cy,
            w,
            h,
            confidence: None,
        }
    }

    pub fn bbox(&self) -> BBoxXYXY<Normalized> {
        BBoxXYXY::from_cxcywh(self.cx, self.cy, self.w, self.h)
    }

    /// Renders the row with six decimals, the precision Ultralytics writes.
    pub fn to_line(&self) -> String {
        format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.cx, self.cy, self.w, self.h
        )
    }
}

/// Reads every row of a label file. Blank lines are skipped.
pub fn read_label_file(path: &Path) -> Result<Vec<YoloLabelRow>, YoloCocoError> {
    let content = fs::read_to_string(path).map_err(YoloCocoError::Io)?;
    let mut rows = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        if let Some(row) = parse_label_line(line, path, line_idx + 1)? {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Parses one label line; `Ok(None)` for a blank line.
pub fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<YoloLabelRow>, YoloCocoError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Take at most 7 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(7).collect();

    if tokens.len() < 5 || tokens.len() > 6 {
        return Err(YoloCocoError::YoloLabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "expected 5 tokens (or 6 with confidence), found {}",
                if tokens.len() > 6 {
                    "more than 6".to_string()
                } else {
                    tokens.len().to_string()
                }
            ),
        });
    }

    let class_id = tokens[0]
        .parse::<usize>()
        .map_err(|_| YoloCocoError::YoloLabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "invalid class_id '{}'; expected non-negative integer",
                tokens[0]
            ),
        })?;

    let cx = parse_f64_token(tokens[1], "x_center", file_path, line_num)?;
    let cy = parse_f64_token(tokens[2], "y_center", file_path, line_num)?;
    let w = parse_f64_token(tokens[3], "width", file_path, line_num)?;
    let h = parse_f64_token(tokens[4], "height", file_path, line_num)?;
    let confidence = match tokens.get(5) {
        Some(raw) => Some(parse_f64_token(raw, "confidence", file_path, line_num)?),
        None => None,
    };

    Ok(Some(YoloLabelRow {
        class_id,
        cx,
        cy,
        w,
        h,
        confidence,
    }))
}

/// Fuzz-only entrypoint for YOLO single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), YoloCocoError> {
    let _ = parse_label_line(input, Path::new("<fuzz>"), 1)?;
    Ok(())
}

fn parse_f64_token(
    raw: &str,
    field_name: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<f64, YoloCocoError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| YoloCocoError::YoloLabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("invalid {field_name} '{raw}'; expected a finite number"),
        })
}
