//! Image size overrides from a headerless `filename,width,height` CSV.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::YoloCocoError;

#[derive(Debug, Deserialize)]
struct SizeRow {
    filename: String,
    width: u32,
    height: u32,
}

/// Image dimensions keyed by COCO `file_name`.
pub type SizeTable = HashMap<String, (u32, u32)>;

/// Reads a sizes CSV. Later rows for the same file name win.
pub fn read_sizes_csv(path: &Path) -> Result<SizeTable, YoloCocoError> {
    let file = File::open(path).map_err(YoloCocoError::Io)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let mut sizes = SizeTable::new();
    for result in reader.deserialize() {
        let row: SizeRow = result.map_err(|source| YoloCocoError::SizesCsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        sizes.insert(row.filename, (row.width, row.height));
    }
    Ok(sizes)
}
