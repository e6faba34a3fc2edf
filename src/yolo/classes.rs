//! Class name lists: a plain `classes.txt` or an Ultralytics `data.yaml`.
//!
//! The file kind is chosen by extension: `.yaml`/`.yml` means `data.yaml`,
//! anything else is one name per line.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::YoloCocoError;

/// Reads class names, index `i` being YOLO class `i`.
pub fn read_class_names(path: &Path) -> Result<Vec<String>, YoloCocoError> {
    if is_yaml(path) {
        read_data_yaml_names(path)
    } else {
        read_classes_txt(path)
    }
}

/// Writes class names in the format implied by `path`, creating parent
/// directories as needed.
pub fn write_class_names(path: &Path, names: &[String]) -> Result<(), YoloCocoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(YoloCocoError::Io)?;
    }

    let content = if is_yaml(path) {
        render_data_yaml(names)
    } else {
        names.iter().map(|name| format!("{name}\n")).collect()
    };
    fs::write(path, content).map_err(YoloCocoError::Io)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

fn read_classes_txt(path: &Path) -> Result<Vec<String>, YoloCocoError> {
    let data = fs::read_to_string(path).map_err(YoloCocoError::Io)?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

fn read_data_yaml_names(path: &Path) -> Result<Vec<String>, YoloCocoError> {
    let data = fs::read_to_string(path).map_err(YoloCocoError::Io)?;
    let parsed: DataYaml =
        serde_yaml::from_str(&data).map_err(|source| YoloCocoError::DataYamlParse {
            path: path.to_path_buf(),
            source,
        })?;

    let names = match parsed.names {
        DataYamlNames::Sequence(names) => names,
        DataYamlNames::Mapping(mapping) => {
            let Some(&max_index) = mapping.keys().next_back() else {
                return Ok(Vec::new());
            };
            if max_index > 1_000_000 {
                return Err(YoloCocoError::ClassesParse {
                    path: path.to_path_buf(),
                    message: format!("class index {max_index} is implausibly large"),
                });
            }
            let mut names = vec![String::new(); max_index + 1];
            for (index, name) in mapping {
                names[index] = name;
            }
            for (index, name) in names.iter_mut().enumerate() {
                if name.trim().is_empty() {
                    *name = format!("class_{index}");
                }
            }
            names
        }
    };

    Ok(names)
}

fn render_data_yaml(names: &[String]) -> String {
    let mut yaml = format!("nc: {}\nnames:\n", names.len());
    for (idx, name) in names.iter().enumerate() {
        yaml.push_str(&format!("  {}: '{}'\n", idx, name.replace('\'', "''")));
    }
    yaml
}
