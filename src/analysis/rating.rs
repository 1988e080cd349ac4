use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug)]
pub enum RatingError {
    #[error("No {file_name} found in {} or any parent", .start.display())]
    NotFound { start: PathBuf, file_name: String },
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} does not hold a JSON object", .path.display())]
    NotAnObject { path: PathBuf },
}

/// Find `file_name` in `start` or the closest directory above it
pub fn find_rating_file(start: &Path, file_name: &str) -> Result<PathBuf, RatingError> {
    let not_found = || RatingError::NotFound {
        start: start.to_path_buf(),
        file_name: file_name.to_string(),
    };
    let start_abs = start.canonicalize().map_err(|_| not_found())?;

    start_abs
        .ancestors()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(not_found)
}

/// Rating statistics of the app owning `layout_dir`, flattened to cells.
///
/// Nested objects become `outer_inner` keys; arrays become `key_0`, `key_1`...
pub fn read_rating_stats(layout_dir: &Path, file_name: &str) -> Result<BTreeMap<String, String>, RatingError> {
    let path = find_rating_file(layout_dir, file_name)?;
    trace!("Reading ratings from {}", path.display());

    let contents = std::fs::read_to_string(&path).map_err(|source| RatingError::Io {
        path: path.clone(),
        source,
    })?;
    let value: Value = serde_json::from_str(&contents).map_err(|source| RatingError::Json {
        path: path.clone(),
        source,
    })?;

    let Value::Object(object) = value else {
        return Err(RatingError::NotAnObject { path });
    };

    let mut cells = BTreeMap::new();
    for (key, value) in object {
        flatten(&key, value, &mut cells);
    }
    Ok(cells)
}

fn flatten(key: &str, value: Value, cells: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(object) => {
            for (inner, value) in object {
                flatten(&format!("{}_{}", key, inner), value, cells);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.into_iter().enumerate() {
                flatten(&format!("{}_{}", key, index), value, cells);
            }
        }
        Value::String(text) => {
            cells.insert(key.to_string(), text);
        }
        Value::Null => {
            cells.insert(key.to_string(), String::new());
        }
        other => {
            cells.insert(key.to_string(), other.to_string());
        }
    }
}
