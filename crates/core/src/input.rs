use crate::error::{Result, ShuffleError};
use crate::ranker::metadata_array;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Check that the input option is set and points at an existing file.
pub async fn resolve_input(input: Option<&Path>) -> Result<PathBuf> {
    let input = match input {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => return Err(ShuffleError::configuration("Input file missing")),
    };
    let exists = tokio::fs::try_exists(input)
        .await
        .map_err(|err| ShuffleError::io(input, err))?;
    if !exists {
        return Err(ShuffleError::not_found("Input file not found"));
    }
    Ok(input.to_path_buf())
}

/// Read and parse the metadata array.
pub async fn load_metadata(path: &Path) -> Result<Vec<Value>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| ShuffleError::io(path, err))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|_| ShuffleError::parse("Input file not a JSON file"))?;
    let records = metadata_array(value)?;
    log::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
