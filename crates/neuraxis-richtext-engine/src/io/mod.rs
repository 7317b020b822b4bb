use crate::models::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a value from its JSON form
pub fn from_json(json: &str) -> Result<Value, IoError> {
    Ok(serde_json::from_str(json)?)
}

/// Pretty-printed JSON form of a value
pub fn to_json(value: &Value) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Read a document value from a JSON file
pub fn load_value(path: &Path) -> Result<Value, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path)?;
    from_json(&json)
}

/// Write a document value as JSON
pub fn save_value(path: &Path, value: &Value) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, to_json(value)?)?;
    Ok(())
}
