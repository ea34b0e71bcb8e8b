use std::fs;
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::markdown::parse_markdown;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a markdown file and return its content
pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Read and parse a markdown file
pub fn load_document(path: &Path) -> Result<Document, IoError> {
    let content = read_file(path)?;
    log::debug!("Loaded {} bytes from {}", content.len(), path.display());
    Ok(parse_markdown(&content))
}
