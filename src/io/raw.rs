//! Raw provider documents on disk.

use std::path::Path;

use crate::error::AppError;

/// Read a saved provider document (`load --file`).
pub fn read_document_file(path: &Path) -> Result<Vec<u8>, AppError> {
    std::fs::read(path)
        .map_err(|e| AppError::input(format!("Failed to read document '{}': {e}", path.display())))
}

/// Keep a copy of the fetched body (`fetch --save-raw`).
pub fn write_raw_document(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    std::fs::write(path, bytes)
        .map_err(|e| AppError::output(format!("Failed to save raw document '{}': {e}", path.display())))
}
