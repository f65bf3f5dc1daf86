//! Read/write dataset JSON files.
//!
//! Dataset JSON is the portable form of a run: where the document came from, when it
//! was processed, and every reconstructed row. Gaps are written as `null`.
//!
//! The schema is defined by `domain::DatasetFile`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::Utc;

use crate::domain::{Dataset, DatasetFile, RunSource};
use crate::error::AppError;

pub const TOOL_NAME: &str = "genseries";

/// Write a dataset JSON file.
pub fn write_dataset_json(path: &Path, dataset: &Dataset, source: &RunSource) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create dataset JSON '{}': {e}", path.display())))?;

    let out = DatasetFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        source: source.clone(),
        rows: dataset.rows().to_vec(),
    };

    serde_json::to_writer_pretty(BufWriter::new(file), &out)
        .map_err(|e| AppError::output(format!("Failed to write dataset JSON: {e}")))?;

    Ok(())
}

/// Read a dataset JSON file.
pub fn read_dataset_json(path: &Path) -> Result<DatasetFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open dataset JSON '{}': {e}", path.display())))?;
    let dataset: DatasetFile = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| AppError::input(format!("Invalid dataset JSON: {e}")))?;
    Ok(dataset)
}
