//! JSON output writing.
//!
//! Writes datasets and compressed event trees to pretty-printed JSON
//! files. Everything exported here is also plain `serde::Serialize`, so
//! in-memory consumers can skip the file layer entirely.

use super::dataset::WhereDataset;
use crate::patterns::GroupedCall;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write a where-entry dataset to a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_dataset(dataset: &WhereDataset, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    write_pretty(dataset, output_path.as_ref())
}

/// Write a compressed/grouped event tree to a JSON file
pub fn write_grouped_trace(
    grouped: &[GroupedCall],
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    write_pretty(&grouped, output_path.as_ref())
}

/// Serialize any exported structure to an in-memory JSON value
pub fn to_json_value<T: Serialize>(value: &T) -> Result<serde_json::Value, OutputError> {
    Ok(serde_json::to_value(value)?)
}

fn write_pretty<T: Serialize>(value: &T, output_path: &Path) -> Result<(), OutputError> {
    info!("Writing JSON output to: {}", output_path.display());

    if output_path.file_name().is_none() {
        return Err(OutputError::InvalidPath(format!(
            "{} has no file name",
            output_path.display()
        )));
    }

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value).map_err(OutputError::SerializationFailed)?;

    Ok(())
}
