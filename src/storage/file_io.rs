//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::BizdeskError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, BizdeskError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| BizdeskError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| BizdeskError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, then rename)
///
/// This ensures that the file is either completely written or not modified at all,
/// preventing corruption on crashes or power failures.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), BizdeskError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            BizdeskError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Create temp file in same directory (important for atomic rename)
    let temp_path = path.with_extension("json.tmp");

    // Write to temp file
    let file = File::create(&temp_path)
        .map_err(|e| BizdeskError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| BizdeskError::Storage(format!("Failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| BizdeskError::Storage(format!("Failed to flush data: {}", e)))?;

    // Sync to disk before rename
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| BizdeskError::Storage(format!("Failed to sync data: {}", e)))?;

    // Atomic rename
    fs::rename(&temp_path, path).map_err(|e| {
        // Try to clean up temp file if rename fails
        let _ = fs::remove_file(&temp_path);
        BizdeskError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Append one JSON value as a line, flushing immediately
pub fn append_json_line<T, P>(path: P, data: &T) -> Result<(), BizdeskError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let line = serde_json::to_string(data)
        .map_err(|e| BizdeskError::Json(format!("Failed to serialize record: {}", e)))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| BizdeskError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    writeln!(file, "{}", line)
        .map_err(|e| BizdeskError::Storage(format!("Failed to append record: {}", e)))?;

    file.flush()
        .map_err(|e| BizdeskError::Storage(format!("Failed to flush {}: {}", path.display(), e)))
}

/// Rewrite a JSON-lines file atomically with exactly `items`
pub fn write_json_lines_atomic<T, P>(path: P, items: &[T]) -> Result<(), BizdeskError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = path.with_extension("log.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| BizdeskError::Storage(format!("Failed to create temp file: {}", e)))?;
    let mut writer = BufWriter::new(file);

    for item in items {
        let line = serde_json::to_string(item)
            .map_err(|e| BizdeskError::Json(format!("Failed to serialize record: {}", e)))?;
        writeln!(writer, "{}", line)
            .map_err(|e| BizdeskError::Storage(format!("Failed to write record: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| BizdeskError::Storage(format!("Failed to flush data: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| BizdeskError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        BizdeskError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Read every line of a JSON-lines file; a missing file reads as empty
///
/// Blank lines are skipped. A malformed line fails the whole read with its
/// line number.
pub fn read_json_lines<T, P>(path: P) -> Result<Vec<T>, BizdeskError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .map_err(|e| BizdeskError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| {
            BizdeskError::Storage(format!("Failed to read line {}: {}", index + 1, e))
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let record = serde_json::from_str(&line).map_err(|e| {
            BizdeskError::Storage(format!(
                "Failed to parse {} at line {}: {}",
                path.display(),
                index + 1,
                e
            ))
        })?;
        records.push(record);
    }

    Ok(records)
}
