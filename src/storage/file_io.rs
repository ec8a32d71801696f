//! JSON file I/O for the repositories
//!
//! Reads tolerate a missing file (fresh store); writes go through a temp
//! file in the same directory, fsync, then rename, so a crash mid-write
//! never leaves a half-written data file behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::KassenwartError;

/// Read a JSON data file, yielding the default value when it doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, KassenwartError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path).map_err(|e| {
        KassenwartError::Storage(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| {
        KassenwartError::Storage(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Write a JSON data file atomically
///
/// The temp file must live in the target directory; rename is only atomic
/// within one filesystem.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), KassenwartError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            KassenwartError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| KassenwartError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| KassenwartError::Storage(format!("Failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| KassenwartError::Storage(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| KassenwartError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        KassenwartError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}
