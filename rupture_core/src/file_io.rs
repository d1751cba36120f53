//! # File I/O Module
//!
//! Reading and writing `.lot` batch files (pretty-printed JSON).
//!
//! A `.lot` file never holds a torn write: saves land in a sibling `.tmp`
//! file that is fsynced and then renamed over the target. Loads check the
//! stored schema version before handing the batch back.
//!
//! The session model is single-user (one batch, one operator), so there is
//! no lock layer; the atomic rename alone is enough.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rupture_core::batch::Batch;
//! use rupture_core::file_io::{save_batch, load_batch};
//! use rupture_core::units::Cm2;
//! use std::path::Path;
//!
//! let batch = Batch::new("Obra Centro", Cm2(16.0));
//! let path = Path::new("obra_centro.lot");
//!
//! save_batch(&batch, path).unwrap();
//! let reloaded = load_batch(path).unwrap();
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use crate::batch::{Batch, SCHEMA_VERSION};
use crate::errors::{BatchError, BatchResult};

/// Save a batch to `path` without ever leaving a half-written `.lot` behind.
///
/// The JSON goes to a `.lot.tmp` sibling first, is fsynced, and only then
/// renamed onto the target. If the process dies mid-save, the worst case is
/// a stale `.tmp` next to an intact previous file.
pub fn save_batch(batch: &Batch, path: &Path) -> BatchResult<()> {
    let json = serde_json::to_string_pretty(batch).map_err(|e| BatchError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = path.with_extension("lot.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        BatchError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        BatchError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        BatchError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        // A failed rename must not leave the .tmp orphan behind
        let _ = fs::remove_file(&tmp_path);
        BatchError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Load a batch from a `.lot` file.
///
/// Fails with [`BatchError::FileError`] on I/O problems,
/// [`BatchError::SerializationError`] when the contents are not a valid
/// batch, and [`BatchError::VersionMismatch`] when the file was written by
/// an incompatible schema.
pub fn load_batch(path: &Path) -> BatchResult<Batch> {
    let mut file = File::open(path)
        .map_err(|e| BatchError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| BatchError::file_error("read", path.display().to_string(), e.to_string()))?;

    let batch: Batch =
        serde_json::from_str(&contents).map_err(|e| BatchError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&batch.meta.version)?;

    Ok(batch)
}

/// Check a stored schema version against [`SCHEMA_VERSION`].
fn validate_version(file_version: &str) -> BatchResult<()> {
    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(BatchError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    // Different major means a different schema outright
    if file_parts[0] != current_parts[0] {
        return Err(BatchError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    // While the schema is 0.x, minor bumps may break too; refuse files
    // stamped with a minor we have never seen
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(BatchError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    Ok(())
}
