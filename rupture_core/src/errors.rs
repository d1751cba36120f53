//! # Error Types
//!
//! Structured error types for rupture_core. Every expected validation
//! failure is a typed value the caller inspects; nothing in this crate
//! raises a panic for bad user input.
//!
//! ## Example
//!
//! ```rust
//! use rupture_core::errors::{BatchError, BatchResult};
//!
//! fn validate_load(load_kgf: f64) -> BatchResult<()> {
//!     if load_kgf <= 0.0 {
//!         return Err(BatchError::InvalidLoad { load_kgf });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for rupture_core operations
pub type BatchResult<T> = Result<T, BatchError>;

/// Structured error type for batch and export operations.
///
/// Each variant carries enough context for the interactive layer to
/// render a precise user-facing message without string parsing.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum BatchError {
    /// Cross-sectional area is zero or negative; conversion is undefined
    #[error("Invalid area: {area_cm2} cm² - area must be positive")]
    InvalidArea { area_cm2: f64 },

    /// Rupture load is zero or negative
    #[error("Invalid load: {load_kgf} kgf - load must be positive")]
    InvalidLoad { load_kgf: f64 },

    /// Batch metadata is incomplete: the site name is unset
    #[error("Site name must be set before specimens can be recorded")]
    MissingSiteName,

    /// Specimen code is empty after trimming whitespace
    #[error("Specimen code must not be empty")]
    MissingCode,

    /// An input value is invalid (out of range, too long, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The batch already holds the maximum number of specimens
    #[error("Batch is full: capacity is {capacity} specimens")]
    BatchFull { capacity: usize },

    /// No record matched the given index or code
    #[error("Record not found: {target}")]
    RecordNotFound { target: String },

    /// Export rendering failed (data remains intact and exportable)
    #[error("Export failed ({format}): {reason}")]
    ExportFailed { format: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Batch file schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl BatchError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        BatchError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a RecordNotFound error
    pub fn record_not_found(target: impl Into<String>) -> Self {
        BatchError::RecordNotFound {
            target: target.into(),
        }
    }

    /// Create an ExportFailed error
    pub fn export_failed(format: impl Into<String>, reason: impl Into<String>) -> Self {
        BatchError::ExportFailed {
            format: format.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        BatchError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for validation failures the user can fix by correcting the entry
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BatchError::InvalidArea { .. }
                | BatchError::InvalidLoad { .. }
                | BatchError::MissingSiteName
                | BatchError::MissingCode
                | BatchError::InvalidInput { .. }
                | BatchError::BatchFull { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            BatchError::InvalidArea { .. } => "INVALID_AREA",
            BatchError::InvalidLoad { .. } => "INVALID_LOAD",
            BatchError::MissingSiteName => "MISSING_SITE_NAME",
            BatchError::MissingCode => "MISSING_CODE",
            BatchError::InvalidInput { .. } => "INVALID_INPUT",
            BatchError::BatchFull { .. } => "BATCH_FULL",
            BatchError::RecordNotFound { .. } => "RECORD_NOT_FOUND",
            BatchError::ExportFailed { .. } => "EXPORT_FAILED",
            BatchError::FileError { .. } => "FILE_ERROR",
            BatchError::SerializationError { .. } => "SERIALIZATION_ERROR",
            BatchError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}
