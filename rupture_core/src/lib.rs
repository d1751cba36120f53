//! # rupture_core - Mortar Rupture Test Engine
//!
//! `rupture_core` records laboratory rupture-test measurements for mortar
//! specimens, converts raw loads (kgf) into engineering stress units
//! (kgf/cm², kN/cm², MPa), and drives the tabular, CSV, HTML, and PDF
//! report surfaces.
//!
//! ## Design Philosophy
//!
//! - **Explicit ownership**: a [`batch::Batch`] is an ordinary value the
//!   interactive shell owns and passes around; there is no hidden session
//!   singleton
//! - **Typed rejections**: every expected validation failure is a
//!   [`errors::BatchError`] variant, never a panic
//! - **JSON-First**: all domain types implement Serialize/Deserialize
//! - **Display decoupled**: consumers read records and `summary()`; they
//!   never derive stress values themselves
//!
//! ## Quick Start
//!
//! ```rust
//! use rupture_core::batch::Batch;
//! use rupture_core::units::{Cm2, Kgf};
//!
//! let mut batch = Batch::new("Residencial Jardim Tropical", Cm2(16.0));
//! batch.add_record("A039.258", Kgf(1600.0)).unwrap();
//!
//! let summary = batch.summary().unwrap();
//! assert!((summary.mean_mpa - 9.80665).abs() < 1e-9);
//! ```
//!
//! ## Modules
//!
//! - [`batch`] - Batch container, specimen records, aggregation operations
//! - [`conversion`] - Load/area to stress conversion
//! - [`units`] - Type-safe unit wrappers and conversion constants
//! - [`stats`] - Mean and population standard deviation
//! - [`export`] - CSV and HTML export, report file naming
//! - [`pdf`] - PDF report generation via Typst
//! - [`errors`] - Structured error types
//! - [`file_io`] - Batch file persistence with atomic saves

pub mod batch;
pub mod conversion;
pub mod errors;
pub mod export;
pub mod file_io;
pub mod pdf;
pub mod stats;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use batch::{Batch, BatchState, BatchSummary, SpecimenRecord, MAX_BATCH_SIZE};
pub use conversion::{convert, StressTriple};
pub use errors::{BatchError, BatchResult};
pub use file_io::{load_batch, save_batch};
