//! # Batch Data Structures
//!
//! The `Batch` struct is the root container for one construction-site lot
//! of mortar rupture tests. Batches serialize to `.lot` files as
//! human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Batch
//! ├── id: Uuid
//! ├── meta: BatchMetadata (version, site, dates, default area, timestamps)
//! └── records: Vec<SpecimenRecord> (ordered, at most 12)
//! ```
//!
//! Records are an ordered `Vec`, not a map: insertion order is part of the
//! contract (the report table and chart follow entry order), and specimen
//! codes are not unique.
//!
//! ## Example
//!
//! ```rust
//! use rupture_core::batch::Batch;
//! use rupture_core::units::{Cm2, Kgf};
//!
//! let mut batch = Batch::new("Residencial Jardim Tropical", Cm2(16.0));
//! batch.add_record("A039.258", Kgf(1600.0)).unwrap();
//!
//! let summary = batch.summary().unwrap();
//! assert_eq!(summary.count, 1);
//! assert_eq!(summary.stddev_mpa, 0.0);
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversion::{convert, StressTriple};
use crate::errors::{BatchError, BatchResult};
use crate::stats;
use crate::units::{Cm2, Kgf};

/// Current schema version for .lot files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Maximum number of specimens in one batch
pub const MAX_BATCH_SIZE: usize = 12;

/// Maximum specimen code length in characters
pub const MAX_CODE_LEN: usize = 32;

/// One physical rupture-test result.
///
/// `area_cm2` is captured from the batch default at the time the record is
/// created; changing the batch default later does not touch it. The three
/// derived stress fields are always mutually consistent with
/// `load_kgf / area_cm2` (see [`crate::conversion`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecimenRecord {
    /// Specimen code as printed on the mold (e.g., "A039.258", "H682").
    /// Not unique within a batch.
    pub code: String,

    /// Raw measured rupture load
    pub load_kgf: Kgf,

    /// Cross-sectional area at record creation time
    pub area_cm2: Cm2,

    /// Derived stress in all three units
    pub stress: StressTriple,

    /// When the specimen was molded, if tracked for this batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molding_date: Option<NaiveDate>,

    /// When the specimen was ruptured, if tracked for this batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rupture_date: Option<NaiveDate>,
}

impl SpecimenRecord {
    /// Specimen age in days at rupture, clamped at zero.
    ///
    /// `None` when either lifecycle date is not tracked.
    pub fn age_days(&self) -> Option<i64> {
        let molding = self.molding_date?;
        let rupture = self.rupture_date?;
        Some((rupture - molding).num_days().max(0))
    }
}

/// Batch metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Construction-site name; must be non-empty before specimens are added
    pub site_name: String,

    /// Date the batch was tested
    pub batch_date: NaiveDate,

    /// Default specimen cross-sectional area for new records
    pub default_area_cm2: Cm2,

    /// Molding date applied to new records, if tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molding_date: Option<NaiveDate>,

    /// Rupture date applied to new records, if tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rupture_date: Option<NaiveDate>,

    /// When the batch was created
    pub created: DateTime<Utc>,

    /// When the batch was last modified
    pub modified: DateTime<Utc>,
}

/// Capacity state of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchState {
    /// No records yet
    Empty,
    /// 0 < size < capacity; records may still be added
    Accepting,
    /// Capacity reached; only edit/remove/clear/recompute are permitted
    Full,
}

/// Derived summary statistics over a non-empty batch.
///
/// Standard deviations use the population form (divisor N): the batch is
/// the entire population of interest, not a sample. One record has zero
/// spread by definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Mean stress in kN/cm²
    pub mean_kn_cm2: f64,
    /// Mean stress in MPa
    pub mean_mpa: f64,
    /// Population standard deviation in kN/cm²
    pub stddev_kn_cm2: f64,
    /// Population standard deviation in MPa
    pub stddev_mpa: f64,
    /// Number of records summarized
    pub count: usize,
}

/// Root batch container: one site's lot of at most 12 specimens.
///
/// All mutation goes through the methods here; consumers (table, chart,
/// CSV/PDF export) read the record list and `summary()` and never derive
/// stress values themselves. Single-writer, run-to-completion: every
/// operation is a synchronous step over in-memory data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// Stable batch identity (used in report file names)
    pub id: Uuid,

    /// Batch metadata (site, dates, default area)
    pub meta: BatchMetadata,

    /// Ordered specimen records; mutate only through batch operations
    records: Vec<SpecimenRecord>,

    /// Bumped on every mutation; exports record the revision they rendered
    /// so stale artifacts are detectable
    revision: u64,
}

impl Batch {
    /// Create a new empty batch dated today.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rupture_core::batch::{Batch, BatchState};
    /// use rupture_core::units::Cm2;
    ///
    /// let batch = Batch::new("Obra Centro", Cm2(16.0));
    /// assert_eq!(batch.state(), BatchState::Empty);
    /// ```
    pub fn new(site_name: impl Into<String>, default_area_cm2: Cm2) -> Self {
        Batch::with_date(site_name, Local::now().date_naive(), default_area_cm2)
    }

    /// Create a new empty batch with an explicit batch date.
    pub fn with_date(
        site_name: impl Into<String>,
        batch_date: NaiveDate,
        default_area_cm2: Cm2,
    ) -> Self {
        let now = Utc::now();
        Batch {
            id: Uuid::new_v4(),
            meta: BatchMetadata {
                version: SCHEMA_VERSION.to_string(),
                site_name: site_name.into(),
                batch_date,
                default_area_cm2,
                molding_date: None,
                rupture_date: None,
                created: now,
                modified: now,
            },
            records: Vec::new(),
            revision: 0,
        }
    }

    /// The ordered record list (insertion order, never reordered).
    pub fn records(&self) -> &[SpecimenRecord] {
        &self.records
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Capacity state: `Empty`, `Accepting`, or `Full`.
    pub fn state(&self) -> BatchState {
        match self.records.len() {
            0 => BatchState::Empty,
            n if n < MAX_BATCH_SIZE => BatchState::Accepting,
            _ => BatchState::Full,
        }
    }

    /// Mutation counter. Any export rendered at an older revision is stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.meta.modified = Utc::now();
        self.revision += 1;
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    /// Update the site name (trimmed).
    pub fn set_site_name(&mut self, site_name: impl Into<String>) {
        self.meta.site_name = site_name.into().trim().to_string();
        self.touch();
    }

    /// Update the batch date.
    pub fn set_batch_date(&mut self, date: NaiveDate) {
        self.meta.batch_date = date;
        self.touch();
    }

    /// Change the default area for *new* records.
    ///
    /// Existing records keep the area they were created with; use
    /// [`Batch::recompute_with_area`] to rewrite them.
    pub fn set_default_area(&mut self, area_cm2: Cm2) -> BatchResult<()> {
        if area_cm2.0 <= 0.0 {
            return Err(BatchError::InvalidArea {
                area_cm2: area_cm2.0,
            });
        }
        self.meta.default_area_cm2 = area_cm2;
        self.touch();
        Ok(())
    }

    /// Set the lifecycle dates stamped onto records created from now on.
    ///
    /// `None` means the date is not tracked for this batch.
    pub fn set_lifecycle_dates(
        &mut self,
        molding_date: Option<NaiveDate>,
        rupture_date: Option<NaiveDate>,
    ) {
        self.meta.molding_date = molding_date;
        self.meta.rupture_date = rupture_date;
        self.touch();
    }

    /// Stamp the batch's current lifecycle dates onto every existing
    /// record, overwriting whatever each record carried (including
    /// clearing them when the batch no longer tracks dates). Returns the
    /// number of records touched; 0 on an empty batch.
    ///
    /// Loads, areas, and stress fields are untouched.
    pub fn restamp_lifecycle_dates(&mut self) -> usize {
        for record in &mut self.records {
            record.molding_date = self.meta.molding_date;
            record.rupture_date = self.meta.rupture_date;
        }
        let touched = self.records.len();
        if touched > 0 {
            self.touch();
        }
        touched
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Add a specimen using the batch's current default area.
    ///
    /// Constraints are checked in order, first failure wins:
    /// site name set → capacity → code non-empty → code length → load
    /// positive → area valid. On success the record is appended and a
    /// reference to it is returned.
    pub fn add_record(&mut self, code: impl AsRef<str>, load_kgf: Kgf) -> BatchResult<&SpecimenRecord> {
        let area = self.meta.default_area_cm2;
        self.add_record_with_area(code, load_kgf, area)
    }

    /// Add a specimen with an explicit area (overriding the batch default).
    pub fn add_record_with_area(
        &mut self,
        code: impl AsRef<str>,
        load_kgf: Kgf,
        area_cm2: Cm2,
    ) -> BatchResult<&SpecimenRecord> {
        if self.meta.site_name.trim().is_empty() {
            return Err(BatchError::MissingSiteName);
        }
        if self.records.len() >= MAX_BATCH_SIZE {
            return Err(BatchError::BatchFull {
                capacity: MAX_BATCH_SIZE,
            });
        }
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(BatchError::MissingCode);
        }
        if code.chars().count() > MAX_CODE_LEN {
            return Err(BatchError::invalid_input(
                "code",
                code,
                format!("specimen code is limited to {MAX_CODE_LEN} characters"),
            ));
        }
        if load_kgf.0 <= 0.0 {
            return Err(BatchError::InvalidLoad {
                load_kgf: load_kgf.0,
            });
        }
        let stress = convert(load_kgf, area_cm2).ok_or(BatchError::InvalidArea {
            area_cm2: area_cm2.0,
        })?;

        self.records.push(SpecimenRecord {
            code: code.to_string(),
            load_kgf,
            area_cm2,
            stress,
            molding_date: self.meta.molding_date,
            rupture_date: self.meta.rupture_date,
        });
        self.touch();
        let index = self.records.len() - 1;
        Ok(&self.records[index])
    }

    /// Overwrite every record's area and rederive its stress fields from
    /// that record's own load. Returns the number of records touched
    /// (0 on an empty batch, which is a legal no-op).
    pub fn recompute_with_area(&mut self, new_area_cm2: Cm2) -> BatchResult<usize> {
        if new_area_cm2.0 <= 0.0 {
            return Err(BatchError::InvalidArea {
                area_cm2: new_area_cm2.0,
            });
        }
        for record in &mut self.records {
            record.area_cm2 = new_area_cm2;
            // area > 0 was checked above, so convert cannot fail here
            if let Some(stress) = convert(record.load_kgf, new_area_cm2) {
                record.stress = stress;
            }
        }
        let touched = self.records.len();
        if touched > 0 {
            self.touch();
        }
        Ok(touched)
    }

    /// Replace one record's raw inputs by list position and rederive its
    /// stress fields. Sibling records are untouched.
    pub fn edit_record(
        &mut self,
        index: usize,
        new_load_kgf: Kgf,
        new_area_cm2: Cm2,
    ) -> BatchResult<()> {
        if index >= self.records.len() {
            return Err(BatchError::record_not_found(format!("index {index}")));
        }
        if new_load_kgf.0 <= 0.0 {
            return Err(BatchError::InvalidLoad {
                load_kgf: new_load_kgf.0,
            });
        }
        let stress = convert(new_load_kgf, new_area_cm2).ok_or(BatchError::InvalidArea {
            area_cm2: new_area_cm2.0,
        })?;
        let record = &mut self.records[index];
        record.load_kgf = new_load_kgf;
        record.area_cm2 = new_area_cm2;
        record.stress = stress;
        self.touch();
        Ok(())
    }

    /// Replace the first record whose code matches, by code.
    pub fn edit_record_by_code(
        &mut self,
        code: &str,
        new_load_kgf: Kgf,
        new_area_cm2: Cm2,
    ) -> BatchResult<()> {
        let index = self
            .records
            .iter()
            .position(|r| r.code == code)
            .ok_or_else(|| BatchError::record_not_found(format!("code '{code}'")))?;
        self.edit_record(index, new_load_kgf, new_area_cm2)
    }

    /// Remove every record whose code is in the given set.
    ///
    /// Duplicate codes are all removed in one call. Returns the number of
    /// records removed.
    pub fn remove_records(&mut self, codes: &BTreeSet<String>) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !codes.contains(&r.code));
        let removed = before - self.records.len();
        if removed > 0 {
            self.touch();
        }
        removed
    }

    /// Empty the batch. Any previously generated export artifact becomes
    /// stale (the revision advances).
    pub fn clear(&mut self) {
        if !self.records.is_empty() {
            self.records.clear();
            self.touch();
        }
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// Summary statistics, or `None` for an empty batch.
    pub fn summary(&self) -> Option<BatchSummary> {
        let kn: Vec<f64> = self.records.iter().map(|r| r.stress.kn_cm2.0).collect();
        let mpa: Vec<f64> = self.records.iter().map(|r| r.stress.mpa.0).collect();
        Some(BatchSummary {
            mean_kn_cm2: stats::mean(&kn)?,
            mean_mpa: stats::mean(&mpa)?,
            stddev_kn_cm2: stats::pstdev(&kn)?,
            stddev_mpa: stats::pstdev(&mpa)?,
            count: self.records.len(),
        })
    }

    /// Ordered `(code, mpa)` pairs for the chart layer.
    ///
    /// An empty batch yields an empty vec, not an error.
    pub fn chart_points(&self) -> Vec<(&str, f64)> {
        self.records
            .iter()
            .map(|r| (r.code.as_str(), r.stress.mpa.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_batch() -> Batch {
        Batch::with_date(
            "Residencial Jardim Tropical",
            NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            Cm2(16.0),
        )
    }

    #[test]
    fn test_add_and_summary_scenario() {
        let mut batch = test_batch();
        batch.add_record("A1", Kgf(1600.0)).unwrap();
        batch.add_record("A2", Kgf(2000.0)).unwrap();

        let summary = batch.summary().unwrap();
        assert_eq!(summary.count, 2);
        assert!((summary.mean_mpa - 11.032481).abs() < 1e-5);
        assert!((summary.stddev_mpa - 1.225831).abs() < 1e-5);
    }

    #[test]
    fn test_empty_summary_is_none() {
        let batch = test_batch();
        assert!(batch.summary().is_none());
        assert!(batch.chart_points().is_empty());
    }

    #[test]
    fn test_single_record_stddev_is_exactly_zero() {
        let mut batch = test_batch();
        batch.add_record("A1", Kgf(1600.0)).unwrap();
        let summary = batch.summary().unwrap();
        assert_eq!(summary.stddev_mpa, 0.0);
        assert_eq!(summary.stddev_kn_cm2, 0.0);
    }

    #[test]
    fn test_capacity_enforcement() {
        let mut batch = test_batch();
        for i in 0..MAX_BATCH_SIZE {
            batch.add_record(format!("CP-{i}"), Kgf(1000.0)).unwrap();
        }
        assert_eq!(batch.state(), BatchState::Full);

        let err = batch.add_record("CP-13", Kgf(1000.0)).unwrap_err();
        assert_eq!(err, BatchError::BatchFull { capacity: 12 });
        assert_eq!(batch.len(), 12);
    }

    #[test]
    fn test_validation_order_first_failure_wins() {
        let mut batch = Batch::new("", Cm2(16.0));
        // Site name missing beats everything else
        let err = batch.add_record("", Kgf(-1.0)).unwrap_err();
        assert_eq!(err, BatchError::MissingSiteName);

        let mut batch = test_batch();
        let err = batch.add_record("   ", Kgf(-1.0)).unwrap_err();
        assert_eq!(err, BatchError::MissingCode);

        let err = batch.add_record("A1", Kgf(0.0)).unwrap_err();
        assert_eq!(err, BatchError::InvalidLoad { load_kgf: 0.0 });

        let err = batch
            .add_record_with_area("A1", Kgf(100.0), Cm2(-5.0))
            .unwrap_err();
        assert_eq!(err, BatchError::InvalidArea { area_cm2: -5.0 });
        assert!(batch.is_empty());
    }

    #[test]
    fn test_code_length_limit() {
        let mut batch = test_batch();
        let long_code = "X".repeat(MAX_CODE_LEN + 1);
        let err = batch.add_record(&long_code, Kgf(100.0)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        // Exactly at the limit is fine
        batch.add_record("Y".repeat(MAX_CODE_LEN), Kgf(100.0)).unwrap();
    }

    #[test]
    fn test_duplicate_codes_allowed() {
        let mut batch = test_batch();
        batch.add_record("X", Kgf(100.0)).unwrap();
        batch.add_record("X", Kgf(200.0)).unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_default_area_change_does_not_touch_records() {
        let mut batch = test_batch();
        batch.add_record("A1", Kgf(1600.0)).unwrap();
        batch.set_default_area(Cm2(25.0)).unwrap();

        assert_eq!(batch.records()[0].area_cm2, Cm2(16.0));
        assert_eq!(batch.records()[0].stress.kgf_cm2.0, 100.0);

        // New records pick up the new default
        batch.add_record("A2", Kgf(2500.0)).unwrap();
        assert_eq!(batch.records()[1].area_cm2, Cm2(25.0));
        assert_eq!(batch.records()[1].stress.kgf_cm2.0, 100.0);
    }

    #[test]
    fn test_recompute_with_area() {
        let mut batch = test_batch();
        batch.add_record("A1", Kgf(1600.0)).unwrap();
        batch.add_record("A2", Kgf(2000.0)).unwrap();

        let touched = batch.recompute_with_area(Cm2(20.0)).unwrap();
        assert_eq!(touched, 2);
        assert_eq!(batch.records()[0].area_cm2, Cm2(20.0));
        assert_eq!(batch.records()[0].stress.kgf_cm2.0, 80.0);
        assert_eq!(batch.records()[1].stress.kgf_cm2.0, 100.0);
    }

    #[test]
    fn test_recompute_idempotence() {
        let mut batch = test_batch();
        batch.add_record("A1", Kgf(1600.0)).unwrap();
        batch.add_record("A2", Kgf(2000.0)).unwrap();

        batch.recompute_with_area(Cm2(20.0)).unwrap();
        let first_pass = batch.records().to_vec();
        batch.recompute_with_area(Cm2(20.0)).unwrap();
        assert_eq!(batch.records(), first_pass.as_slice());
    }

    #[test]
    fn test_recompute_empty_is_noop() {
        let mut batch = test_batch();
        assert_eq!(batch.recompute_with_area(Cm2(20.0)).unwrap(), 0);
    }

    #[test]
    fn test_recompute_rejects_invalid_area() {
        let mut batch = test_batch();
        batch.add_record("A1", Kgf(1600.0)).unwrap();
        let err = batch.recompute_with_area(Cm2(0.0)).unwrap_err();
        assert_eq!(err, BatchError::InvalidArea { area_cm2: 0.0 });
        // Record untouched
        assert_eq!(batch.records()[0].area_cm2, Cm2(16.0));
    }

    #[test]
    fn test_edit_record() {
        let mut batch = test_batch();
        batch.add_record("A1", Kgf(1600.0)).unwrap();
        batch.add_record("A2", Kgf(2000.0)).unwrap();

        batch.edit_record(0, Kgf(1800.0), Cm2(16.0)).unwrap();
        assert_eq!(batch.records()[0].load_kgf, Kgf(1800.0));
        assert_eq!(batch.records()[0].stress.kgf_cm2.0, 112.5);
        // Sibling untouched
        assert_eq!(batch.records()[1].load_kgf, Kgf(2000.0));

        let err = batch.edit_record(5, Kgf(100.0), Cm2(16.0)).unwrap_err();
        assert_eq!(err.error_code(), "RECORD_NOT_FOUND");
    }

    #[test]
    fn test_edit_record_by_code() {
        let mut batch = test_batch();
        batch.add_record("A1", Kgf(1600.0)).unwrap();
        batch.edit_record_by_code("A1", Kgf(3200.0), Cm2(16.0)).unwrap();
        assert_eq!(batch.records()[0].stress.kgf_cm2.0, 200.0);

        let err = batch
            .edit_record_by_code("ZZ", Kgf(100.0), Cm2(16.0))
            .unwrap_err();
        assert_eq!(err.error_code(), "RECORD_NOT_FOUND");
    }

    #[test]
    fn test_remove_by_code_with_duplicates() {
        let mut batch = test_batch();
        batch.add_record("X", Kgf(100.0)).unwrap();
        batch.add_record("X", Kgf(200.0)).unwrap();
        batch.add_record("Y", Kgf(300.0)).unwrap();

        let codes: BTreeSet<String> = ["X".to_string()].into_iter().collect();
        let removed = batch.remove_records(&codes);
        assert_eq!(removed, 2);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records()[0].code, "Y");
    }

    #[test]
    fn test_clear_returns_to_empty() {
        let mut batch = test_batch();
        for i in 0..MAX_BATCH_SIZE {
            batch.add_record(format!("CP-{i}"), Kgf(1000.0)).unwrap();
        }
        assert_eq!(batch.state(), BatchState::Full);
        batch.clear();
        assert_eq!(batch.state(), BatchState::Empty);
        // Accepting again after clear
        batch.add_record("CP-0", Kgf(1000.0)).unwrap();
        assert_eq!(batch.state(), BatchState::Accepting);
    }

    #[test]
    fn test_revision_advances_on_mutation() {
        let mut batch = test_batch();
        let r0 = batch.revision();
        batch.add_record("A1", Kgf(1600.0)).unwrap();
        let r1 = batch.revision();
        assert!(r1 > r0);

        // Rejected adds do not advance the revision
        let _ = batch.add_record("", Kgf(1600.0));
        assert_eq!(batch.revision(), r1);

        batch.clear();
        assert!(batch.revision() > r1);
    }

    #[test]
    fn test_lifecycle_dates_and_age() {
        let mut batch = test_batch();
        let molding = NaiveDate::from_ymd_opt(2024, 7, 18).unwrap();
        let rupture = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        batch.set_lifecycle_dates(Some(molding), Some(rupture));

        batch.add_record("A1", Kgf(1600.0)).unwrap();
        assert_eq!(batch.records()[0].age_days(), Some(28));

        // Rupture before molding clamps to zero, not negative
        batch.set_lifecycle_dates(Some(rupture), Some(molding));
        batch.add_record("A2", Kgf(1600.0)).unwrap();
        assert_eq!(batch.records()[1].age_days(), Some(0));
    }

    #[test]
    fn test_restamp_applies_dates_to_existing_records() {
        let mut batch = test_batch();
        batch.add_record("A1", Kgf(1600.0)).unwrap();
        batch.add_record("A2", Kgf(2000.0)).unwrap();
        assert_eq!(batch.records()[0].age_days(), None);

        let molding = NaiveDate::from_ymd_opt(2024, 7, 18).unwrap();
        let rupture = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        batch.set_lifecycle_dates(Some(molding), Some(rupture));

        // Setting dates alone leaves earlier records untouched
        assert_eq!(batch.records()[0].age_days(), None);

        let before = batch.revision();
        assert_eq!(batch.restamp_lifecycle_dates(), 2);
        assert!(batch.revision() > before);
        assert_eq!(batch.records()[0].age_days(), Some(28));
        assert_eq!(batch.records()[1].age_days(), Some(28));

        // Restamping after dates are cleared removes them again
        batch.set_lifecycle_dates(None, None);
        batch.restamp_lifecycle_dates();
        assert_eq!(batch.records()[0].age_days(), None);
    }

    #[test]
    fn test_restamp_empty_batch_is_inert() {
        let mut batch = test_batch();
        let before = batch.revision();
        assert_eq!(batch.restamp_lifecycle_dates(), 0);
        assert_eq!(batch.revision(), before);
    }

    #[test]
    fn test_untracked_dates_are_absent() {
        let mut batch = test_batch();
        batch.add_record("A1", Kgf(1600.0)).unwrap();
        assert_eq!(batch.records()[0].age_days(), None);
    }

    #[test]
    fn test_batch_serialization_roundtrip() {
        let mut batch = test_batch();
        batch.add_record("A039.258", Kgf(1600.0)).unwrap();

        let json = serde_json::to_string_pretty(&batch).unwrap();
        assert!(json.contains("Residencial Jardim Tropical"));

        let roundtrip: Batch = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.len(), 1);
        assert_eq!(roundtrip.records()[0].code, "A039.258");
        assert_eq!(roundtrip.records()[0].stress, batch.records()[0].stress);
    }
}
