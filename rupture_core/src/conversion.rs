//! # Stress Conversion
//!
//! Converts one (rupture load, cross-sectional area) pair into the three
//! stress representations used throughout the crate.
//!
//! ## Contract
//!
//! - The conversion never rounds; display rounding belongs to the
//!   presentation layer.
//! - A non-positive area yields `None` rather than an error or a panic.
//!   Callers must check before using the values.
//!
//! ## Example
//!
//! ```rust
//! use rupture_core::conversion::convert;
//! use rupture_core::units::{Cm2, Kgf};
//!
//! let stress = convert(Kgf(1600.0), Cm2(16.0)).unwrap();
//! assert_eq!(stress.kgf_cm2.0, 100.0);
//! assert!((stress.mpa.0 - 9.80665).abs() < 1e-12);
//!
//! assert!(convert(Kgf(100.0), Cm2(0.0)).is_none());
//! ```

use serde::{Deserialize, Serialize};

use crate::units::{Cm2, Kgf, KgfPerCm2, KnPerCm2, MPa};

/// One stress measurement expressed in all three supported units.
///
/// The three fields are always mutually consistent:
/// `kn_cm2 = kgf_cm2 × 0.00980665` and `mpa = kgf_cm2 × 0.0980665`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressTriple {
    /// Stress in kgf/cm² (load divided by area)
    pub kgf_cm2: KgfPerCm2,
    /// Stress in kN/cm²
    pub kn_cm2: KnPerCm2,
    /// Stress in MPa
    pub mpa: MPa,
}

/// Convert a rupture load and specimen area into the three stress units.
///
/// Returns `None` when `area_cm2 <= 0` (division undefined). The caller is
/// expected to have validated `load_kgf > 0`; this function only guards
/// the division.
pub fn convert(load_kgf: Kgf, area_cm2: Cm2) -> Option<StressTriple> {
    if area_cm2.0 <= 0.0 {
        return None;
    }
    let kgf_cm2 = KgfPerCm2(load_kgf.0 / area_cm2.0);
    Some(StressTriple {
        kgf_cm2,
        kn_cm2: kgf_cm2.into(),
        mpa: kgf_cm2.into(),
    })
}
