//! # Unit Types
//!
//! Type-safe wrappers for the units used in mortar rupture testing.
//! Lightweight newtypes over `f64` with transparent JSON serialization.
//!
//! ## Units
//!
//! Instruments report the rupture load in kilogram-force (kgf); specimen
//! geometry is in square centimeters. Stress is computed in kgf/cm² and
//! converted to SI units:
//!
//! - 1 kgf/cm² = 0.00980665 kN/cm²
//! - 1 kgf/cm² = 0.0980665 MPa
//!
//! The two constants are the standard gravitational conversion factors and
//! are load-bearing; their exact values are part of the crate's contract.
//!
//! ## Example
//!
//! ```rust
//! use rupture_core::units::{KgfPerCm2, MPa};
//!
//! let stress = KgfPerCm2(100.0);
//! let mpa: MPa = stress.into();
//! assert!((mpa.0 - 9.80665).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// kgf/cm² → MPa conversion factor
pub const KGF_CM2_TO_MPA: f64 = 0.0980665;

/// kgf/cm² → kN/cm² conversion factor
pub const KGF_CM2_TO_KN_CM2: f64 = 0.00980665;

// ============================================================================
// Force and Area
// ============================================================================

/// Force in kilogram-force (raw instrument reading)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kgf(pub f64);

/// Area in square centimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cm2(pub f64);

// ============================================================================
// Stress Units
// ============================================================================

/// Stress in kgf per square centimeter
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgfPerCm2(pub f64);

/// Stress in kilonewtons per square centimeter
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnPerCm2(pub f64);

/// Stress in megapascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MPa(pub f64);

impl From<KgfPerCm2> for KnPerCm2 {
    fn from(s: KgfPerCm2) -> Self {
        KnPerCm2(s.0 * KGF_CM2_TO_KN_CM2)
    }
}

impl From<KgfPerCm2> for MPa {
    fn from(s: KgfPerCm2) -> Self {
        MPa(s.0 * KGF_CM2_TO_MPA)
    }
}

impl From<KnPerCm2> for KgfPerCm2 {
    fn from(s: KnPerCm2) -> Self {
        KgfPerCm2(s.0 / KGF_CM2_TO_KN_CM2)
    }
}

impl From<MPa> for KgfPerCm2 {
    fn from(s: MPa) -> Self {
        KgfPerCm2(s.0 / KGF_CM2_TO_MPA)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Kgf);
impl_arithmetic!(Cm2);
impl_arithmetic!(KgfPerCm2);
impl_arithmetic!(KnPerCm2);
impl_arithmetic!(MPa);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kgf_cm2_to_si() {
        let s = KgfPerCm2(1.0);
        let kn: KnPerCm2 = s.into();
        let mpa: MPa = s.into();
        assert_eq!(kn.0, 0.00980665);
        assert_eq!(mpa.0, 0.0980665);
    }

    #[test]
    fn test_si_conversion_ratio() {
        // kN/cm² and MPa differ by exactly a factor of ten
        assert_eq!(KGF_CM2_TO_KN_CM2 * 10.0, KGF_CM2_TO_MPA);
    }

    #[test]
    fn test_arithmetic() {
        let a = Kgf(1600.0);
        let b = Kgf(400.0);
        assert_eq!((a + b).0, 2000.0);
        assert_eq!((a - b).0, 1200.0);
        assert_eq!((a * 2.0).0, 3200.0);
        assert_eq!((a / 2.0).0, 800.0);
    }

    #[test]
    fn test_serialization() {
        let area = Cm2(16.0);
        let json = serde_json::to_string(&area).unwrap();
        assert_eq!(json, "16.0");

        let roundtrip: Cm2 = serde_json::from_str(&json).unwrap();
        assert_eq!(area, roundtrip);
    }
}
