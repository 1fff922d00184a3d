#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Energy content of hydrogen used to size daily production, kWh per kg.
pub const KWH_PER_KG_H2: f64 = 33.33;

/// Decimals shown for each reported quantity.
pub const HYDROGEN_DECIMALS: u32 = 1;
pub const ELECTROLYZER_DECIMALS: u32 = 2;
pub const TURBINE_DECIMALS: u32 = 1;

/// Ratio between the turbine swept surface and the electrolyzer surface.
pub const TURBINE_SURFACE_FACTOR: f64 = 100.0;

/// Input that failed the range checks; carries the field name for reporting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
}

fn check_non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field, value });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}

/// Daily energy requirement, kWh/day.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct EnergyDemand(f64);

impl EnergyDemand {
    pub fn new(kwh_per_day: f64) -> Result<Self, ValidationError> {
        check_non_negative("energy demand", kwh_per_day).map(Self)
    }

    pub fn kwh_per_day(self) -> f64 {
        self.0
    }

    /// Mass of hydrogen whose energy content matches this demand.
    pub fn hydrogen_mass(self) -> HydrogenMass {
        HydrogenMass(self.0 / KWH_PER_KG_H2)
    }
}

impl TryFrom<f64> for EnergyDemand {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EnergyDemand> for f64 {
    fn from(value: EnergyDemand) -> Self {
        value.0
    }
}

/// Average wind speed at the site, m/s.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct WindSpeed(f64);

impl WindSpeed {
    pub fn new(m_per_s: f64) -> Result<Self, ValidationError> {
        check_non_negative("wind speed", m_per_s).map(Self)
    }

    pub fn m_per_s(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for WindSpeed {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WindSpeed> for f64 {
    fn from(value: WindSpeed) -> Self {
        value.0
    }
}

/// Daily hydrogen production, kg/day. Only obtainable from an [`EnergyDemand`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(into = "f64")]
pub struct HydrogenMass(f64);

impl HydrogenMass {
    pub fn kg_per_day(self) -> f64 {
        self.0
    }
}

impl From<HydrogenMass> for f64 {
    fn from(value: HydrogenMass) -> Self {
        value.0
    }
}

/// Round to `decimals` places, ties to even.
///
/// Matches the usual scientific-display convention: scale, round to the
/// nearest integer (halves go to the even neighbour), scale back. Values too
/// large to scale already have no fractional digits and come back unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    let scaled = value * scale;
    if !scaled.is_finite() || value.abs() >= F64_INTEGRAL_THRESHOLD {
        return value;
    }
    scaled.round_ties_even() / scale
}

/// Every f64 at or above 2^52 in magnitude is an integer.
const F64_INTEGRAL_THRESHOLD: f64 = 4_503_599_627_370_496.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hydrogen_mass_from_demand() {
        let demand = EnergyDemand::new(100.0).unwrap();
        let mass = demand.hydrogen_mass();
        assert_eq!(mass.kg_per_day(), 100.0 / 33.33);
        assert_eq!(round_to(mass.kg_per_day(), HYDROGEN_DECIMALS), 3.0);
    }

    #[test]
    fn test_zero_inputs_are_valid() {
        let demand = EnergyDemand::new(0.0).unwrap();
        assert_eq!(demand.hydrogen_mass().kg_per_day(), 0.0);
        assert!(WindSpeed::new(0.0).is_ok());
    }

    #[test]
    fn test_rejects_negative_and_non_finite() {
        assert_eq!(
            EnergyDemand::new(-1.0),
            Err(ValidationError::Negative {
                field: "energy demand",
                value: -1.0
            })
        );
        assert!(matches!(
            WindSpeed::new(-1.0),
            Err(ValidationError::Negative { field: "wind speed", .. })
        ));
        assert!(matches!(
            EnergyDemand::new(f64::NAN),
            Err(ValidationError::NonFinite { .. })
        ));
        assert!(matches!(
            WindSpeed::new(f64::INFINITY),
            Err(ValidationError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(123.456, 1), 123.5);
        assert_eq!(round_to(-0.04, 1), -0.0);
        // exact binary tie goes to the even neighbour
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(2.5, 0), 2.0);
    }

    #[test]
    fn test_round_to_keeps_huge_values_finite() {
        let huge = 3.0003e306;
        assert_eq!(round_to(huge, 2), huge);
        assert_eq!(round_to(-f64::MAX, 1), -f64::MAX);
        assert_eq!(round_to(9_007_199_254_740_994.0, 2), 9_007_199_254_740_994.0);
        assert!(round_to(f64::MAX / 50.0, 2).is_finite());
    }

    #[test]
    fn test_serde_rejects_negative_demand() {
        let ok: EnergyDemand = serde_json::from_str("12.5").unwrap();
        assert_eq!(ok.kwh_per_day(), 12.5);
        assert!(serde_json::from_str::<EnergyDemand>("-3").is_err());
    }
}
