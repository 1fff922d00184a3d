#![forbid(unsafe_code)]

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::model::{FeatureRow, ModelError, Regressor};
use crate::quantities::{
    round_to, EnergyDemand, ValidationError, WindSpeed, ELECTROLYZER_DECIMALS, HYDROGEN_DECIMALS,
    TURBINE_DECIMALS, TURBINE_SURFACE_FACTOR,
};

/// Either the request was bad, or the model could not answer it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),
}

impl PipelineError {
    /// Validation failures only concern the offending request.
    pub fn is_validation(&self) -> bool {
        matches!(self, PipelineError::Validation(_))
    }
}

/// Everything one prediction produces.
///
/// The three display fields are rounded; `raw_prediction` and the inputs are
/// kept as computed so callers can audit the rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizingReport {
    pub energy_kwh_per_day: f64,
    pub wind_speed_m_s: f64,
    pub hydrogen_mass_kg_per_day: f64,
    pub electrolyzer_surface_m2: f64,
    pub turbine_surface_m2: f64,
    pub raw_prediction: f64,
}

/// Input validation, hydrogen derivation, inference, display rounding.
///
/// The model is injected at construction and only read afterwards, so one
/// pipeline (or many sharing an `Arc` model) can serve any number of calls.
#[derive(Debug, Clone)]
pub struct PredictionPipeline<M>
where
    M: Regressor,
{
    model: M,
}

impl<M> PredictionPipeline<M>
where
    M: Regressor,
{
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Size the system for a daily energy demand (kWh/day) and wind speed (m/s).
    pub fn predict(
        &self,
        energy_kwh_per_day: f64,
        wind_speed_m_s: f64,
    ) -> Result<SizingReport, PipelineError> {
        let demand = EnergyDemand::new(energy_kwh_per_day)?;
        let wind = WindSpeed::new(wind_speed_m_s)?;
        self.predict_validated(demand, wind)
    }

    /// Same as [`predict`](Self::predict) for inputs that are already validated.
    pub fn predict_validated(
        &self,
        demand: EnergyDemand,
        wind: WindSpeed,
    ) -> Result<SizingReport, PipelineError> {
        let width = self.model.n_features();
        if width != FeatureRow::LEN {
            return Err(ModelError::Invalid(format!(
                "model expects {width} features, pipeline supplies {}",
                FeatureRow::LEN
            ))
            .into());
        }

        let hydrogen = demand.hydrogen_mass();
        // Model sees the unrounded mass; rounding is for display only.
        let row = FeatureRow::new(hydrogen, wind);
        let raw = self.model.predict(&row)?;
        let turbine_raw = raw * TURBINE_SURFACE_FACTOR;
        if !turbine_raw.is_finite() {
            return Err(ModelError::Inference(format!(
                "prediction {raw} overflows the turbine surface"
            ))
            .into());
        }

        let report = SizingReport {
            energy_kwh_per_day: demand.kwh_per_day(),
            wind_speed_m_s: wind.m_per_s(),
            hydrogen_mass_kg_per_day: round_to(hydrogen.kg_per_day(), HYDROGEN_DECIMALS),
            electrolyzer_surface_m2: round_to(raw, ELECTROLYZER_DECIMALS),
            turbine_surface_m2: round_to(turbine_raw, TURBINE_DECIMALS),
            raw_prediction: raw,
        };
        debug!(
            energy = report.energy_kwh_per_day,
            wind = report.wind_speed_m_s,
            hydrogen = report.hydrogen_mass_kg_per_day,
            raw,
            "sized system"
        );
        Ok(report)
    }
}
