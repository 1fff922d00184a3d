use serde::{Deserialize, Serialize};

use super::{FeatureRow, ModelError};

/// Ordinary least-squares fit: `intercept + coefficients · x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.len() != FeatureRow::LEN {
            return Err(ModelError::Invalid(format!(
                "linear model has {} coefficients, expected {}",
                self.coefficients.len(),
                FeatureRow::LEN
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Invalid(
                "linear model parameters must be finite".into(),
            ));
        }
        Ok(())
    }

    pub fn evaluate(&self, x: &[f64; FeatureRow::LEN]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x.iter())
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }
}
