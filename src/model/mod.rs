#![forbid(unsafe_code)]

//! Pretrained regression models behind the sizing pipeline.
//!
//! The pipeline only relies on [`Regressor`]: one feature row in, one scalar
//! out. Concrete models come from a JSON artifact produced by the training
//! side, loaded once with [`load_model`] and never mutated afterwards.

mod forest;
mod linear;
mod polynomial;

pub use forest::{Ensemble, ForestModel, RegressionTree};
pub use linear::LinearModel;
pub use polynomial::PolynomialModel;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::quantities::{HydrogenMass, WindSpeed};

/// Artifact format understood by [`load_model`].
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Column names the model was trained on, in the only order it accepts.
pub const FEATURE_NAMES: [&str; FeatureRow::LEN] = ["hydrogen_mass_kg_per_day", "wind_speed_m_s"];

/// Errors that make the model unusable: the artifact cannot be loaded, or an
/// inference call produced no usable value.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error reading model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt model artifact: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("unsupported artifact format version: expected {expected}, found {found}")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("invalid model: {0}")]
    Invalid(String),

    #[error("artifact feature order {found:?} does not match {expected:?}")]
    FeatureOrder {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Name used by callers that treat every model failure as "no model".
pub type ModelUnavailableError = ModelError;

/// The single input row fed to the model: hydrogen mass first, wind speed second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRow {
    pub hydrogen_mass_kg_per_day: f64,
    pub wind_speed_m_s: f64,
}

impl FeatureRow {
    pub const LEN: usize = 2;

    pub fn new(hydrogen: HydrogenMass, wind: WindSpeed) -> Self {
        Self::from_raw(hydrogen.kg_per_day(), wind.m_per_s())
    }

    /// Build a row from raw values. Used by model evaluation and tests; the
    /// pipeline always goes through [`FeatureRow::new`].
    pub fn from_raw(hydrogen_mass_kg_per_day: f64, wind_speed_m_s: f64) -> Self {
        Self {
            hydrogen_mass_kg_per_day,
            wind_speed_m_s,
        }
    }

    /// Values in training order.
    pub fn as_array(&self) -> [f64; Self::LEN] {
        [self.hydrogen_mass_kg_per_day, self.wind_speed_m_s]
    }
}

/// Black-box regression capability: `predict(feature_row) -> scalar`.
pub trait Regressor {
    /// Width of the row the model was trained on.
    fn n_features(&self) -> usize {
        FeatureRow::LEN
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError>;
}

impl<R: Regressor + ?Sized> Regressor for &R {
    fn n_features(&self) -> usize {
        (**self).n_features()
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        (**self).predict(row)
    }
}

impl<R: Regressor + ?Sized> Regressor for Box<R> {
    fn n_features(&self) -> usize {
        (**self).n_features()
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        (**self).predict(row)
    }
}

impl<R: Regressor + ?Sized> Regressor for Arc<R> {
    fn n_features(&self) -> usize {
        (**self).n_features()
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        (**self).predict(row)
    }
}

impl<R: Regressor + ?Sized> Regressor for Rc<R> {
    fn n_features(&self) -> usize {
        (**self).n_features()
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        (**self).predict(row)
    }
}

// ---- Concrete models -------------------------------------------------------

/// Any model the artifact format can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear(LinearModel),
    Polynomial(PolynomialModel),
    Forest(ForestModel),
}

/// Short description of a loaded model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub kind: &'static str,
    pub parameters: usize,
}

impl RegressionModel {
    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            RegressionModel::Linear(m) => m.validate(),
            RegressionModel::Polynomial(m) => m.validate(),
            RegressionModel::Forest(m) => m.validate(),
        }
    }

    pub fn summary(&self) -> ModelSummary {
        match self {
            RegressionModel::Linear(m) => ModelSummary {
                kind: "linear",
                parameters: m.coefficients.len() + 1,
            },
            RegressionModel::Polynomial(m) => ModelSummary {
                kind: "polynomial",
                parameters: m.coefficients.len() + 1,
            },
            RegressionModel::Forest(m) => ModelSummary {
                kind: "forest",
                parameters: m.node_count(),
            },
        }
    }
}

impl Regressor for RegressionModel {
    fn n_features(&self) -> usize {
        match self {
            RegressionModel::Linear(m) => m.coefficients.len(),
            RegressionModel::Polynomial(_) | RegressionModel::Forest(_) => FeatureRow::LEN,
        }
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        let x = row.as_array();
        let y = match self {
            RegressionModel::Linear(m) => m.evaluate(&x),
            RegressionModel::Polynomial(m) => m.evaluate(&x),
            RegressionModel::Forest(m) => m.evaluate(&x)?,
        };
        if !y.is_finite() {
            return Err(ModelError::Inference(format!(
                "non-finite prediction {y} for features {x:?}"
            )));
        }
        Ok(y)
    }
}

// ---- Artifact ---------------------------------------------------------------

/// On-disk envelope around a [`RegressionModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Training column order, checked against [`FEATURE_NAMES`] when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub model: RegressionModel,
}

impl ModelArtifact {
    pub fn new(model: RegressionModel) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_names: Some(FEATURE_NAMES.iter().map(|s| s.to_string()).collect()),
            model,
        }
    }

    /// Parse and fully validate an artifact document.
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        Self::from_json_slice(json.as_bytes())
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes).map_err(ModelError::Corrupt)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                expected: ARTIFACT_FORMAT_VERSION,
                found: self.format_version,
            });
        }
        if let Some(names) = &self.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
                return Err(ModelError::FeatureOrder {
                    expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                    found: names.clone(),
                });
            }
        }
        self.model.validate()
    }
}

/// Load the model artifact at `path`. Intended to run once at startup.
pub fn load_model(path: &Path) -> Result<RegressionModel, ModelError> {
    if !path.exists() {
        return Err(ModelError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "read model artifact");

    let artifact = ModelArtifact::from_json_slice(&bytes)?;
    let summary = artifact.model.summary();
    info!(
        path = %path.display(),
        kind = summary.kind,
        parameters = summary.parameters,
        "model loaded"
    );
    Ok(artifact.model)
}
