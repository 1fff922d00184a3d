#![forbid(unsafe_code)]

//! Sizing of a wind-powered hydrogen supply: from a daily energy demand and a
//! site wind speed to hydrogen production, electrolyzer active surface and
//! turbine swept surface, using a pretrained regression model.

pub mod batch;
pub mod cli;
pub mod model;
pub mod pipeline;
pub mod quantities;
pub mod report;

pub use batch::{run_batch, BatchError, BatchSummary};
pub use model::{
    load_model, FeatureRow, ModelArtifact, ModelError, ModelUnavailableError, RegressionModel,
    Regressor,
};
pub use pipeline::{PipelineError, PredictionPipeline, SizingReport};
pub use quantities::{EnergyDemand, HydrogenMass, ValidationError, WindSpeed, KWH_PER_KG_H2};
