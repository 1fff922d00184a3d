#![forbid(unsafe_code)]

//! Many sizing requests at once, read from and written to CSV.
//!
//! Rows are independent: a bad row is reported in the `error` column and the
//! batch carries on. A model failure ends the batch since every later row
//! would fail the same way.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{ModelError, Regressor};
use crate::pipeline::{PipelineError, PredictionPipeline};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv output error: {0}")]
    Io(#[from] std::io::Error),
    #[error("model unavailable at line {line}: {source}")]
    Model {
        line: u64,
        #[source]
        source: ModelError,
    },
}

/// Expected input columns.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BatchInput {
    pub energy_kwh_per_day: f64,
    pub wind_speed_m_s: f64,
}

/// One output row; result columns are empty when `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRow {
    pub line: u64,
    pub energy_kwh_per_day: Option<f64>,
    pub wind_speed_m_s: Option<f64>,
    pub hydrogen_mass_kg_per_day: Option<f64>,
    pub electrolyzer_surface_m2: Option<f64>,
    pub turbine_surface_m2: Option<f64>,
    pub error: Option<String>,
}

impl BatchRow {
    fn rejected(line: u64, input: Option<BatchInput>, error: String) -> Self {
        Self {
            line,
            energy_kwh_per_day: input.map(|i| i.energy_kwh_per_day),
            wind_speed_m_s: input.map(|i| i.wind_speed_m_s),
            hydrogen_mass_kg_per_day: None,
            electrolyzer_surface_m2: None,
            turbine_surface_m2: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub sized: usize,
    pub rejected: usize,
}

/// Size every row of `input` and write one CSV row per input row to `output`.
pub fn run_batch<M, R, W>(
    pipeline: &PredictionPipeline<M>,
    input: R,
    output: W,
) -> Result<BatchSummary, BatchError>
where
    M: Regressor,
    R: Read,
    W: Write,
{
    // Rows with a wrong field count are rejected one by one, not as a parse failure.
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    let mut writer = csv::Writer::from_writer(output);
    let headers = reader.headers()?.clone();
    let mut summary = BatchSummary::default();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        summary.rows += 1;

        let input: BatchInput = match record.deserialize(Some(&headers)) {
            Ok(input) => input,
            Err(e) => {
                warn!(line, error = %e, "unreadable row");
                summary.rejected += 1;
                writer.serialize(BatchRow::rejected(line, None, e.to_string()))?;
                continue;
            }
        };

        let row = match pipeline.predict(input.energy_kwh_per_day, input.wind_speed_m_s) {
            Ok(report) => {
                summary.sized += 1;
                BatchRow {
                    line,
                    energy_kwh_per_day: Some(report.energy_kwh_per_day),
                    wind_speed_m_s: Some(report.wind_speed_m_s),
                    hydrogen_mass_kg_per_day: Some(report.hydrogen_mass_kg_per_day),
                    electrolyzer_surface_m2: Some(report.electrolyzer_surface_m2),
                    turbine_surface_m2: Some(report.turbine_surface_m2),
                    error: None,
                }
            }
            Err(PipelineError::Validation(e)) => {
                warn!(line, error = %e, "rejected row");
                summary.rejected += 1;
                BatchRow::rejected(line, Some(input), e.to_string())
            }
            Err(PipelineError::ModelUnavailable(source)) => {
                writer.flush()?;
                return Err(BatchError::Model { line, source });
            }
        };
        writer.serialize(row)?;
    }

    writer.flush()?;
    info!(
        rows = summary.rows,
        sized = summary.sized,
        rejected = summary.rejected,
        "batch complete"
    );
    Ok(summary)
}
