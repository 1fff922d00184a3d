#![forbid(unsafe_code)]

//! Presentation of a [`SizingReport`]: labelled metrics, text table, JSON, CSV.

use serde::Serialize;
use std::fmt::Write as _;

use crate::pipeline::SizingReport;
use crate::quantities::{ELECTROLYZER_DECIMALS, HYDROGEN_DECIMALS, TURBINE_DECIMALS};

/// One labelled value shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub value: f64,
    pub decimals: usize,
    pub explanation: &'static str,
}

pub const HYDROGEN_LABEL: &str = "Produced Hydrogen Weight [kg/day]";
pub const ELECTROLYZER_LABEL: &str = "Electrolyzer Active Surface [m^2]";
pub const TURBINE_LABEL: &str = "Wind Turbine Surface [m^2]";

const HYDROGEN_EXPLANATION: &str =
    "The weight of hydrogen that must be produced per day to store the amount of energy you want.";
const ELECTROLYZER_EXPLANATION: &str = "The active surface that should be considered for the \
     electrolyzer, to be able to produce this amount of hydrogen per day.";
const TURBINE_EXPLANATION: &str = "The surface swept by the wind turbine, which must be taken \
     into account in order to provide the necessary energy for the electrolyzer.";

impl SizingReport {
    /// The three display metrics, in presentation order.
    pub fn metrics(&self) -> [Metric; 3] {
        [
            Metric {
                label: HYDROGEN_LABEL,
                value: self.hydrogen_mass_kg_per_day,
                decimals: HYDROGEN_DECIMALS as usize,
                explanation: HYDROGEN_EXPLANATION,
            },
            Metric {
                label: ELECTROLYZER_LABEL,
                value: self.electrolyzer_surface_m2,
                decimals: ELECTROLYZER_DECIMALS as usize,
                explanation: ELECTROLYZER_EXPLANATION,
            },
            Metric {
                label: TURBINE_LABEL,
                value: self.turbine_surface_m2,
                decimals: TURBINE_DECIMALS as usize,
                explanation: TURBINE_EXPLANATION,
            },
        ]
    }

    /// Plain-text table, optionally followed by what each metric means.
    pub fn render_text(&self, explain: bool) -> String {
        let metrics = self.metrics();
        let width = metrics.iter().map(|m| m.label.len()).max().unwrap_or(0);
        let mut out = String::new();
        for m in &metrics {
            let _ = writeln!(out, "{:<width$}  {:.*}", m.label, m.decimals, m.value);
        }
        if explain {
            out.push('\n');
            for m in &metrics {
                let _ = writeln!(out, "{}:\n  {}", m.label, m.explanation);
            }
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Header line plus one data row, same columns as the JSON fields.
    pub fn to_csv(&self) -> csv::Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(self)?;
        let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SizingReport {
        SizingReport {
            energy_kwh_per_day: 100.0,
            wind_speed_m_s: 6.0,
            hydrogen_mass_kg_per_day: 3.0,
            electrolyzer_surface_m2: 0.5,
            turbine_surface_m2: 50.3,
            raw_prediction: 0.503,
        }
    }

    #[test]
    fn test_text_shows_fixed_decimals() {
        let text = report().render_text(false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(HYDROGEN_LABEL));
        assert!(lines[0].ends_with("3.0"));
        assert!(lines[1].ends_with("0.50"));
        assert!(lines[2].ends_with("50.3"));
    }

    #[test]
    fn test_text_with_explanations() {
        let text = report().render_text(true);
        assert!(text.contains("swept by the wind turbine"));
        assert!(text.contains("store the amount of energy"));
    }

    #[test]
    fn test_csv_row() {
        let csv = report().to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "energy_kwh_per_day,wind_speed_m_s,hydrogen_mass_kg_per_day,\
                 electrolyzer_surface_m2,turbine_surface_m2,raw_prediction",
                "100.0,6.0,3.0,0.5,50.3,0.503",
            ]
        );
    }

    #[test]
    fn test_metric_decimals_follow_rounding() {
        let decimals: Vec<usize> = report().metrics().iter().map(|m| m.decimals).collect();
        assert_eq!(
            decimals,
            vec![
                HYDROGEN_DECIMALS as usize,
                ELECTROLYZER_DECIMALS as usize,
                TURBINE_DECIMALS as usize
            ]
        );
    }

    #[test]
    fn test_json_fields() {
        let json: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();
        assert_eq!(json["hydrogen_mass_kg_per_day"], 3.0);
        assert_eq!(json["electrolyzer_surface_m2"], 0.5);
        assert_eq!(json["turbine_surface_m2"], 50.3);
        assert_eq!(json["raw_prediction"], 0.503);
    }
}
