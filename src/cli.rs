//! Command-line surface: argument parsing and resolved settings.

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

/// Default artifact location, next to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "MLmodel.json";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Size a wind turbine and electrolyzer for a daily energy demand"
)]
pub struct Cli {
    /// Pretrained model artifact (JSON)
    #[arg(
        long,
        short = 'm',
        global = true,
        env = "H2WIND_MODEL",
        default_value = DEFAULT_MODEL_PATH,
        value_hint = ValueHint::FilePath
    )]
    pub model: PathBuf,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Size the system for one energy demand and wind speed
    Predict(PredictArgs),
    /// Size every row of a CSV file with energy_kwh_per_day,wind_speed_m_s columns
    Batch(BatchArgs),
    /// Load the model artifact and describe it
    Inspect,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Energy needed per day [kWh]
    #[arg(long, short = 'e', default_value_t = 0.0, allow_negative_numbers = true)]
    pub energy: f64,

    /// Average wind speed at the location [m/s]
    #[arg(long, short = 'w', default_value_t = 0.0, allow_negative_numbers = true)]
    pub wind: f64,

    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print what each reported quantity means
    #[arg(long)]
    pub explain: bool,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Input CSV
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output CSV (stdout when omitted)
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Settings shared by every command once arguments and environment are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizerConfig {
    pub model_path: PathBuf,
    pub log_level: &'static str,
}

impl Cli {
    pub fn config(&self) -> SizerConfig {
        SizerConfig {
            model_path: self.model.clone(),
            log_level: if self.verbose { "debug" } else { "info" },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_defaults_to_zero_inputs() {
        let cli = Cli::try_parse_from(["h2wind_sizing", "predict"]).unwrap();
        match cli.command {
            Command::Predict(args) => {
                assert_eq!(args.energy, 0.0);
                assert_eq!(args.wind, 0.0);
                assert_eq!(args.format, OutputFormat::Text);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_negative_values_reach_validation() {
        let cli =
            Cli::try_parse_from(["h2wind_sizing", "predict", "--energy", "-1", "--wind", "4"])
                .unwrap();
        match cli.command {
            Command::Predict(args) => assert_eq!(args.energy, -1.0),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_csv_format_flag() {
        let cli = Cli::try_parse_from(["h2wind_sizing", "predict", "-e", "10", "--format", "csv"])
            .unwrap();
        match cli.command {
            Command::Predict(args) => assert_eq!(args.format, OutputFormat::Csv),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_model_and_verbose() {
        let cli = Cli::try_parse_from([
            "h2wind_sizing",
            "batch",
            "rows.csv",
            "--model",
            "/srv/models/wind.json",
            "-v",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.model_path, PathBuf::from("/srv/models/wind.json"));
        assert_eq!(config.log_level, "debug");
        assert!(matches!(cli.command, Command::Batch(BatchArgs { output: None, .. })));
    }
}
