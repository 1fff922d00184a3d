use std::fs::File;
use std::io::{self, BufReader, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use h2wind_sizing::cli::{BatchArgs, Cli, Command, OutputFormat, PredictArgs};
use h2wind_sizing::{load_model, run_batch, PredictionPipeline, RegressionModel};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    // Without a model there is nothing to serve, so fail before touching any input.
    let model = load_model(&config.model_path).map_err(|e| {
        error!(path = %config.model_path.display(), "model unavailable: {e}");
        e
    })?;

    match cli.command {
        Command::Predict(args) => handle_predict(PredictionPipeline::new(model), args),
        Command::Batch(args) => handle_batch(PredictionPipeline::new(model), args),
        Command::Inspect => handle_inspect(&model),
    }
}

fn handle_predict(pipeline: PredictionPipeline<RegressionModel>, args: PredictArgs) -> Result<()> {
    let report = pipeline
        .predict(args.energy, args.wind)
        .context("could not size the system")?;

    let rendered = match args.format {
        OutputFormat::Text => report.render_text(args.explain),
        OutputFormat::Json => report.to_json()? + "\n",
        OutputFormat::Csv => report.to_csv()?,
    };
    io::stdout().write_all(rendered.as_bytes())?;
    Ok(())
}

fn handle_batch(pipeline: PredictionPipeline<RegressionModel>, args: BatchArgs) -> Result<()> {
    let input = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let input = BufReader::new(input);

    let summary = match &args.output {
        Some(path) => {
            let out = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            run_batch(&pipeline, input, out)?
        }
        None => run_batch(&pipeline, input, io::stdout().lock())?,
    };

    info!(
        input = %args.input.display(),
        rows = summary.rows,
        rejected = summary.rejected,
        "batch written"
    );
    Ok(())
}

fn handle_inspect(model: &RegressionModel) -> Result<()> {
    let summary = model.summary();
    println!("kind:       {}", summary.kind);
    println!("parameters: {}", summary.parameters);
    Ok(())
}
