mod cli;
mod config;
mod form;
mod report;

use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use deepshear::{load_artifacts, DeepMemberParameters, ShearPredictor};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, FormArgs};
use config::Config;
use form::Form;
use report::{render_parameters, render_prediction, render_unavailable};

fn main() -> Result<ExitCode, Box<dyn Error>> {
    // Parse the command line; clap prints help when no command is given
    let cli = Cli::parse();

    // Read the optional configuration file
    let config = Config::load(cli.config.as_deref())?;

    // Set up logging. RUST_LOG wins over the configured filter, and logs go
    // to stderr so the report on stdout stays clean.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // Load the model once; it is only read afterwards
    let paths = config.artifact_paths(cli.model, cli.columns);
    let predictor = ShearPredictor::new(load_artifacts(&paths));

    // Without a model there is nothing to compute
    if !model_ready(&predictor, &mut io::stderr())? {
        return Ok(ExitCode::FAILURE);
    }

    // Dispatch the requested command
    match cli.command {
        Command::Predict(args) => predict_once(&predictor, args),
        Command::Interactive => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stdout().lock();
            let summary = Form::new(&mut input, &mut output).run_session(&predictor)?;
            info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "session finished"
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Columns => {
            if let Some(columns) = predictor.columns() {
                for (position, name) in columns.names().iter().enumerate() {
                    println!("{position:>2}  {name}");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Report whether `predictor` can serve requests.
///
/// When it cannot, the reason is written to `out` once and `false` is
/// returned so the caller stops before any compute action.
fn model_ready(predictor: &ShearPredictor, out: &mut impl Write) -> io::Result<bool> {
    match predictor.unavailable_reason() {
        Some(reason) => {
            write!(out, "{}", render_unavailable(reason))?;
            Ok(false)
        }
        None => Ok(true),
    }
}

/// Serve a single compute request and print the outcome.
///
/// A failed prediction is reported and turned into a failing exit code.
fn predict_once(predictor: &ShearPredictor, args: FormArgs) -> Result<ExitCode, Box<dyn Error>> {
    // Echo the inputs before computing
    let parameters = DeepMemberParameters::from(args);
    print!("{}", render_parameters(&parameters));

    // Build the record and ask the model
    let record = parameters.to_record()?;
    let outcome = predictor.predict_record(&record);

    // Results go to stdout, failures to stderr
    match &outcome {
        Ok(_) => {
            print!("{}", render_prediction(&outcome));
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => {
            eprint!("{}", render_prediction(&outcome));
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use deepshear::{Estimator, LinearEstimator, LoadedModel, ModelColumnSpec, StackingRegressor};

    use super::*;

    #[test]
    fn unavailable_model_stops_before_computing() {
        let predictor = ShearPredictor::unavailable("cannot read solid_model.json");
        let mut out = Vec::new();

        let ready = model_ready(&predictor, &mut out).expect("in-memory io");

        assert!(!ready);
        let message = String::from_utf8(out).expect("utf-8 output");
        assert_eq!(message.matches("cannot read solid_model.json").count(), 1);
        assert!(message.starts_with("Model unavailable"));
    }

    #[test]
    fn loaded_model_passes_silently() {
        let model = StackingRegressor {
            n_features: 1,
            estimators: vec![Estimator::Linear(LinearEstimator {
                coefficients: vec![1.0],
                intercept: 0.0,
            })],
            final_estimator: LinearEstimator {
                coefficients: vec![1.0],
                intercept: 0.0,
            },
            passthrough: false,
        };
        let columns = ModelColumnSpec::new(["b"]).expect("valid columns");
        let predictor =
            ShearPredictor::from(LoadedModel::new(Box::new(model), columns).expect("widths"));
        let mut out = Vec::new();

        assert!(model_ready(&predictor, &mut out).expect("in-memory io"));
        assert!(out.is_empty());
    }
}
