use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use deepshear::{check_shear_span_ratio, AggregateType, DeepMemberParameters, Reinforcement};

/// Predict the ultimate shear capacity of a solid deep flexural member.
#[derive(Debug, Parser)]
#[command(name = "deepshear", version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// TOML configuration file (defaults to ./deepshear.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Serialized model artifact, overriding the configuration
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// JSON list of model columns, overriding the configuration
    #[arg(long, global = true)]
    pub columns: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the capacity for the given parameters
    Predict(FormArgs),
    /// Prompt for parameters and compute repeatedly
    Interactive,
    /// List the columns the loaded model expects, in order
    Columns,
}

/// Initial form values; the flag defaults are read from here.
const DEFAULTS: DeepMemberParameters = DeepMemberParameters::DEFAULT;

// One flag per form field, each defaulting to the form's initial value.
// Every field but a/h is free-form, so negative values must reach the parser.
#[derive(Debug, Clone, Args)]
pub struct FormArgs {
    /// Section width b (mm)
    #[arg(
        short = 'b',
        long = "width",
        default_value_t = DEFAULTS.width,
        value_parser = parse_finite,
        allow_negative_numbers = true
    )]
    pub width: f64,

    /// Section height h (mm)
    #[arg(
        short = 'H',
        long = "height",
        default_value_t = DEFAULTS.height,
        value_parser = parse_finite,
        allow_negative_numbers = true
    )]
    pub height: f64,

    /// Shear-span ratio a/h, between 0.2 and 2.5
    #[arg(
        long = "shear-span",
        default_value_t = DEFAULTS.shear_span_ratio,
        value_parser = parse_shear_span,
        allow_negative_numbers = true
    )]
    pub shear_span_ratio: f64,

    /// Concrete strength fc (MPa)
    #[arg(
        long = "fc",
        default_value_t = DEFAULTS.concrete_strength,
        value_parser = parse_finite,
        allow_negative_numbers = true
    )]
    pub concrete_strength: f64,

    /// Longitudinal reinforcement ratio rho_l (%)
    #[arg(
        long = "pl",
        default_value_t = DEFAULTS.longitudinal.ratio,
        value_parser = parse_finite,
        allow_negative_numbers = true
    )]
    pub longitudinal_ratio: f64,

    /// Longitudinal reinforcement yield strength fy (MPa)
    #[arg(
        long = "fy",
        default_value_t = DEFAULTS.longitudinal.yield_strength,
        value_parser = parse_finite,
        allow_negative_numbers = true
    )]
    pub longitudinal_yield: f64,

    /// Vertical web reinforcement ratio rho_v (%)
    #[arg(
        long = "pv",
        default_value_t = DEFAULTS.vertical.ratio,
        value_parser = parse_finite,
        allow_negative_numbers = true
    )]
    pub vertical_ratio: f64,

    /// Vertical web reinforcement yield strength fyv (MPa)
    #[arg(
        long = "fyv",
        default_value_t = DEFAULTS.vertical.yield_strength,
        value_parser = parse_finite,
        allow_negative_numbers = true
    )]
    pub vertical_yield: f64,

    /// Horizontal web reinforcement ratio rho_h (%)
    #[arg(
        long = "ph",
        default_value_t = DEFAULTS.horizontal.ratio,
        value_parser = parse_finite,
        allow_negative_numbers = true
    )]
    pub horizontal_ratio: f64,

    /// Horizontal web reinforcement yield strength fyh (MPa)
    #[arg(
        long = "fyh",
        default_value_t = DEFAULTS.horizontal.yield_strength,
        value_parser = parse_finite,
        allow_negative_numbers = true
    )]
    pub horizontal_yield: f64,

    /// Aggregate type: "normal" or "lightweight"
    #[arg(long)]
    pub aggregate: Option<AggregateType>,
}

impl From<FormArgs> for DeepMemberParameters {
    fn from(args: FormArgs) -> Self {
        Self {
            width: args.width,
            height: args.height,
            shear_span_ratio: args.shear_span_ratio,
            concrete_strength: args.concrete_strength,
            longitudinal: Reinforcement::new(args.longitudinal_ratio, args.longitudinal_yield),
            vertical: Reinforcement::new(args.vertical_ratio, args.vertical_yield),
            horizontal: Reinforcement::new(args.horizontal_ratio, args.horizontal_yield),
            aggregate: args.aggregate,
        }
    }
}

/// Parse a finite floating point number.
pub fn parse_finite(value: &str) -> Result<f64, String> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(format!("`{value}` is not a finite number"))
    }
}

/// Parse a shear-span ratio and check it against the supported interval.
pub fn parse_shear_span(value: &str) -> Result<f64, String> {
    let parsed = parse_finite(value)?;
    check_shear_span_ratio(parsed).map_err(|err| err.to_string())
}
