use std::fmt::Write;

use deepshear::{DeepMemberParameters, PredictionError, PredictionResult};

/// Render the parameter overview shown before computing.
#[must_use]
pub fn render_parameters(parameters: &DeepMemberParameters) -> String {
    let mut output = String::new();

    // Geometry and concrete
    writeln!(&mut output, "Solid deep member parameters").expect("writing to string cannot fail");
    writeln!(
        &mut output,
        "- Section: {:.0} x {:.0} mm (a/h = {})",
        parameters.width, parameters.height, parameters.shear_span_ratio
    )
    .expect("writing to string cannot fail");
    writeln!(
        &mut output,
        "- Concrete: fc = {} MPa",
        parameters.concrete_strength
    )
    .expect("writing to string cannot fail");

    // Reinforcement ratios are percentages, as entered.
    for (label, symbol, yield_symbol, bars) in [
        ("Longitudinal", "rho_l", "fy", parameters.longitudinal),
        ("Stirrups", "rho_v", "fyv", parameters.vertical),
        ("Horizontal web", "rho_h", "fyh", parameters.horizontal),
    ] {
        writeln!(
            &mut output,
            "- {label}: {symbol} = {}% ({yield_symbol} = {} MPa)",
            bars.ratio, bars.yield_strength
        )
        .expect("writing to string cannot fail");
    }

    // Only shown when the form asked for it
    if let Some(aggregate) = parameters.aggregate {
        writeln!(
            &mut output,
            "- Aggregate: {aggregate} (code {})",
            aggregate.code()
        )
        .expect("writing to string cannot fail");
    }

    output
}

/// Render the outcome of one compute request.
#[must_use]
pub fn render_prediction(outcome: &Result<PredictionResult, PredictionError>) -> String {
    match outcome {
        Ok(result) => format!("Ultimate shear capacity V_u = {result}\n"),
        Err(PredictionError::ModelUnavailable(reason)) => render_unavailable(reason),
        Err(err) => format!("Calculation failed: {err}\nAdjust the inputs and try again.\n"),
    }
}

/// Render the message shown when no model could be loaded.
#[must_use]
pub fn render_unavailable(reason: &str) -> String {
    format!(
        "Model unavailable: {reason}\n\
         Provide the trained model and its column list (see --model and --columns).\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepshear::{AggregateType, ModelFault};

    #[test]
    fn formats_parameter_overview() {
        let report = render_parameters(&DeepMemberParameters::default());
        assert!(report.contains("200 x 600 mm (a/h = 1)"));
        assert!(report.contains("fc = 30 MPa"));
        assert!(report.contains("rho_l = 1.2% (fy = 400 MPa)"));
        assert!(report.contains("rho_v = 0.5% (fyv = 300 MPa)"));
        assert!(report.contains("rho_h = 0.5% (fyh = 300 MPa)"));
        assert!(!report.contains("Aggregate"));
    }

    #[test]
    fn includes_aggregate_when_selected() {
        let parameters = DeepMemberParameters {
            aggregate: Some(AggregateType::Normal),
            ..DeepMemberParameters::default()
        };
        let report = render_parameters(&parameters);
        assert!(report.contains("Aggregate: normal-weight concrete (code 1)"));
    }

    #[test]
    fn formats_capacity_with_two_decimals() {
        let report = render_prediction(&Ok(PredictionResult::from_kilonewtons(1234.5678)));
        assert_eq!(report, "Ultimate shear capacity V_u = 1234.57 kN\n");
    }

    #[test]
    fn formats_failures_as_messages() {
        let failure = render_prediction(&Err(PredictionError::from(ModelFault::ShapeMismatch {
            expected: 11,
            received: 10,
        })));
        assert!(failure.starts_with("Calculation failed"));
        assert!(failure.contains("expects 11"));

        let unavailable =
            render_prediction(&Err(PredictionError::ModelUnavailable("missing".into())));
        assert!(unavailable.starts_with("Model unavailable: missing"));
    }
}
