use std::io::{self, BufRead, Write};

use deepshear::{columns, AggregateType, DeepMemberParameters, Reinforcement, ShearPredictor};
use tracing::info;

use crate::cli::{parse_finite, parse_shear_span};
use crate::report::{render_parameters, render_prediction};

/// Counts of the requests served by one interactive session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Requests that produced a capacity.
    pub succeeded: usize,
    /// Requests rejected by validation or by the model.
    pub failed: usize,
}

/// Reads answers line by line and echoes prompts to `output`.
pub struct Form<'a, R, W> {
    /// Source of answers.
    input: &'a mut R,
    /// Destination of prompts and results.
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> Form<'a, R, W> {
    /// Create a form reading from `input` and writing to `output`.
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self { input, output }
    }

    /// Read one trimmed line; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask for one value until it parses. A blank answer keeps `default`.
    fn ask<T, F>(&mut self, label: &str, default: &str, parse: F) -> io::Result<Option<T>>
    where
        F: Fn(&str) -> Result<T, String>,
    {
        loop {
            write!(self.output, "{label} [{default}]: ")?;
            self.output.flush()?;
            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            let answer = if answer.is_empty() { default } else { &answer };
            match parse(answer) {
                Ok(value) => return Ok(Some(value)),
                Err(message) => writeln!(self.output, "  {message}")?,
            }
        }
    }

    /// Ask for a finite number.
    fn ask_number(&mut self, label: &str, default: f64) -> io::Result<Option<f64>> {
        self.ask(label, &default.to_string(), parse_finite)
    }

    /// Ask for the ratio and yield strength of one bar group.
    fn ask_bars(
        &mut self,
        group: &str,
        ratio_symbol: &str,
        yield_symbol: &str,
        default: Reinforcement,
    ) -> io::Result<Option<Reinforcement>> {
        let Some(ratio) =
            self.ask_number(&format!("{group} ratio {ratio_symbol} (%)"), default.ratio)?
        else {
            return Ok(None);
        };
        let Some(yield_strength) = self.ask_number(
            &format!("{group} yield {yield_symbol} (MPa)"),
            default.yield_strength,
        )?
        else {
            return Ok(None);
        };
        Ok(Some(Reinforcement::new(ratio, yield_strength)))
    }

    /// Collect one set of parameters, starting from `defaults`.
    ///
    /// The aggregate question is only asked when `with_aggregate` is set.
    /// Returns `None` when the input ends before the form is complete.
    pub fn collect(
        &mut self,
        defaults: &DeepMemberParameters,
        with_aggregate: bool,
    ) -> io::Result<Option<DeepMemberParameters>> {
        writeln!(self.output, "Geometry and material")?;
        let Some(width) = self.ask_number("Section width b (mm)", defaults.width)? else {
            return Ok(None);
        };
        let Some(height) = self.ask_number("Section height h (mm)", defaults.height)? else {
            return Ok(None);
        };
        let Some(shear_span_ratio) = self.ask(
            "Shear-span ratio a/h (0.2-2.5)",
            &defaults.shear_span_ratio.to_string(),
            parse_shear_span,
        )?
        else {
            return Ok(None);
        };
        let Some(concrete_strength) =
            self.ask_number("Concrete strength fc (MPa)", defaults.concrete_strength)?
        else {
            return Ok(None);
        };

        writeln!(self.output, "Reinforcement")?;
        let Some(longitudinal) =
            self.ask_bars("Longitudinal", "rho_l", "fy", defaults.longitudinal)?
        else {
            return Ok(None);
        };
        let Some(vertical) = self.ask_bars("Stirrup", "rho_v", "fyv", defaults.vertical)? else {
            return Ok(None);
        };
        let Some(horizontal) =
            self.ask_bars("Horizontal web", "rho_h", "fyh", defaults.horizontal)?
        else {
            return Ok(None);
        };

        let aggregate = if with_aggregate {
            let default = defaults
                .aggregate
                .unwrap_or(AggregateType::Normal)
                .label()
                .to_string();
            match self.ask("Aggregate type (normal/lightweight)", &default, |answer| {
                AggregateType::from_selection(answer).map_err(|err| err.to_string())
            })? {
                Some(aggregate) => Some(aggregate),
                None => return Ok(None),
            }
        } else {
            defaults.aggregate
        };

        Ok(Some(DeepMemberParameters {
            width,
            height,
            shear_span_ratio,
            concrete_strength,
            longitudinal,
            vertical,
            horizontal,
            aggregate,
        }))
    }

    /// Ask whether to compute another member.
    fn another(&mut self) -> io::Result<bool> {
        write!(self.output, "Compute another member? [y/N]: ")?;
        self.output.flush()?;
        Ok(self
            .read_line()?
            .is_some_and(|answer| answer.eq_ignore_ascii_case("y")))
    }

    /// Collect parameters and compute until the user stops or input ends.
    ///
    /// A failed request is reported and the session continues.
    pub fn run_session(&mut self, predictor: &ShearPredictor) -> io::Result<SessionSummary> {
        let with_aggregate = predictor
            .columns()
            .is_some_and(|spec| spec.position(columns::AGGREGATE).is_some());
        let mut summary = SessionSummary::default();
        let mut defaults = DeepMemberParameters::default();

        loop {
            let Some(parameters) = self.collect(&defaults, with_aggregate)? else {
                break;
            };
            write!(self.output, "{}", render_parameters(&parameters))?;
            match parameters.to_record() {
                Ok(record) => {
                    let outcome = predictor.predict_record(&record);
                    write!(self.output, "{}", render_prediction(&outcome))?;
                    match outcome {
                        Ok(_) => summary.succeeded += 1,
                        Err(err) => {
                            summary.failed += 1;
                            info!(error = %err, "request failed; session continues");
                        }
                    }
                }
                Err(err) => {
                    summary.failed += 1;
                    writeln!(self.output, "Invalid input: {err}")?;
                }
            }
            defaults = parameters;
            if !self.another()? {
                break;
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use deepshear::{Estimator, LinearEstimator, LoadedModel, ModelColumnSpec, StackingRegressor};

    use super::*;

    fn linear_predictor(names: &[&str]) -> ShearPredictor {
        let coefficients = vec![1.0; names.len()];
        let model = StackingRegressor {
            n_features: names.len(),
            estimators: vec![Estimator::Linear(LinearEstimator {
                coefficients,
                intercept: 0.0,
            })],
            final_estimator: LinearEstimator {
                coefficients: vec![1.0],
                intercept: 0.0,
            },
            passthrough: false,
        };
        let columns = ModelColumnSpec::new(names.iter().copied()).expect("valid columns");
        ShearPredictor::from(LoadedModel::new(Box::new(model), columns).expect("matching widths"))
    }

    fn run(input: &str, predictor: &ShearPredictor) -> (SessionSummary, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let summary = Form::new(&mut reader, &mut output)
            .run_session(predictor)
            .expect("in-memory io");
        (summary, String::from_utf8(output).expect("utf-8 output"))
    }

    #[test]
    fn blank_answers_keep_defaults() {
        let mut reader = Cursor::new("\n".repeat(10).into_bytes());
        let mut output = Vec::new();
        let parameters = Form::new(&mut reader, &mut output)
            .collect(&DeepMemberParameters::default(), false)
            .expect("in-memory io")
            .expect("complete form");
        assert_eq!(parameters, DeepMemberParameters::default());
    }

    #[test]
    fn invalid_answers_are_asked_again() {
        let input = "abc\n250\n\n9\n1.5\n\n\n\n\n\n\n\n";
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let parameters = Form::new(&mut reader, &mut output)
            .collect(&DeepMemberParameters::default(), false)
            .expect("in-memory io")
            .expect("complete form");
        assert_eq!(parameters.width, 250.0);
        assert_eq!(parameters.shear_span_ratio, 1.5);
        let transcript = String::from_utf8(output).expect("utf-8 output");
        assert!(transcript.contains("`abc` is not a number"));
        assert!(transcript.contains("shear-span ratio a/h must lie in"));
    }

    #[test]
    fn truncated_input_ends_the_form() {
        let mut reader = Cursor::new(b"200\n600\n".to_vec());
        let mut output = Vec::new();
        let parameters = Form::new(&mut reader, &mut output)
            .collect(&DeepMemberParameters::default(), false)
            .expect("in-memory io");
        assert!(parameters.is_none());
    }

    #[test]
    fn aggregate_is_asked_when_model_uses_it() {
        let mut names: Vec<&str> = columns::BASE.to_vec();
        names.push(columns::AGGREGATE);
        let predictor = linear_predictor(&names);
        let input = format!("{}lightweight\nn\n", "\n".repeat(10));
        let (summary, transcript) = run(&input, &predictor);
        assert_eq!(summary, SessionSummary { succeeded: 1, failed: 0 });
        assert!(transcript.contains("Aggregate: lightweight concrete (code 2)"));
        // 200 + 600 + 1 + 30 + 1.2 + 400 + 0.5 + 300 + 0.5 + 300 + 2
        assert!(transcript.contains("V_u = 1835.20 kN"));
    }

    #[test]
    fn session_survives_a_failed_request() {
        // The base estimator carries one coefficient too many.
        let model = StackingRegressor {
            n_features: 2,
            estimators: vec![Estimator::Linear(LinearEstimator {
                coefficients: vec![1.0, 1.0, 1.0],
                intercept: 0.0,
            })],
            final_estimator: LinearEstimator {
                coefficients: vec![1.0],
                intercept: 0.0,
            },
            passthrough: false,
        };
        let columns = ModelColumnSpec::new(["b", "h"]).expect("valid columns");
        let predictor =
            ShearPredictor::from(LoadedModel::new(Box::new(model), columns).expect("widths"));

        let input = format!("{}y\n{}n\n", "\n".repeat(10), "\n".repeat(10));
        let (summary, transcript) = run(&input, &predictor);
        assert_eq!(summary, SessionSummary { succeeded: 0, failed: 2 });
        assert_eq!(transcript.matches("Calculation failed").count(), 2);
    }

    #[test]
    fn session_repeats_until_declined() {
        let predictor = linear_predictor(&["b", "h"]);
        let input = format!("{}y\n300\n{}n\n", "\n".repeat(10), "\n".repeat(9));
        let (summary, transcript) = run(&input, &predictor);
        assert_eq!(summary, SessionSummary { succeeded: 2, failed: 0 });
        assert!(transcript.contains("V_u = 800.00 kN"));
        assert!(transcript.contains("V_u = 900.00 kN"));
    }
}
