//! Error types produced while collecting parameters, loading models and predicting.

use std::path::PathBuf;

use thiserror::Error;

/// Error returned when a value cannot be placed in a feature record.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FeatureError {
    /// Returned when a feature value is NaN or infinite.
    #[error("feature `{name}` must be a finite number (received {value})")]
    NonFinite {
        /// Name of the offending feature.
        name: String,
        /// Rejected value.
        value: f64,
    },
    /// Returned when the shear-span ratio falls outside the supported interval.
    #[error("shear-span ratio a/h must lie in [{min}, {max}] (received {value})")]
    ShearSpanOutOfRange {
        /// Rejected ratio.
        value: f64,
        /// Lower bound of the interval.
        min: f64,
        /// Upper bound of the interval.
        max: f64,
    },
    /// Returned when an aggregate selection maps to neither known code.
    #[error("unsupported aggregate type `{0}`; expected normal-weight or lightweight concrete")]
    UnsupportedAggregate(String),
    /// Returned when the `Aggregate` feature holds a value other than `1` or `2`.
    #[error("aggregate code must be 1 or 2 (received {value})")]
    InvalidAggregateCode {
        /// Rejected code.
        value: f64,
    },
}

/// Error returned when the model artifact or its column list cannot be loaded.
///
/// Any variant leaves the predictor unavailable for the whole session.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Returned when an artifact file cannot be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Returned when an artifact file is not valid JSON for its schema.
    #[error("cannot parse {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// Returned when the column list is empty.
    #[error("model column list is empty")]
    EmptyColumns,
    /// Returned when the column list names a feature twice.
    #[error("model column `{0}` appears more than once")]
    DuplicateColumn(String),
    /// Returned when the model and the column list disagree on the feature count.
    #[error("model expects {model} features but the column list names {columns}")]
    ColumnCountMismatch {
        /// Feature count declared by the model.
        model: usize,
        /// Number of entries in the column list.
        columns: usize,
    },
}

/// Internal failure raised by a model during inference.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelFault {
    /// Returned when the row width differs from what the model was trained on.
    #[error("row has {received} values but the model expects {expected}")]
    ShapeMismatch {
        /// Width the model was trained on.
        expected: usize,
        /// Width of the supplied row.
        received: usize,
    },
    /// Returned when a linear estimator has the wrong number of coefficients.
    #[error("estimator {estimator} has {coefficients} coefficients for {inputs} inputs")]
    CoefficientMismatch {
        /// Position of the estimator in the ensemble.
        estimator: usize,
        /// Number of stored coefficients.
        coefficients: usize,
        /// Number of inputs presented to it.
        inputs: usize,
    },
    /// Returned when a tree split refers to a feature outside the row.
    #[error("estimator {estimator} splits on feature {feature} of a {width}-wide row")]
    FeatureOutOfRange {
        /// Position of the estimator in the ensemble.
        estimator: usize,
        /// Feature index used by the split.
        feature: usize,
        /// Width of the row.
        width: usize,
    },
    /// Returned when the model produced NaN or an infinite value.
    #[error("model produced a non-finite prediction ({0})")]
    NonFiniteOutput(f64),
    /// Free-form failure reported by an external model backend.
    #[error("{0}")]
    Backend(String),
}

/// Error returned when a prediction request cannot be served.
///
/// # Examples
///
/// ```
/// use deepshear::{FeatureRecord, PredictionError, ShearPredictor};
///
/// let predictor = ShearPredictor::unavailable("solid_model.json not found");
/// let error = predictor
///     .predict_record(&FeatureRecord::new())
///     .expect_err("no model loaded");
/// assert!(matches!(error, PredictionError::ModelUnavailable(_)));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PredictionError {
    /// Returned when no model was loaded for this session.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    /// Returned when the model call itself failed.
    #[error("prediction failed: {source}")]
    Model {
        /// Failure reported by the model.
        #[from]
        source: ModelFault,
    },
}
