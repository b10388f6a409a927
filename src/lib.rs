#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

mod errors;
mod features;
mod loader;
mod model;
mod parameters;
mod predictor;

pub use errors::{FeatureError, LoadError, ModelFault, PredictionError};
pub use features::{align, columns, AlignedFeatureRow, FeatureRecord, ModelColumnSpec};
pub use loader::{
    load_artifacts, load_columns, load_model, try_load_artifacts, ArtifactPaths, LoadFailure,
    LoadedModel, ModelAvailability,
};
pub use model::{Estimator, LinearEstimator, RegressionTree, Regressor, StackingRegressor};
pub use parameters::{
    check_shear_span_ratio, AggregateType, DeepMemberParameters, Reinforcement,
    MAX_SHEAR_SPAN_RATIO, MIN_SHEAR_SPAN_RATIO,
};
pub use predictor::{predict, PredictionResult, ShearPredictor};
