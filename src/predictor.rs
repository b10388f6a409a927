//! Prediction of the ultimate shear capacity.

use std::fmt;

use tracing::debug;
use uom::si::f64::Force;
use uom::si::force::kilonewton;

use crate::errors::PredictionError;
use crate::features::{align, AlignedFeatureRow, FeatureRecord, ModelColumnSpec};
use crate::loader::{LoadFailure, LoadedModel, ModelAvailability};
use crate::model::Regressor;

/// Predicted ultimate shear capacity `V_u`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PredictionResult {
    /// Capacity as a force quantity.
    capacity: Force,
}

impl PredictionResult {
    /// Create a result from a value in kilonewtons.
    #[must_use]
    pub fn from_kilonewtons(value: f64) -> Self {
        Self {
            capacity: Force::new::<kilonewton>(value),
        }
    }

    /// Return the capacity in kilonewtons.
    #[must_use]
    pub fn kilonewtons(&self) -> f64 {
        self.capacity.get::<kilonewton>()
    }

    /// Return the capacity as a force quantity.
    #[must_use]
    pub fn capacity(&self) -> Force {
        self.capacity
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} kN", self.kilonewtons())
    }
}

/// Evaluate `model` on an aligned row.
///
/// The model's output is read as a capacity in kilonewtons.
///
/// # Errors
///
/// Returns [`PredictionError::Model`] when the model fails.
pub fn predict(
    row: &AlignedFeatureRow,
    model: &dyn Regressor,
) -> Result<PredictionResult, PredictionError> {
    let value = model.predict(row)?;
    debug!(width = row.len(), capacity_kn = value, "prediction issued");
    Ok(PredictionResult::from_kilonewtons(value))
}

/// Session-wide predictor holding the loaded model, if any.
///
/// Availability is decided once at construction. A failed prediction leaves
/// the predictor usable for the next request.
///
/// # Examples
/// ```
/// use deepshear::{
///     DeepMemberParameters, LoadedModel, ModelColumnSpec, ShearPredictor, StackingRegressor,
/// };
///
/// let model: StackingRegressor = serde_json::from_str(r#"{
///     "n_features": 2,
///     "estimators": [{ "kind": "linear", "coefficients": [1.0, 0.5] }],
///     "final_estimator": { "coefficients": [1.0] }
/// }"#).unwrap();
/// let columns = ModelColumnSpec::new(["b", "h"]).unwrap();
/// let predictor = ShearPredictor::from(LoadedModel::new(Box::new(model), columns).unwrap());
///
/// let record = DeepMemberParameters::default().to_record().unwrap();
/// let result = predictor.predict_record(&record).unwrap();
/// assert_eq!(result.kilonewtons(), 200.0 + 0.5 * 600.0);
/// ```
#[derive(Debug)]
pub struct ShearPredictor {
    /// Loaded model or the reason it is missing.
    availability: ModelAvailability,
}

impl ShearPredictor {
    /// Create a predictor from the outcome of loading the artifacts.
    #[must_use]
    pub fn new(availability: ModelAvailability) -> Self {
        Self { availability }
    }

    /// Create a predictor that refuses every request.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::new(ModelAvailability::Unavailable(LoadFailure {
            reason: reason.into(),
        }))
    }

    /// Return `true` when a model is loaded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self.availability, ModelAvailability::Loaded(_))
    }

    /// Return why no model is loaded, if that is the case.
    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.availability {
            ModelAvailability::Loaded(_) => None,
            ModelAvailability::Unavailable(failure) => Some(failure.reason.as_str()),
        }
    }

    /// Return the column order of the loaded model.
    #[must_use]
    pub fn columns(&self) -> Option<&ModelColumnSpec> {
        self.loaded().ok().map(LoadedModel::columns)
    }

    /// Borrow the loaded model, or report why there is none.
    fn loaded(&self) -> Result<&LoadedModel, PredictionError> {
        match &self.availability {
            ModelAvailability::Loaded(loaded) => Ok(loaded),
            ModelAvailability::Unavailable(failure) => {
                Err(PredictionError::ModelUnavailable(failure.reason.clone()))
            }
        }
    }

    /// Align `record` to the loaded model's columns.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::ModelUnavailable`] when no model is loaded.
    pub fn align(&self, record: &FeatureRecord) -> Result<AlignedFeatureRow, PredictionError> {
        let loaded = self.loaded()?;
        Ok(align(record, loaded.columns()))
    }

    /// Align `record` and evaluate the loaded model on it.
    ///
    /// Nothing is aligned or evaluated when the model is unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::ModelUnavailable`] when no model is loaded and
    /// [`PredictionError::Model`] when the model fails.
    pub fn predict_record(
        &self,
        record: &FeatureRecord,
    ) -> Result<PredictionResult, PredictionError> {
        let loaded = self.loaded()?;
        let row = align(record, loaded.columns());
        predict(&row, loaded.model())
    }
}

impl From<LoadedModel> for ShearPredictor {
    fn from(loaded: LoadedModel) -> Self {
        Self::new(ModelAvailability::Loaded(loaded))
    }
}
