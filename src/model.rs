//! Trained regression models.
//!
//! The [`Regressor`] trait is the only thing the predictor needs from a model.
//! [`StackingRegressor`] is the serialized ensemble shipped with the tool: a set
//! of base estimators whose outputs feed a linear final estimator.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::errors::ModelFault;
use crate::features::AlignedFeatureRow;

/// A trained model mapping one ordered feature row to a scalar.
pub trait Regressor {
    /// Number of inputs the model was trained on.
    fn n_features(&self) -> usize;

    /// Predict the target for `row`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelFault`] when the model cannot evaluate the row.
    fn predict(&self, row: &AlignedFeatureRow) -> Result<f64, ModelFault>;
}

/// Linear model `y = w . x + c`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearEstimator {
    /// One weight per input.
    pub coefficients: Vec<f64>,
    /// Constant term.
    #[serde(default)]
    pub intercept: f64,
}

impl LinearEstimator {
    /// Evaluate the model, tagging any fault with the estimator position.
    fn evaluate(&self, estimator: usize, inputs: &DVector<f64>) -> Result<f64, ModelFault> {
        if self.coefficients.len() != inputs.len() {
            return Err(ModelFault::CoefficientMismatch {
                estimator,
                coefficients: self.coefficients.len(),
                inputs: inputs.len(),
            });
        }
        let weights = DVector::from_column_slice(&self.coefficients);
        Ok(weights.dot(inputs) + self.intercept)
    }
}

/// Node of a regression tree.
///
/// Samples with `x[feature] <= threshold` follow `left`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegressionTree {
    /// Internal split.
    Split {
        /// Index of the feature to split on.
        feature: usize,
        /// Split threshold.
        threshold: f64,
        /// Subtree for samples at or below the threshold.
        left: Box<RegressionTree>,
        /// Subtree for samples above the threshold.
        right: Box<RegressionTree>,
    },
    /// Terminal node.
    Leaf {
        /// Predicted value (mean of the training targets in the leaf).
        value: f64,
    },
}

impl RegressionTree {
    /// Walk the tree for `inputs`.
    fn evaluate(&self, estimator: usize, inputs: &DVector<f64>) -> Result<f64, ModelFault> {
        let mut node = self;
        loop {
            match node {
                Self::Leaf { value } => return Ok(*value),
                Self::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = inputs.get(*feature).ok_or(ModelFault::FeatureOutOfRange {
                        estimator,
                        feature: *feature,
                        width: inputs.len(),
                    })?;
                    node = if *x <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }

    /// Depth of the tree; leaves have depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Base estimator of the ensemble.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    /// Linear regression.
    Linear(LinearEstimator),
    /// Single regression tree.
    Tree {
        /// Root node.
        root: RegressionTree,
    },
    /// Averaged trees, as produced by a random forest.
    Forest {
        /// Member trees.
        trees: Vec<RegressionTree>,
    },
}

impl Estimator {
    /// Evaluate the estimator at position `estimator` of the ensemble.
    ///
    /// A forest returns the mean of its trees.
    fn evaluate(&self, estimator: usize, inputs: &DVector<f64>) -> Result<f64, ModelFault> {
        match self {
            Self::Linear(linear) => linear.evaluate(estimator, inputs),
            Self::Tree { root } => root.evaluate(estimator, inputs),
            Self::Forest { trees } => {
                if trees.is_empty() {
                    return Err(ModelFault::Backend(format!(
                        "estimator {estimator} is a forest with no trees"
                    )));
                }
                let mut total = 0.0;
                for tree in trees {
                    total += tree.evaluate(estimator, inputs)?;
                }
                Ok(total / trees.len() as f64)
            }
        }
    }
}

/// Stacked ensemble of base estimators with a linear final estimator.
///
/// # Examples
/// ```
/// use deepshear::{AlignedFeatureRow, Regressor, StackingRegressor};
///
/// let model: StackingRegressor = serde_json::from_str(r#"{
///     "n_features": 2,
///     "estimators": [
///         { "kind": "linear", "coefficients": [1.0, 1.0], "intercept": 0.0 },
///         { "kind": "tree", "root": { "value": 10.0 } }
///     ],
///     "final_estimator": { "coefficients": [0.5, 0.5], "intercept": 1.0 }
/// }"#).unwrap();
///
/// let row = AlignedFeatureRow::from_values(vec![2.0, 4.0]);
/// assert_eq!(model.predict(&row).unwrap(), 0.5 * 6.0 + 0.5 * 10.0 + 1.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackingRegressor {
    /// Number of inputs the ensemble was trained on.
    pub n_features: usize,
    /// Base estimators, evaluated in order.
    pub estimators: Vec<Estimator>,
    /// Linear model combining the base predictions.
    pub final_estimator: LinearEstimator,
    /// When set, the raw row is appended to the base predictions before the
    /// final estimator.
    #[serde(default)]
    pub passthrough: bool,
}

impl Regressor for StackingRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, row: &AlignedFeatureRow) -> Result<f64, ModelFault> {
        if row.len() != self.n_features {
            return Err(ModelFault::ShapeMismatch {
                expected: self.n_features,
                received: row.len(),
            });
        }
        let inputs = row.as_vector();
        let mut stacked = Vec::with_capacity(self.estimators.len() + row.len());
        for (idx, estimator) in self.estimators.iter().enumerate() {
            stacked.push(estimator.evaluate(idx, inputs)?);
        }
        if self.passthrough {
            stacked.extend_from_slice(row.values());
        }
        let meta = DVector::from_vec(stacked);
        let prediction = self
            .final_estimator
            .evaluate(self.estimators.len(), &meta)?;
        if prediction.is_finite() {
            Ok(prediction)
        } else {
            Err(ModelFault::NonFiniteOutput(prediction))
        }
    }
}
