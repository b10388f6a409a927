//! Feature records, model column lists and the alignment between them.

use std::collections::{HashMap, HashSet};

use nalgebra::DVector;
use tracing::{debug, warn};

use crate::errors::{FeatureError, LoadError};
use crate::parameters::AggregateType;

/// Column names used when the model was trained.
pub mod columns {
    /// Section width in millimetres.
    pub const WIDTH: &str = "b";
    /// Section height in millimetres.
    pub const HEIGHT: &str = "h";
    /// Shear-span to height ratio.
    pub const SHEAR_SPAN_RATIO: &str = "a/h";
    /// Concrete compressive strength in megapascals.
    pub const CONCRETE_STRENGTH: &str = "fc";
    /// Longitudinal reinforcement ratio in percent.
    pub const LONGITUDINAL_RATIO: &str = "pl";
    /// Longitudinal reinforcement yield strength in megapascals.
    pub const LONGITUDINAL_YIELD: &str = "fy";
    /// Horizontal web reinforcement ratio in percent.
    pub const HORIZONTAL_RATIO: &str = "ph";
    /// Horizontal web reinforcement yield strength in megapascals.
    pub const HORIZONTAL_YIELD: &str = "fyh";
    /// Vertical web reinforcement ratio in percent.
    pub const VERTICAL_RATIO: &str = "pv";
    /// Vertical web reinforcement yield strength in megapascals.
    pub const VERTICAL_YIELD: &str = "fyv";
    /// Integer-coded aggregate type.
    pub const AGGREGATE: &str = "Aggregate";

    /// The ten numeric columns of the base form, in training order.
    pub const BASE: [&str; 10] = [
        WIDTH,
        HEIGHT,
        SHEAR_SPAN_RATIO,
        CONCRETE_STRENGTH,
        LONGITUDINAL_RATIO,
        LONGITUDINAL_YIELD,
        HORIZONTAL_RATIO,
        HORIZONTAL_YIELD,
        VERTICAL_RATIO,
        VERTICAL_YIELD,
    ];
}

/// Named numeric inputs describing one member.
///
/// Every stored value is finite, and `Aggregate`, when present, is `1` or `2`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureRecord {
    /// Values keyed by feature name.
    values: HashMap<String, f64>,
}

impl FeatureRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, replacing any earlier value.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::NonFinite`] when `value` is NaN or infinite and
    /// [`FeatureError::InvalidAggregateCode`] when an `Aggregate` value is not
    /// one of the known codes.
    ///
    /// # Examples
    /// ```
    /// use deepshear::FeatureRecord;
    ///
    /// let mut record = FeatureRecord::new();
    /// record.insert("b", 200.0).expect("finite value accepted");
    /// assert!(record.insert("h", f64::NAN).is_err());
    /// assert!(record.insert("Aggregate", 3.0).is_err());
    /// assert_eq!(record.get("b"), Some(200.0));
    /// ```
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Result<(), FeatureError> {
        let name = name.into();
        if !value.is_finite() {
            return Err(FeatureError::NonFinite { name, value });
        }
        if name == columns::AGGREGATE && AggregateType::from_code(value).is_none() {
            return Err(FeatureError::InvalidAggregateCode { value });
        }
        self.values.insert(name, value);
        Ok(())
    }

    /// Look up the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Return `true` when `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Return the number of stored features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return `true` when no feature is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the stored feature names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Ordered feature names the model was trained on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelColumnSpec {
    /// Column names in model input order.
    names: Vec<String>,
}

impl ModelColumnSpec {
    /// Build a column list, rejecting empty or repeated names.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::EmptyColumns`] for an empty list and
    /// [`LoadError::DuplicateColumn`] when a name appears twice.
    pub fn new<I, S>(names: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(LoadError::EmptyColumns);
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(LoadError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self { names })
    }

    /// Return the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false`; construction rejects empty lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Return the column names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Return the position of `name`, if the model uses it.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|column| column == name)
    }
}

/// Feature values ordered to match a [`ModelColumnSpec`].
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedFeatureRow {
    /// One value per model column.
    values: DVector<f64>,
    /// Columns that were absent from the record and filled with zero.
    defaulted: Vec<String>,
}

impl AlignedFeatureRow {
    /// Wrap raw values that are already in model order.
    #[must_use]
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values: DVector::from_vec(values),
            defaulted: Vec::new(),
        }
    }

    /// Return the row width.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return `true` when the row has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the values in model order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        self.values.as_slice()
    }

    /// Return the row as an algebraic vector.
    #[must_use]
    pub fn as_vector(&self) -> &DVector<f64> {
        &self.values
    }

    /// Return the columns that were defaulted to zero during alignment.
    #[must_use]
    pub fn defaulted(&self) -> &[String] {
        &self.defaulted
    }
}

/// Reorder `record` to match `spec`.
///
/// Columns absent from the record are filled with `0.0` and logged as a
/// warning. Record entries the model does not use are dropped.
///
/// # Examples
/// ```
/// use deepshear::{align, FeatureRecord, ModelColumnSpec};
///
/// let mut record = FeatureRecord::new();
/// record.insert("h", 600.0).unwrap();
/// record.insert("b", 200.0).unwrap();
/// record.insert("unused", 1.0).unwrap();
/// let spec = ModelColumnSpec::new(["b", "h", "Aggregate"]).unwrap();
///
/// let row = align(&record, &spec);
/// assert_eq!(row.values(), &[200.0, 600.0, 0.0]);
/// assert_eq!(row.defaulted(), &["Aggregate".to_string()]);
/// ```
#[must_use]
pub fn align(record: &FeatureRecord, spec: &ModelColumnSpec) -> AlignedFeatureRow {
    let mut values = Vec::with_capacity(spec.len());
    let mut defaulted = Vec::new();
    for name in spec.names() {
        match record.get(name) {
            Some(value) => values.push(value),
            None => {
                warn!(feature = %name, "feature missing from input; defaulting to 0.0");
                values.push(0.0);
                defaulted.push(name.clone());
            }
        }
    }
    for extra in record.names().filter(|name| spec.position(name).is_none()) {
        debug!(feature = %extra, "feature not used by the model; dropped");
    }
    AlignedFeatureRow {
        values: DVector::from_vec(values),
        defaulted,
    }
}
