//! Design parameters of a solid deep flexural member.

use std::fmt;
use std::str::FromStr;

use crate::errors::FeatureError;
use crate::features::{columns, FeatureRecord};

/// Smallest shear-span ratio accepted by the form.
pub const MIN_SHEAR_SPAN_RATIO: f64 = 0.2;
/// Largest shear-span ratio accepted by the form.
pub const MAX_SHEAR_SPAN_RATIO: f64 = 2.5;

/// Concrete classification by aggregate weight.
///
/// The model was trained with this feature coded as `1` or `2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregateType {
    /// Normal-weight concrete, coded `1`.
    Normal,
    /// Lightweight concrete, coded `2`.
    Lightweight,
}

impl AggregateType {
    /// Interpret a user selection.
    ///
    /// Selections mentioning "normal" map to [`AggregateType::Normal`] and
    /// selections mentioning "light" map to [`AggregateType::Lightweight`]. The
    /// comparison ignores case.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::UnsupportedAggregate`] for any other selection.
    ///
    /// # Examples
    /// ```
    /// use deepshear::AggregateType;
    ///
    /// let normal = AggregateType::from_selection("Normal-weight concrete").unwrap();
    /// assert_eq!(normal.code(), 1);
    /// let light = AggregateType::from_selection("lightweight").unwrap();
    /// assert_eq!(light.code(), 2);
    /// assert!(AggregateType::from_selection("recycled").is_err());
    /// ```
    pub fn from_selection(selection: &str) -> Result<Self, FeatureError> {
        let lowered = selection.to_lowercase();
        if lowered.contains("normal") {
            Ok(Self::Normal)
        } else if lowered.contains("light") {
            Ok(Self::Lightweight)
        } else {
            Err(FeatureError::UnsupportedAggregate(selection.to_string()))
        }
    }

    /// Integer code used by the trained model.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::Lightweight => 2,
        }
    }

    /// Recover the aggregate type from its model code.
    ///
    /// Returns `None` for anything but exactly `1.0` or `2.0`.
    #[must_use]
    pub fn from_code(code: f64) -> Option<Self> {
        [Self::Normal, Self::Lightweight]
            .into_iter()
            .find(|aggregate| f64::from(aggregate.code()) == code)
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal-weight concrete",
            Self::Lightweight => "lightweight concrete",
        }
    }
}

impl FromStr for AggregateType {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_selection(s)
    }
}

impl fmt::Display for AggregateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reinforcement ratio and yield strength of one bar group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reinforcement {
    /// Reinforcement ratio in percent.
    pub ratio: f64,
    /// Yield strength in megapascals.
    pub yield_strength: f64,
}

impl Reinforcement {
    /// Create a [`Reinforcement`] with explicit values.
    #[must_use]
    pub const fn new(ratio: f64, yield_strength: f64) -> Self {
        Self {
            ratio,
            yield_strength,
        }
    }
}

/// Inputs collected for one deep member.
///
/// The defaults reproduce the initial state of the input form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeepMemberParameters {
    /// Section width `b` in millimetres.
    pub width: f64,
    /// Section height `h` in millimetres.
    pub height: f64,
    /// Shear-span ratio `a/h`.
    pub shear_span_ratio: f64,
    /// Concrete strength `fc` in megapascals.
    pub concrete_strength: f64,
    /// Longitudinal reinforcement.
    pub longitudinal: Reinforcement,
    /// Vertical web reinforcement (stirrups).
    pub vertical: Reinforcement,
    /// Horizontal web reinforcement.
    pub horizontal: Reinforcement,
    /// Aggregate type, when the form asks for it.
    pub aggregate: Option<AggregateType>,
}

impl Default for DeepMemberParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl DeepMemberParameters {
    /// Initial state of the input form.
    pub const DEFAULT: Self = Self {
        width: 200.0,
        height: 600.0,
        shear_span_ratio: 1.0,
        concrete_strength: 30.0,
        longitudinal: Reinforcement::new(1.2, 400.0),
        vertical: Reinforcement::new(0.5, 300.0),
        horizontal: Reinforcement::new(0.5, 300.0),
        aggregate: None,
    };

    /// Convert the parameters into a feature record keyed by training column names.
    ///
    /// `Aggregate` is only present when an aggregate type was selected.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::ShearSpanOutOfRange`] when the shear-span ratio is
    /// outside [`MIN_SHEAR_SPAN_RATIO`]..=[`MAX_SHEAR_SPAN_RATIO`] and
    /// [`FeatureError::NonFinite`] when any value is NaN or infinite.
    ///
    /// # Examples
    /// ```
    /// use deepshear::DeepMemberParameters;
    ///
    /// let record = DeepMemberParameters::default().to_record().unwrap();
    /// assert_eq!(record.get("a/h"), Some(1.0));
    /// assert_eq!(record.get("Aggregate"), None);
    /// ```
    pub fn to_record(&self) -> Result<FeatureRecord, FeatureError> {
        check_shear_span_ratio(self.shear_span_ratio)?;
        let mut record = FeatureRecord::new();
        record.insert(columns::WIDTH, self.width)?;
        record.insert(columns::HEIGHT, self.height)?;
        record.insert(columns::SHEAR_SPAN_RATIO, self.shear_span_ratio)?;
        record.insert(columns::CONCRETE_STRENGTH, self.concrete_strength)?;
        record.insert(columns::LONGITUDINAL_RATIO, self.longitudinal.ratio)?;
        record.insert(columns::LONGITUDINAL_YIELD, self.longitudinal.yield_strength)?;
        record.insert(columns::HORIZONTAL_RATIO, self.horizontal.ratio)?;
        record.insert(columns::HORIZONTAL_YIELD, self.horizontal.yield_strength)?;
        record.insert(columns::VERTICAL_RATIO, self.vertical.ratio)?;
        record.insert(columns::VERTICAL_YIELD, self.vertical.yield_strength)?;
        if let Some(aggregate) = self.aggregate {
            record.insert(columns::AGGREGATE, f64::from(aggregate.code()))?;
        }
        Ok(record)
    }
}

/// Validate a shear-span ratio against the supported interval.
///
/// # Errors
///
/// Returns [`FeatureError::ShearSpanOutOfRange`] for values outside the closed
/// interval, including NaN.
pub fn check_shear_span_ratio(value: f64) -> Result<f64, FeatureError> {
    if (MIN_SHEAR_SPAN_RATIO..=MAX_SHEAR_SPAN_RATIO).contains(&value) {
        Ok(value)
    } else {
        Err(FeatureError::ShearSpanOutOfRange {
            value,
            min: MIN_SHEAR_SPAN_RATIO,
            max: MAX_SHEAR_SPAN_RATIO,
        })
    }
}
