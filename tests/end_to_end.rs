#![warn(clippy::pedantic)]

use std::cell::Cell;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use deepshear::{
    align, columns, load_artifacts, AggregateType, AlignedFeatureRow, ArtifactPaths,
    DeepMemberParameters, FeatureError, FeatureRecord, LoadedModel, ModelAvailability,
    ModelColumnSpec, ModelFault, PredictionError, Regressor, ShearPredictor,
};

/// Model that records its calls and fails on the first one when asked to.
struct FlakyModel {
    n_features: usize,
    calls: Cell<usize>,
    fail_first: bool,
}

impl Regressor for FlakyModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, row: &AlignedFeatureRow) -> Result<f64, ModelFault> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if self.fail_first && call == 0 {
            return Err(ModelFault::Backend("inference kernel fault".to_string()));
        }
        Ok(row.values().iter().sum())
    }
}

fn scenario_record() -> FeatureRecord {
    DeepMemberParameters::default()
        .to_record()
        .expect("default parameters are valid")
}

fn shipped_artifacts() -> ArtifactPaths {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
    ArtifactPaths {
        model: root.join("solid_model.json"),
        columns: root.join("solid_columns.json"),
    }
}

#[test]
fn aligns_base_form_in_model_order() {
    let spec = ModelColumnSpec::new(columns::BASE).expect("valid columns");
    let row = align(&scenario_record(), &spec);
    assert_eq!(
        row.values(),
        &[200.0, 600.0, 1.0, 30.0, 1.2, 400.0, 0.5, 300.0, 0.5, 300.0]
    );
}

#[test]
fn absent_aggregate_column_is_zero_filled() {
    let mut names: Vec<&str> = columns::BASE.to_vec();
    names.push(columns::AGGREGATE);
    let spec = ModelColumnSpec::new(names).expect("valid columns");

    let row = align(&scenario_record(), &spec);

    assert_eq!(
        row.values(),
        &[200.0, 600.0, 1.0, 30.0, 1.2, 400.0, 0.5, 300.0, 0.5, 300.0, 0.0]
    );
    assert_eq!(row.defaulted(), &[columns::AGGREGATE.to_string()]);
}

#[test]
fn selected_aggregate_reaches_the_row() {
    let mut names: Vec<&str> = columns::BASE.to_vec();
    names.push(columns::AGGREGATE);
    let spec = ModelColumnSpec::new(names).expect("valid columns");
    let parameters = DeepMemberParameters {
        aggregate: Some(AggregateType::from_selection("Normal-weight").expect("known type")),
        ..DeepMemberParameters::default()
    };

    let row = align(&parameters.to_record().expect("valid parameters"), &spec);

    assert_relative_eq!(row.values()[10], 1.0);
    assert!(row.defaulted().is_empty());
}

#[test]
fn unknown_aggregate_code_never_reaches_the_row() {
    let spec = ModelColumnSpec::new([columns::AGGREGATE]).expect("valid columns");
    let mut record = FeatureRecord::new();

    assert_eq!(
        record.insert(columns::AGGREGATE, 3.0),
        Err(FeatureError::InvalidAggregateCode { value: 3.0 })
    );

    let row = align(&record, &spec);
    assert_eq!(row.values(), &[0.0]);
    assert_eq!(row.defaulted(), &[columns::AGGREGATE.to_string()]);
}

#[test]
fn unavailable_model_refuses_prediction() {
    let paths = ArtifactPaths {
        model: PathBuf::from("/nonexistent/solid_model.json"),
        columns: PathBuf::from("/nonexistent/solid_columns.json"),
    };
    let availability = load_artifacts(&paths);
    assert!(matches!(availability, ModelAvailability::Unavailable(_)));

    let predictor = ShearPredictor::new(availability);
    assert!(!predictor.is_available());
    assert!(predictor.columns().is_none());
    assert!(matches!(
        predictor.predict_record(&scenario_record()),
        Err(PredictionError::ModelUnavailable(_))
    ));
}

#[test]
fn model_fault_fails_only_that_request() {
    let spec = ModelColumnSpec::new(columns::BASE).expect("valid columns");
    let model = FlakyModel {
        n_features: spec.len(),
        calls: Cell::new(0),
        fail_first: true,
    };
    let predictor =
        ShearPredictor::from(LoadedModel::new(Box::new(model), spec).expect("matching widths"));

    let first = predictor.predict_record(&scenario_record());
    assert_eq!(
        first,
        Err(PredictionError::Model {
            source: ModelFault::Backend("inference kernel fault".to_string()),
        })
    );

    let mut other = FeatureRecord::new();
    other.insert("b", 300.0).expect("finite value");
    other.insert("h", 900.0).expect("finite value");
    let second = predictor
        .predict_record(&other)
        .expect("later request succeeds");
    assert!(predictor.is_available());
    assert_relative_eq!(second.kilonewtons(), 1_200.0);
}

#[test]
fn shipped_model_predicts_default_member() {
    let predictor = ShearPredictor::new(load_artifacts(&shipped_artifacts()));
    assert!(predictor.is_available());
    assert_eq!(
        predictor.columns().expect("model loaded").len(),
        columns::BASE.len()
    );

    let result = predictor
        .predict_record(&scenario_record())
        .expect("prediction succeeds");

    // 0.5 * linear(707) + 0.3 * tree(700) + 0.2 * forest((650 + 680) / 2)
    assert_relative_eq!(result.kilonewtons(), 696.5, epsilon = 1.0e-9);
}
