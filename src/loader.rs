//! Loading of the model artifact and its column list.
//!
//! Both files are read as a unit. If either one is missing or malformed the
//! result is [`ModelAvailability::Unavailable`] and no model is handed out.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::errors::LoadError;
use crate::features::ModelColumnSpec;
use crate::model::{Regressor, StackingRegressor};

/// A model paired with the columns it was trained on.
pub struct LoadedModel {
    /// The trained model.
    model: Box<dyn Regressor>,
    /// Column order expected by `model`.
    columns: ModelColumnSpec,
}

impl LoadedModel {
    /// Pair a model with its column list.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ColumnCountMismatch`] when the model's input width
    /// differs from the number of columns.
    pub fn new(model: Box<dyn Regressor>, columns: ModelColumnSpec) -> Result<Self, LoadError> {
        if model.n_features() != columns.len() {
            return Err(LoadError::ColumnCountMismatch {
                model: model.n_features(),
                columns: columns.len(),
            });
        }
        Ok(Self { model, columns })
    }

    /// Return the trained model.
    #[must_use]
    pub fn model(&self) -> &dyn Regressor {
        self.model.as_ref()
    }

    /// Return the column order expected by the model.
    #[must_use]
    pub fn columns(&self) -> &ModelColumnSpec {
        &self.columns
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("n_features", &self.model.n_features())
            .field("columns", &self.columns)
            .finish()
    }
}

/// Reason no model is available for this session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadFailure {
    /// Human readable explanation.
    pub reason: String,
}

/// Outcome of loading the model artifacts.
#[derive(Debug)]
pub enum ModelAvailability {
    /// Both the model and its columns were loaded.
    Loaded(LoadedModel),
    /// Loading failed; prediction must not be attempted.
    Unavailable(LoadFailure),
}

impl From<Result<LoadedModel, LoadError>> for ModelAvailability {
    fn from(result: Result<LoadedModel, LoadError>) -> Self {
        match result {
            Ok(loaded) => Self::Loaded(loaded),
            Err(err) => Self::Unavailable(LoadFailure {
                reason: err.to_string(),
            }),
        }
    }
}

/// Locations of the model artifact and its column list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Serialized [`StackingRegressor`].
    pub model: PathBuf,
    /// JSON array of column names.
    pub columns: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from("solid_model.json"),
            columns: PathBuf::from("solid_columns.json"),
        }
    }
}

/// Read and parse a JSON file.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the column list from `path`.
///
/// # Errors
///
/// Returns [`LoadError`] when the file cannot be read or parsed, or when the
/// list is empty or repeats a name.
pub fn load_columns(path: &Path) -> Result<ModelColumnSpec, LoadError> {
    let names: Vec<String> = read_json(path)?;
    ModelColumnSpec::new(names)
}

/// Load a [`StackingRegressor`] from `path`.
///
/// # Errors
///
/// Returns [`LoadError`] when the file cannot be read or parsed.
pub fn load_model(path: &Path) -> Result<StackingRegressor, LoadError> {
    read_json(path)
}

/// Load the model and its columns, failing if either is unusable.
///
/// # Errors
///
/// Returns the first [`LoadError`] encountered.
pub fn try_load_artifacts(paths: &ArtifactPaths) -> Result<LoadedModel, LoadError> {
    let model = load_model(&paths.model)?;
    let columns = load_columns(&paths.columns)?;
    LoadedModel::new(Box::new(model), columns)
}

/// Load the model and its columns as a unit.
///
/// Failures are logged and folded into [`ModelAvailability::Unavailable`].
#[must_use]
pub fn load_artifacts(paths: &ArtifactPaths) -> ModelAvailability {
    let availability = ModelAvailability::from(try_load_artifacts(paths));
    match &availability {
        ModelAvailability::Loaded(loaded) => info!(
            model = %paths.model.display(),
            columns = loaded.columns().len(),
            "model loaded"
        ),
        ModelAvailability::Unavailable(failure) => error!(
            model = %paths.model.display(),
            columns = %paths.columns.display(),
            reason = %failure.reason,
            "model unavailable"
        ),
    }
    availability
}
