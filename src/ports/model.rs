//! Model ports: Traits for pre-trained classifiers and feature scalers.
//!
//! These traits abstract the artifact format from the inference logic. The
//! dispatcher only ever sees `dyn Classifier` and `dyn Scaler`.

use std::path::Path;

use crate::domain::Label;

/// Errors raised by artifacts, either while loading or while evaluating.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Artifact not found at {0:?}")]
    NotFound(std::path::PathBuf),

    #[error("Failed to read artifact {path:?}: {source}")]
    Unreadable {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt artifact {path:?}: {reason}")]
    Corrupt {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("Integrity check failed for {path:?}: {reason}")]
    Integrity {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("Dimension mismatch: artifact expects {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// A trained binary classifier.
///
/// Implementations must be pure: the same input always yields the same
/// label and probability.
pub trait Classifier: Send + Sync {
    /// Feature names in the order the classifier was trained on.
    fn feature_names(&self) -> &[String];

    /// Number of input features.
    fn n_features(&self) -> usize {
        self.feature_names().len()
    }

    /// Predict the class of one sample.
    ///
    /// # Errors
    /// Returns `ModelError::DimensionMismatch` if `x` has the wrong length.
    fn predict(&self, x: &[f64]) -> Result<Label, ModelError>;

    /// Probability (0.0 to 1.0) that one sample belongs to the positive class.
    ///
    /// # Errors
    /// Returns `ModelError::DimensionMismatch` if `x` has the wrong length.
    fn predict_probability(&self, x: &[f64]) -> Result<f64, ModelError>;
}

/// A fitted feature transformer applied before classification.
pub trait Scaler: Send + Sync {
    /// Feature names in the order the scaler was fitted on.
    fn feature_names(&self) -> &[String];

    /// Transform one sample.
    ///
    /// # Errors
    /// Returns `ModelError::DimensionMismatch` if `x` has the wrong length.
    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, ModelError>;
}

/// Source of deserialized artifacts.
pub trait ArtifactLoader {
    /// Load a classifier from `path`.
    ///
    /// # Errors
    /// Returns `ModelError` if the artifact is missing, unreadable or corrupt.
    fn load_classifier(&self, path: &Path) -> Result<Box<dyn Classifier>, ModelError>;

    /// Load a scaler from `path`.
    ///
    /// # Errors
    /// Returns `ModelError` if the artifact is missing, unreadable or corrupt.
    fn load_scaler(&self, path: &Path) -> Result<Box<dyn Scaler>, ModelError>;
}
