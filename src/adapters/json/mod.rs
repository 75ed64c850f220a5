//! JSON artifact adapter: Implementation of the model ports.
//!
//! Classifiers and scalers are exported by the training pipeline as JSON
//! documents. Every document carries a `format_version` and a `kind`:
//!
//! - `logistic_regression`: linear decision `d = w·x + b`, `P(classes[1]) = sigmoid(d)`
//! - `linear_svm`: same decision, `P(classes[1]) = 1 / (1 + exp(a·d + b))` (Platt)
//! - `standard_scaler`: `x' = (x - mean) / scale`
//!
//! Classifiers declare their class order in `classes` (a permutation of
//! `[0, 1]`), so the positive-class probability never depends on an assumed
//! column index.
//!
//! # Integrity
//!
//! If the model directory contains `manifest.json`, every artifact it lists
//! is checked against its SHA-256 digest before parsing.

pub mod manifest;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Label;
use crate::ports::{ArtifactLoader, Classifier, ModelError, Scaler};

pub use manifest::{sha256_hex, Manifest, MANIFEST_FILE};

/// Artifact format version understood by this adapter.
pub const FORMAT_VERSION: u32 = 1;

/// Upper bound on features per artifact (the widest flow has 22).
const MAX_FEATURES: usize = 256;

#[derive(Debug, Deserialize)]
struct ArtifactHeader {
    format_version: u32,
    kind: String,
}

/// Logistic regression parameters as exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionArtifact {
    pub feature_names: Vec<String>,
    pub classes: Vec<u8>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Platt scaling coefficients for a margin classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlattScaling {
    pub a: f64,
    pub b: f64,
}

/// Linear support vector machine parameters as exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvmArtifact {
    pub feature_names: Vec<String>,
    pub classes: Vec<u8>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub platt: PlattScaling,
}

/// Any supported classifier document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegressionArtifact),
    LinearSvm(LinearSvmArtifact),
}

/// Standardization parameters as exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScalerArtifact {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Any supported scaler document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    StandardScaler(StandardScalerArtifact),
}

const CLASSIFIER_KINDS: [&str; 2] = ["logistic_regression", "linear_svm"];
const SCALER_KINDS: [&str; 1] = ["standard_scaler"];

#[derive(Debug, Clone, Copy)]
enum Link {
    Logistic,
    Platt(PlattScaling),
}

/// Linear classifier evaluated from an exported artifact.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    /// Labels of the negative-margin and positive-margin sides, in that order.
    classes: [Label; 2],
    link: Link,
}

impl LinearClassifier {
    fn decision(&self, x: &[f64]) -> Result<f64, ModelError> {
        check_dimension(self.coefficients.len(), x.len())?;
        Ok(self
            .coefficients
            .iter()
            .zip(x)
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.intercept)
    }
}

impl Classifier for LinearClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, x: &[f64]) -> Result<Label, ModelError> {
        let d = self.decision(x)?;
        Ok(if d > 0.0 { self.classes[1] } else { self.classes[0] })
    }

    fn predict_probability(&self, x: &[f64]) -> Result<f64, ModelError> {
        let d = self.decision(x)?;
        let p_second = match self.link {
            Link::Logistic => sigmoid(d),
            Link::Platt(PlattScaling { a, b }) => sigmoid(-(a * d + b)),
        };

        Ok(match self.classes[1] {
            Label::Positive => p_second,
            Label::Negative => 1.0 - p_second,
        })
    }
}

/// Standard scaler evaluated from an exported artifact.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    feature_names: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl Scaler for StandardScaler {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_dimension(self.mean.len(), x.len())?;
        Ok(x.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }
}

fn check_dimension(expected: usize, got: usize) -> Result<(), ModelError> {
    if expected != got {
        return Err(ModelError::DimensionMismatch { expected, got });
    }
    Ok(())
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

fn validate_features(feature_names: &[String]) -> Result<(), String> {
    let n = feature_names.len();
    if n == 0 || n > MAX_FEATURES {
        return Err(format!(
            "Invalid feature count: got {n}, expected 1..={MAX_FEATURES}"
        ));
    }
    if feature_names.iter().any(|name| name.trim().is_empty()) {
        return Err("Feature names must be non-empty".into());
    }
    Ok(())
}

fn validate_params(name: &str, values: &[f64], n: usize) -> Result<(), String> {
    if values.len() != n {
        return Err(format!(
            "{name} has {} entries but there are {n} features",
            values.len()
        ));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(format!("{name} contains non-finite values"));
    }
    Ok(())
}

fn validate_classes(classes: &[u8]) -> Result<[Label; 2], String> {
    let invalid = || format!("classes must be a permutation of [0, 1], got {classes:?}");
    match *classes {
        [first, second] if first != second => Ok([
            Label::from_class(first).ok_or_else(invalid)?,
            Label::from_class(second).ok_or_else(invalid)?,
        ]),
        _ => Err(invalid()),
    }
}

fn build_linear(
    feature_names: Vec<String>,
    classes: &[u8],
    coefficients: Vec<f64>,
    intercept: f64,
    link: Link,
) -> Result<LinearClassifier, String> {
    validate_features(&feature_names)?;
    validate_params("coefficients", &coefficients, feature_names.len())?;
    if !intercept.is_finite() {
        return Err("intercept is not finite".into());
    }
    let classes = validate_classes(classes)?;

    Ok(LinearClassifier {
        feature_names,
        coefficients,
        intercept,
        classes,
        link,
    })
}

impl ClassifierArtifact {
    /// Validate parameters and build the runtime classifier.
    ///
    /// # Errors
    /// Returns a description of the first invalid parameter.
    pub fn into_classifier(self) -> Result<LinearClassifier, String> {
        match self {
            Self::LogisticRegression(a) => build_linear(
                a.feature_names,
                &a.classes,
                a.coefficients,
                a.intercept,
                Link::Logistic,
            ),
            Self::LinearSvm(a) => {
                if !a.platt.a.is_finite() || !a.platt.b.is_finite() {
                    return Err("platt coefficients are not finite".into());
                }
                build_linear(
                    a.feature_names,
                    &a.classes,
                    a.coefficients,
                    a.intercept,
                    Link::Platt(a.platt),
                )
            }
        }
    }
}

impl ScalerArtifact {
    /// Validate parameters and build the runtime scaler.
    ///
    /// Zero entries in `scale` are treated as 1 (constant features).
    ///
    /// # Errors
    /// Returns a description of the first invalid parameter.
    pub fn into_scaler(self) -> Result<StandardScaler, String> {
        match self {
            Self::StandardScaler(a) => {
                validate_features(&a.feature_names)?;
                let n = a.feature_names.len();
                validate_params("mean", &a.mean, n)?;
                validate_params("scale", &a.scale, n)?;

                let scale = a
                    .scale
                    .into_iter()
                    .map(|s| if s == 0.0 { 1.0 } else { s })
                    .collect();

                Ok(StandardScaler {
                    feature_names: a.feature_names,
                    mean: a.mean,
                    scale,
                })
            }
        }
    }
}

/// Loads JSON artifacts from disk, verifying them against the model
/// directory's manifest when one is present.
#[derive(Debug)]
pub struct JsonArtifactLoader {
    model_dir: PathBuf,
    manifest: Option<Manifest>,
    require_manifest: bool,
}

impl JsonArtifactLoader {
    /// Create a loader rooted at `model_dir`.
    ///
    /// # Errors
    /// Returns `ModelError::Integrity` if a manifest is required but missing,
    /// or present but invalid.
    pub fn new(model_dir: &Path, require_manifest: bool) -> Result<Self, ModelError> {
        let manifest_path = model_dir.join(MANIFEST_FILE);
        let manifest = if manifest_path.exists() {
            let manifest = Manifest::load(&manifest_path)?;
            tracing::info!(
                "Loaded artifact manifest from {:?} ({} files)",
                manifest_path,
                manifest.files.len()
            );
            Some(manifest)
        } else if require_manifest {
            return Err(ModelError::Integrity {
                path: manifest_path,
                reason: "Manifest required but not found".into(),
            });
        } else {
            tracing::warn!(
                "No artifact manifest at {:?}; artifacts will be loaded unverified",
                manifest_path
            );
            None
        };

        Ok(Self {
            model_dir: model_dir.to_path_buf(),
            manifest,
            require_manifest,
        })
    }

    /// Read an artifact and check it against the manifest.
    fn read_verified(&self, path: &Path) -> Result<Vec<u8>, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(|source| ModelError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let Some(manifest) = &self.manifest else {
            return Ok(bytes);
        };

        let relative = path
            .strip_prefix(&self.model_dir)
            .ok()
            .and_then(|p| p.to_str())
            .map(|p| p.replace('\\', "/"));

        match relative.as_deref().filter(|name| manifest.binds(name)) {
            Some(name) => manifest.verify(name, path, &bytes)?,
            None if self.require_manifest => {
                return Err(ModelError::Integrity {
                    path: path.to_path_buf(),
                    reason: "Artifact is not bound by the manifest".into(),
                });
            }
            None => tracing::warn!("Artifact {:?} is not listed in the manifest", path),
        }

        Ok(bytes)
    }

    fn parse<T: for<'de> Deserialize<'de>>(
        path: &Path,
        bytes: &[u8],
        expected_kinds: &[&str],
    ) -> Result<T, ModelError> {
        let corrupt = |reason: String| ModelError::Corrupt {
            path: path.to_path_buf(),
            reason,
        };

        let header: ArtifactHeader =
            serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;
        if header.format_version != FORMAT_VERSION {
            return Err(corrupt(format!(
                "Unsupported format_version {} (expected {FORMAT_VERSION})",
                header.format_version
            )));
        }
        if !expected_kinds.contains(&header.kind.as_str()) {
            return Err(corrupt(format!(
                "Unexpected artifact kind {:?} (expected one of {:?})",
                header.kind, expected_kinds
            )));
        }

        serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))
    }
}

impl ArtifactLoader for JsonArtifactLoader {
    fn load_classifier(&self, path: &Path) -> Result<Box<dyn Classifier>, ModelError> {
        let bytes = self.read_verified(path)?;
        let artifact: ClassifierArtifact = Self::parse(path, &bytes, &CLASSIFIER_KINDS)?;
        let classifier = artifact.into_classifier().map_err(|reason| ModelError::Corrupt {
            path: path.to_path_buf(),
            reason,
        })?;

        tracing::info!(
            "Loaded classifier from {:?} (n_features={})",
            path,
            classifier.n_features()
        );
        Ok(Box::new(classifier))
    }

    fn load_scaler(&self, path: &Path) -> Result<Box<dyn Scaler>, ModelError> {
        let bytes = self.read_verified(path)?;
        let artifact: ScalerArtifact = Self::parse(path, &bytes, &SCALER_KINDS)?;
        let scaler = artifact.into_scaler().map_err(|reason| ModelError::Corrupt {
            path: path.to_path_buf(),
            reason,
        })?;

        tracing::info!(
            "Loaded scaler from {:?} (n_features={})",
            path,
            scaler.feature_names().len()
        );
        Ok(Box::new(scaler))
    }
}
