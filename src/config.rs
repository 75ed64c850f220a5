//! Runtime configuration resolved from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `POLYDIAGNOSE_MODEL_DIR` | `models` |
//! | `POLYDIAGNOSE_<FLOW>_MODEL` | `<dir>/<flow>_model.json` |
//! | `POLYDIAGNOSE_<FLOW>_SCALER` | `<dir>/<flow>_scaler.json` (scaled flows only) |
//! | `POLYDIAGNOSE_REQUIRE_MANIFEST` | `false` |
//! | `POLYDIAGNOSE_LOG_MODE` | `auto` (`file` when stdout is a terminal) |
//! | `POLYDIAGNOSE_LOG_FILE` | `polydiagnose.log` |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::Flow;

pub const ENV_PREFIX: &str = "POLYDIAGNOSE_";
pub const MODEL_DIR_ENV: &str = "POLYDIAGNOSE_MODEL_DIR";
pub const REQUIRE_MANIFEST_ENV: &str = "POLYDIAGNOSE_REQUIRE_MANIFEST";
pub const LOG_MODE_ENV: &str = "POLYDIAGNOSE_LOG_MODE";
pub const LOG_FILE_ENV: &str = "POLYDIAGNOSE_LOG_FILE";

pub const DEFAULT_MODEL_DIR: &str = "models";
pub const DEFAULT_LOG_FILE: &str = "polydiagnose.log";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Model directory {path:?} not found. Set {var} to a directory containing the model artifacts.")]
    ModelDirNotFound { path: PathBuf, var: &'static str },

    #[error("{var} is set but empty")]
    Empty { var: String },
}

/// Which half of a flow's artifact pair a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRole {
    Classifier,
    Scaler,
}

impl ArtifactRole {
    fn env_suffix(&self) -> &'static str {
        match self {
            Self::Classifier => "MODEL",
            Self::Scaler => "SCALER",
        }
    }

    fn file_suffix(&self) -> &'static str {
        match self {
            Self::Classifier => "model",
            Self::Scaler => "scaler",
        }
    }
}

impl std::fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classifier => write!(f, "classifier"),
            Self::Scaler => write!(f, "scaler"),
        }
    }
}

/// Artifact locations for one flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub classifier: PathBuf,
    /// `None` for flows that run on raw features.
    pub scaler: Option<PathBuf>,
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdout is a terminal (the TUI owns it), stdout otherwise.
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Whether to log to a file, given whether stdout is interactive.
    #[must_use]
    pub fn use_file(&self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model_dir: PathBuf,
    pub require_manifest: bool,
    pub artifacts: BTreeMap<Flow, ArtifactPaths>,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError::Empty` if a variable is set to an empty string.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `ConfigError::Empty` if a variable is set to an empty string.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| -> Result<Option<String>, ConfigError> {
            match lookup(name) {
                Some(v) if v.trim().is_empty() => Err(ConfigError::Empty {
                    var: name.to_string(),
                }),
                Some(v) => Ok(Some(v.trim().to_string())),
                None => Ok(None),
            }
        };

        let model_dir = get(MODEL_DIR_ENV)?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR));

        let mut artifacts = BTreeMap::new();
        for flow in Flow::ALL {
            let resolve = |role: ArtifactRole| -> Result<PathBuf, ConfigError> {
                Ok(get(Self::artifact_var(flow, role).as_str())?
                    .map(PathBuf::from)
                    .unwrap_or_else(|| Self::default_artifact_path(&model_dir, flow, role)))
            };

            let classifier = resolve(ArtifactRole::Classifier)?;
            let scaler = if flow.uses_scaler() {
                Some(resolve(ArtifactRole::Scaler)?)
            } else {
                None
            };
            artifacts.insert(flow, ArtifactPaths { classifier, scaler });
        }

        let require_manifest = get(REQUIRE_MANIFEST_ENV)?
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        let log_mode = get(LOG_MODE_ENV)?
            .map(|v| LogMode::parse(&v))
            .unwrap_or(LogMode::Auto);
        let log_file = get(LOG_FILE_ENV)?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

        Ok(Self {
            model_dir,
            require_manifest,
            artifacts,
            log_mode,
            log_file,
        })
    }

    /// Environment variable that overrides one artifact path,
    /// e.g. `POLYDIAGNOSE_HEART_SCALER`.
    #[must_use]
    pub fn artifact_var(flow: Flow, role: ArtifactRole) -> String {
        format!(
            "{ENV_PREFIX}{}_{}",
            flow.key().to_ascii_uppercase(),
            role.env_suffix()
        )
    }

    fn default_artifact_path(model_dir: &Path, flow: Flow, role: ArtifactRole) -> PathBuf {
        model_dir.join(format!("{}_{}.json", flow.key(), role.file_suffix()))
    }

    /// Artifact paths configured for `flow`.
    #[must_use]
    pub fn artifacts(&self, flow: Flow) -> Option<&ArtifactPaths> {
        self.artifacts.get(&flow)
    }

    /// Check that the model directory exists whenever an artifact path
    /// depends on it.
    ///
    /// # Errors
    /// Returns `ConfigError::ModelDirNotFound` naming the variable to set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let depends_on_dir = self
            .artifacts
            .values()
            .flat_map(|a| std::iter::once(&a.classifier).chain(a.scaler.as_ref()))
            .any(|p| p.starts_with(&self.model_dir));

        if (depends_on_dir || self.require_manifest) && !self.model_dir.is_dir() {
            return Err(ConfigError::ModelDirNotFound {
                path: self.model_dir.clone(),
                var: MODEL_DIR_ENV,
            });
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("Should resolve");

        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert!(!config.require_manifest);
        assert_eq!(config.log_mode, LogMode::Auto);
        assert_eq!(config.log_file, PathBuf::from("polydiagnose.log"));

        let diabetes = config.artifacts(Flow::Diabetes).expect("diabetes paths");
        assert_eq!(diabetes.classifier, PathBuf::from("models/diabetes_model.json"));
        assert_eq!(
            diabetes.scaler.as_deref(),
            Some(Path::new("models/diabetes_scaler.json"))
        );

        let parkinsons = config.artifacts(Flow::Parkinsons).expect("parkinsons paths");
        assert_eq!(
            parkinsons.classifier,
            PathBuf::from("models/parkinsons_model.json")
        );
        assert!(parkinsons.scaler.is_none());
    }

    #[test]
    fn test_model_dir_and_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("POLYDIAGNOSE_MODEL_DIR", "/srv/models"),
            ("POLYDIAGNOSE_PARKINSONS_MODEL", "/opt/parkinsons.json"),
            ("POLYDIAGNOSE_REQUIRE_MANIFEST", "yes"),
            ("POLYDIAGNOSE_LOG_MODE", "stdout"),
        ]))
        .expect("Should resolve");

        assert!(config.require_manifest);
        assert_eq!(config.log_mode, LogMode::Stdout);
        assert_eq!(
            config.artifacts(Flow::Heart).expect("heart").classifier,
            PathBuf::from("/srv/models/heart_model.json")
        );
        assert_eq!(
            config.artifacts(Flow::Parkinsons).expect("parkinsons").classifier,
            PathBuf::from("/opt/parkinsons.json")
        );
    }

    #[test]
    fn test_artifact_var_names() {
        assert_eq!(
            AppConfig::artifact_var(Flow::Diabetes, ArtifactRole::Classifier),
            "POLYDIAGNOSE_DIABETES_MODEL"
        );
        assert_eq!(
            AppConfig::artifact_var(Flow::Heart, ArtifactRole::Scaler),
            "POLYDIAGNOSE_HEART_SCALER"
        );
    }

    #[test]
    fn test_empty_variable_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("POLYDIAGNOSE_HEART_MODEL", "  ")]))
            .expect_err("Should reject");
        assert_eq!(
            err,
            ConfigError::Empty {
                var: "POLYDIAGNOSE_HEART_MODEL".into()
            }
        );
    }

    #[test]
    fn test_validate_missing_model_dir() {
        let config = AppConfig::from_lookup(lookup(&[(
            "POLYDIAGNOSE_MODEL_DIR",
            "/nonexistent/polydiagnose-models",
        )]))
        .expect("Should resolve");

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ModelDirNotFound { var: MODEL_DIR_ENV, .. })
        ));
    }

    #[test]
    fn test_log_mode_use_file() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert!(!LogMode::Stdout.use_file(true));
    }
}
