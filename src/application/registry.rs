//! Model registry: the artifacts loaded once at startup.
//!
//! The registry is immutable after construction and shared behind an `Arc`.
//! There is no reload and no partial availability: if any configured
//! artifact fails to load, construction fails.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{AppConfig, ArtifactRole};
use crate::domain::Flow;
use crate::ports::{ArtifactLoader, Classifier, Scaler};
use crate::PolydiagnoseError;

/// Classifier and optional scaler for one flow.
pub struct FlowModels {
    pub classifier: Box<dyn Classifier>,
    pub scaler: Option<Box<dyn Scaler>>,
}

impl std::fmt::Debug for FlowModels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowModels")
            .field("n_features", &self.classifier.n_features())
            .field("scaled", &self.scaler.is_some())
            .finish()
    }
}

/// Read-only lookup of loaded artifacts by flow.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: BTreeMap<Flow, FlowModels>,
}

impl ModelRegistry {
    /// Load every flow's artifacts named by `config`.
    ///
    /// # Errors
    /// Returns `PolydiagnoseError::ArtifactLoad` for the first artifact that is
    /// missing, unreadable or corrupt, naming the variable that configures it.
    pub fn load<L: ArtifactLoader>(
        config: &AppConfig,
        loader: &L,
    ) -> Result<Self, PolydiagnoseError> {
        tracing::info!("Loading model artifacts...");

        let mut registry = Self::default();
        for flow in Flow::ALL {
            let paths = config.artifacts(flow).ok_or_else(|| {
                PolydiagnoseError::Validation(format!("No artifact paths configured for {flow}"))
            })?;

            let classifier = load_one(flow, ArtifactRole::Classifier, &paths.classifier, |p| {
                loader.load_classifier(p)
            })?;

            let scaler = match &paths.scaler {
                Some(path) => Some(load_one(flow, ArtifactRole::Scaler, path, |p| {
                    loader.load_scaler(p)
                })?),
                None => None,
            };

            registry.insert(flow, FlowModels { classifier, scaler });
        }

        tracing::info!("Loaded artifacts for {} flows", registry.models.len());
        Ok(registry)
    }

    /// Register a flow's models. Used while building the registry.
    pub fn insert(&mut self, flow: Flow, models: FlowModels) {
        warn_on_schema_drift(flow, &models);
        self.models.insert(flow, models);
    }

    /// Models for `flow`.
    ///
    /// # Errors
    /// Returns `PolydiagnoseError::ModelNotLoaded` if the flow has no models.
    pub fn get(&self, flow: Flow) -> Result<&FlowModels, PolydiagnoseError> {
        self.models
            .get(&flow)
            .ok_or(PolydiagnoseError::ModelNotLoaded(flow))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

fn load_one<T>(
    flow: Flow,
    role: ArtifactRole,
    path: &Path,
    load: impl FnOnce(&Path) -> Result<T, crate::ports::ModelError>,
) -> Result<T, PolydiagnoseError> {
    load(path).map_err(|source| {
        tracing::error!("Failed to load {flow} {role} from {:?}: {source}", path);
        PolydiagnoseError::ArtifactLoad {
            flow,
            role,
            var: AppConfig::artifact_var(flow, role),
            source,
        }
    })
}

/// Flag artifacts whose declared feature order disagrees with the flow's
/// schema. Requests against such a flow fail validation in the dispatcher.
fn warn_on_schema_drift(flow: Flow, models: &FlowModels) {
    let schema = flow.schema();
    if let Err(e) = schema.check_feature_order(models.classifier.feature_names()) {
        tracing::warn!("{flow} classifier does not match the form schema: {e}");
    }
    if let Some(scaler) = &models.scaler {
        if let Err(e) = schema.check_feature_order(scaler.feature_names()) {
            tracing::warn!("{flow} scaler does not match the form schema: {e}");
        }
    }
}
