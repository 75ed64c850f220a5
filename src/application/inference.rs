//! Inference service: dispatches an input vector to its flow's artifacts.
//!
//! Pipeline for one request:
//! 1. Check the vector against the flow schema and the artifact's declared features
//! 2. Apply the flow's scaler, if any
//! 3. Predict the label
//! 4. Compute the positive-class probability

use std::sync::Arc;

use crate::application::ModelRegistry;
use crate::domain::{Flow, InputVector, Prediction, SchemaError};
use crate::PolydiagnoseError;

/// Service for running classifier inference on assembled input vectors.
///
/// Holds only a shared, read-only registry; calls are pure functions of
/// (artifact, vector).
#[derive(Debug, Clone)]
pub struct InferenceService {
    registry: Arc<ModelRegistry>,
}

impl InferenceService {
    /// Create a new inference service.
    #[must_use]
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Run inference for `flow` on `input`.
    ///
    /// # Errors
    /// Returns `PolydiagnoseError::Schema` if the vector or the artifacts do not
    /// match the flow's schema, `ModelNotLoaded` if the flow has no artifacts,
    /// or `Model` if evaluation fails.
    pub fn run_inference(
        &self,
        flow: Flow,
        input: &InputVector,
    ) -> Result<Prediction, PolydiagnoseError> {
        let models = self.registry.get(flow)?;
        let schema = flow.schema();

        tracing::debug!("Step 1: Validating {} input against schema...", flow);
        if input.flow() != flow {
            return Err(SchemaError::WrongFlow {
                expected: flow,
                got: input.flow(),
            }
            .into());
        }
        if input.len() != schema.len() {
            return Err(SchemaError::LengthMismatch {
                flow,
                expected: schema.len(),
                got: input.len(),
            }
            .into());
        }
        schema.check_feature_order(models.classifier.feature_names())?;

        let scaled;
        let features = match &models.scaler {
            Some(scaler) => {
                tracing::debug!("Step 2: Scaling {} features...", input.len());
                schema.check_feature_order(scaler.feature_names())?;
                scaled = scaler.transform(input.values())?;
                scaled.as_slice()
            }
            None => input.values(),
        };

        tracing::debug!("Step 3: Predicting label...");
        let label = models.classifier.predict(features)?;

        tracing::debug!("Step 4: Computing positive-class probability...");
        let probability = models.classifier.predict_probability(features)?;

        let prediction = Prediction::new(flow, label, probability);
        tracing::info!(
            "Inference complete: flow={}, prediction={}, probability={}%",
            flow,
            prediction.label,
            prediction.formatted_percentage()
        );

        Ok(prediction)
    }
}
