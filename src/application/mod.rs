//! Application layer: Use cases and services.
//!
//! This module loads the artifacts once and dispatches input vectors to
//! them.

mod inference;
mod registry;

pub use inference::InferenceService;
pub use registry::{FlowModels, ModelRegistry};
