//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the inference logic and the artifact format on disk.

mod model;

pub use model::{ArtifactLoader, Classifier, ModelError, Scaler};
