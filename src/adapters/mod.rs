//! Adapters layer: Concrete implementations of ports.
//!
//! - `json`: classifiers and scalers exported as JSON by the training
//!   pipeline, with optional SHA-256 manifest verification

pub mod json;

pub use json::JsonArtifactLoader;
