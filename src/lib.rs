//! # Polydiagnose
//!
//! Multi-disease prediction front-end for pre-trained binary classifiers.
//!
//! This crate provides:
//! - Field schemas for the diabetes, heart disease and Parkinson's flows
//! - A registry of classifier/scaler artifacts loaded once at startup
//! - Schema-checked inference and outcome messages
//! - Terminal user interface with a sidebar flow selector
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (Flow, FieldSpec, InputVector, Prediction, Outcome)
//! - `ports`: Trait definitions for classifiers, scalers and artifact loading
//! - `adapters`: Concrete implementations (JSON artifacts with manifest checks)
//! - `application`: Model registry and inference service
//! - `config`: Environment configuration
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Flow, InputVector, Outcome, Prediction};

/// Result type for Polydiagnose operations
pub type Result<T> = std::result::Result<T, PolydiagnoseError>;

/// Main error type for Polydiagnose
#[derive(Debug, thiserror::Error)]
pub enum PolydiagnoseError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to load {flow} {role} (set {var}): {source}")]
    ArtifactLoad {
        flow: Flow,
        role: config::ArtifactRole,
        var: String,
        #[source]
        source: ports::ModelError,
    },

    #[error("Model evaluation failed: {0}")]
    Model(#[from] ports::ModelError),

    #[error("Invalid input: {0}")]
    Schema(#[from] domain::SchemaError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Model not loaded for {0}")]
    ModelNotLoaded(Flow),
}
