//! Domain layer: Core types and logic.
//!
//! This module contains pure Rust types with no I/O. Flow schemas, input
//! vectors, predictions and the outcome presenter live here.

mod flow;
mod outcome;
mod prediction;
mod schema;

pub use flow::Flow;
pub use outcome::{Outcome, Severity};
pub use prediction::{Label, Prediction};
pub use schema::{
    FieldSpec, FlowSchema, InputVector, SchemaError, DIABETES_SCHEMA, HEART_SCHEMA,
    PARKINSONS_SCHEMA,
};
