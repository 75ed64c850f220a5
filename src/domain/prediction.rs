//! Prediction result types.
//!
//! Represents the output of one classifier invocation.

use serde::{Deserialize, Serialize};

use super::flow::Flow;

/// Binary class predicted by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    /// Condition absent (class 0)
    Negative,
    /// Condition present (class 1)
    Positive,
}

impl Label {
    /// Map a raw class value. Only 0 and 1 are valid.
    #[must_use]
    pub fn from_class(class: u8) -> Option<Self> {
        match class {
            0 => Some(Self::Negative),
            1 => Some(Self::Positive),
            _ => None,
        }
    }

    #[must_use]
    pub fn class(&self) -> u8 {
        match self {
            Self::Negative => 0,
            Self::Positive => 1,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.class())
    }
}

/// Result of running one flow's classifier on an input vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Flow that produced the prediction
    pub flow: Flow,

    /// Predicted class
    pub label: Label,

    /// Probability of the positive class (0.0 to 1.0)
    pub probability: f64,
}

impl Prediction {
    /// Create a prediction; the probability is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(flow: Flow, label: Label, probability: f64) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };

        Self {
            flow,
            label,
            probability,
        }
    }

    /// Positive-class probability as a percentage in `[0, 100]`.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        (self.probability * 100.0).clamp(0.0, 100.0)
    }

    /// Percentage with exactly two decimals, e.g. `"12.50"`.
    #[must_use]
    pub fn formatted_percentage(&self) -> String {
        format!("{:.2}", self.percentage())
    }
}
