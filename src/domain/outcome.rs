//! Outcome messages shown below the form.

use serde::{Deserialize, Serialize};

use super::prediction::{Label, Prediction};

/// Visual tone of an outcome message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Condition ruled out
    Success,
    /// Condition predicted
    Warning,
}

impl Severity {
    /// Short tag drawn before the message.
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Warning => "!",
        }
    }
}

/// Human-readable rendering of a prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub severity: Severity,
    /// Statement about the condition, e.g. "The person is not diabetic."
    pub headline: String,
    /// Probability line, e.g. "Probability: 8.51%"
    pub detail: String,
}

impl Outcome {
    #[must_use]
    pub fn from_prediction(prediction: &Prediction) -> Self {
        let (severity, headline) = match prediction.label {
            Label::Positive => (Severity::Warning, prediction.flow.positive_statement()),
            Label::Negative => (Severity::Success, prediction.flow.negative_statement()),
        };

        Self {
            severity,
            headline: headline.to_string(),
            detail: format!("Probability: {}%", prediction.formatted_percentage()),
        }
    }
}

impl From<&Prediction> for Outcome {
    fn from(prediction: &Prediction) -> Self {
        Self::from_prediction(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Flow;

    #[test]
    fn test_positive_routes_to_warning() {
        for flow in Flow::ALL {
            let outcome = Outcome::from_prediction(&Prediction::new(flow, Label::Positive, 0.8));
            assert_eq!(outcome.severity, Severity::Warning);
            assert_eq!(outcome.headline, flow.positive_statement());
            assert_eq!(outcome.detail, "Probability: 80.00%");
        }
    }

    #[test]
    fn test_negative_routes_to_success() {
        for flow in Flow::ALL {
            let outcome = Outcome::from_prediction(&Prediction::new(flow, Label::Negative, 0.0851));
            assert_eq!(outcome.severity, Severity::Success);
            assert_eq!(outcome.headline, flow.negative_statement());
            assert_eq!(outcome.detail, "Probability: 8.51%");
        }
    }

    #[test]
    fn test_outcome_from_prediction_reference() {
        let prediction = Prediction::new(Flow::Diabetes, Label::Positive, 0.7312);
        let outcome: Outcome = (&prediction).into();
        assert_eq!(outcome.headline, "The person is diabetic.");
        assert_eq!(outcome.detail, "Probability: 73.12%");
    }
}
