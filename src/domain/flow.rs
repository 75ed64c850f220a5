//! Prediction flows: the three disease pages selectable from the sidebar.

use serde::{Deserialize, Serialize};

use super::schema::{FlowSchema, DIABETES_SCHEMA, HEART_SCHEMA, PARKINSONS_SCHEMA};

/// One of the independent disease-prediction pages.
///
/// A flow pairs a fixed field schema with the artifacts loaded for it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    #[default]
    Diabetes,
    Heart,
    Parkinsons,
}

impl Flow {
    /// All flows in sidebar order.
    pub const ALL: [Flow; 3] = [Flow::Diabetes, Flow::Heart, Flow::Parkinsons];

    /// Stable lowercase key, used in configuration variables and logs.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes",
            Self::Heart => "heart",
            Self::Parkinsons => "parkinsons",
        }
    }

    /// Sidebar entry text.
    #[must_use]
    pub fn menu_label(&self) -> &'static str {
        match self {
            Self::Diabetes => "Diabetes Prediction",
            Self::Heart => "Heart Disease Prediction",
            Self::Parkinsons => "Parkinsons Prediction",
        }
    }

    /// Page title shown above the form.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Diabetes => "Diabetes Prediction using Machine Learning",
            Self::Heart => "Heart Disease Prediction using Machine Learning",
            Self::Parkinsons => "Parkinson's Disease Prediction",
        }
    }

    /// Field schema that defines this flow's feature vector.
    #[must_use]
    pub fn schema(&self) -> &'static FlowSchema {
        match self {
            Self::Diabetes => &DIABETES_SCHEMA,
            Self::Heart => &HEART_SCHEMA,
            Self::Parkinsons => &PARKINSONS_SCHEMA,
        }
    }

    /// Whether the classifier for this flow was trained on standardized input.
    #[must_use]
    pub fn uses_scaler(&self) -> bool {
        match self {
            Self::Diabetes | Self::Heart => true,
            Self::Parkinsons => false,
        }
    }

    /// Statement shown when the classifier predicts the condition.
    #[must_use]
    pub fn positive_statement(&self) -> &'static str {
        match self {
            Self::Diabetes => "The person is diabetic.",
            Self::Heart => "The person is likely to have heart disease.",
            Self::Parkinsons => "The person has Parkinson's disease.",
        }
    }

    /// Statement shown when the classifier rules the condition out.
    #[must_use]
    pub fn negative_statement(&self) -> &'static str {
        match self {
            Self::Diabetes => "The person is not diabetic.",
            Self::Heart => "The person is not likely to have heart disease.",
            Self::Parkinsons => "The person does not have Parkinson's disease.",
        }
    }

    /// Position in [`Flow::ALL`].
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Diabetes => 0,
            Self::Heart => 1,
            Self::Parkinsons => 2,
        }
    }

    /// Flow at a sidebar position, if any.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
