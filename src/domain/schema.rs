//! Field schemas and input vectors.
//!
//! The order of a flow's fields IS the feature-vector contract with the
//! classifier trained for that flow. Fields are never reordered independently
//! of the artifact.

use super::flow::Flow;

/// Errors raised while assembling or checking an input vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Input was assembled for the {got} form but submitted to the {expected} model")]
    WrongFlow { expected: Flow, got: Flow },

    #[error("The {flow} model expects {expected} features, got {got}")]
    LengthMismatch {
        flow: Flow,
        expected: usize,
        got: usize,
    },

    #[error("{field}: value is not a finite number")]
    NonFinite { field: &'static str },

    #[error("The {flow} model expects feature {position} to be {expected:?}, found {got:?}")]
    FeatureOrder {
        flow: Flow,
        position: usize,
        expected: String,
        got: String,
    },
}

/// Static description of one numeric input slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Feature name the classifier was trained with.
    pub name: &'static str,
    /// Label shown above the input.
    pub label: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
    /// Decimal places displayed; 0 means an integer input. Stored values
    /// keep whatever precision was typed.
    pub precision: u8,
    /// Form column; `None` places field `i` in column `i % 3`.
    pub column: Option<u8>,
}

impl FieldSpec {
    /// Integer-valued field.
    pub const fn integer(
        name: &'static str,
        label: &'static str,
        min: f64,
        max: f64,
        default: f64,
    ) -> Self {
        Self {
            name,
            label,
            default,
            min,
            max,
            precision: 0,
            column: None,
        }
    }

    /// Decimal field displayed with `precision` places.
    pub const fn decimal(
        name: &'static str,
        label: &'static str,
        min: f64,
        max: f64,
        default: f64,
        precision: u8,
    ) -> Self {
        Self {
            name,
            label,
            default,
            min,
            max,
            precision,
            column: None,
        }
    }

    /// Decimal field with no bounds.
    pub const fn unbounded(name: &'static str, label: &'static str, precision: u8) -> Self {
        Self {
            name,
            label,
            default: 0.0,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            precision,
            column: None,
        }
    }

    /// Pin the field to a form column.
    #[must_use]
    pub const fn in_column(self, column: u8) -> Self {
        Self {
            column: Some(column),
            ..self
        }
    }

    /// Clamp a value into `[min, max]`. NaN falls back to the default.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.precision == 0
    }

    /// Whether the field admits negative values.
    #[must_use]
    pub fn allows_negative(&self) -> bool {
        self.min < 0.0
    }

    /// Increment used by the `+`/`-` keys.
    #[must_use]
    pub fn step(&self) -> f64 {
        10f64.powi(-i32::from(self.precision))
    }

    /// Round to the display precision. Only used to keep `step` on the grid.
    #[must_use]
    pub fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(i32::from(self.precision));
        (value * factor).round() / factor
    }

    /// Format a value with the field's display precision.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        format!("{:.*}", usize::from(self.precision), value)
    }

    /// Short range hint, e.g. `0-200` or `any value`.
    #[must_use]
    pub fn range_hint(&self) -> String {
        match (self.min.is_finite(), self.max.is_finite()) {
            (true, true) => format!("{}-{}", self.format(self.min), self.format(self.max)),
            (true, false) => format!(">= {}", self.format(self.min)),
            (false, true) => format!("<= {}", self.format(self.max)),
            (false, false) => "any value".to_string(),
        }
    }
}

/// Ordered field list for one flow.
#[derive(Debug)]
pub struct FlowSchema {
    pub flow: Flow,
    pub fields: &'static [FieldSpec],
}

impl FlowSchema {
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Feature names in vector order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn defaults(&self) -> Vec<f64> {
        self.fields.iter().map(|f| f.default).collect()
    }

    /// Check that an artifact's declared feature names match this schema
    /// position by position.
    ///
    /// # Errors
    /// Returns `LengthMismatch` or the first `FeatureOrder` disagreement.
    pub fn check_feature_order(&self, declared: &[String]) -> Result<(), SchemaError> {
        if declared.len() != self.len() {
            return Err(SchemaError::LengthMismatch {
                flow: self.flow,
                expected: declared.len(),
                got: self.len(),
            });
        }

        for (position, (field, name)) in self.fields.iter().zip(declared).enumerate() {
            if field.name != name.as_str() {
                return Err(SchemaError::FeatureOrder {
                    flow: self.flow,
                    position,
                    expected: name.clone(),
                    got: field.name.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Ordered feature values assembled from one flow's form.
#[derive(Debug, Clone, PartialEq)]
pub struct InputVector {
    flow: Flow,
    values: Vec<f64>,
}

impl InputVector {
    /// Build a vector for `flow`, checking length and finiteness against its schema.
    ///
    /// # Errors
    /// Returns `LengthMismatch` if the value count differs from the schema,
    /// or `NonFinite` naming the first NaN/infinite field.
    pub fn new(flow: Flow, values: Vec<f64>) -> Result<Self, SchemaError> {
        let schema = flow.schema();
        if values.len() != schema.len() {
            return Err(SchemaError::LengthMismatch {
                flow,
                expected: schema.len(),
                got: values.len(),
            });
        }

        if let Some((field, _)) = schema
            .fields
            .iter()
            .zip(&values)
            .find(|(_, v)| !v.is_finite())
        {
            return Err(SchemaError::NonFinite { field: field.name });
        }

        Ok(Self { flow, values })
    }

    /// Vector of the schema's default values.
    #[must_use]
    pub fn defaults(flow: Flow) -> Self {
        Self {
            flow,
            values: flow.schema().defaults(),
        }
    }

    #[must_use]
    pub fn flow(&self) -> Flow {
        self.flow
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named feature.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.flow
            .schema()
            .names()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }
}

const DIABETES_FIELDS: [FieldSpec; 8] = [
    FieldSpec::integer("Pregnancies", "Number of Pregnancies", 0.0, 20.0, 1.0),
    FieldSpec::integer("Glucose", "Glucose Level", 0.0, 200.0, 110.0),
    FieldSpec::integer("BloodPressure", "Blood Pressure", 0.0, 140.0, 80.0),
    FieldSpec::integer("SkinThickness", "Skin Thickness", 0.0, 100.0, 20.0),
    FieldSpec::integer("Insulin", "Insulin Level", 0.0, 900.0, 80.0),
    FieldSpec::decimal("BMI", "BMI", 10.0, 70.0, 25.0, 2),
    FieldSpec::decimal(
        "DiabetesPedigreeFunction",
        "Diabetes Pedigree Function",
        0.0,
        2.5,
        0.5,
        2,
    ),
    FieldSpec::integer("Age", "Age", 1.0, 100.0, 30.0),
];

const HEART_FIELDS: [FieldSpec; 13] = [
    FieldSpec::integer("age", "Age", 1.0, 120.0, 45.0).in_column(0),
    FieldSpec::integer("sex", "Sex (0=Female, 1=Male)", 0.0, 1.0, 1.0).in_column(1),
    FieldSpec::integer("cp", "Chest Pain Type (0-3)", 0.0, 3.0, 1.0).in_column(2),
    FieldSpec::integer("trestbps", "Resting Blood Pressure", 80.0, 200.0, 120.0).in_column(0),
    FieldSpec::integer("chol", "Cholesterol", 100.0, 600.0, 200.0).in_column(1),
    FieldSpec::integer("fbs", "Fasting Blood Sugar >120 mg/dl (0 or 1)", 0.0, 1.0, 0.0)
        .in_column(2),
    FieldSpec::integer("restecg", "Resting ECG (0-2)", 0.0, 2.0, 1.0).in_column(0),
    FieldSpec::integer("thalach", "Max Heart Rate", 60.0, 220.0, 150.0).in_column(1),
    FieldSpec::integer("exang", "Exercise Induced Angina (0 or 1)", 0.0, 1.0, 0.0).in_column(2),
    FieldSpec::decimal("oldpeak", "Oldpeak (ST depression)", 0.0, 6.0, 1.0, 2).in_column(0),
    FieldSpec::integer("slope", "Slope of ST Segment (0-2)", 0.0, 2.0, 1.0).in_column(1),
    FieldSpec::integer("ca", "Number of Major Vessels (0-4)", 0.0, 4.0, 0.0).in_column(1),
    FieldSpec::integer("thal", "Thal (0=Normal, 1=Fixed, 2=Reversible)", 0.0, 2.0, 1.0)
        .in_column(0),
];

const PARKINSONS_FIELDS: [FieldSpec; 22] = [
    FieldSpec::unbounded("MDVP:Fo(Hz)", "MDVP: Fo(Hz)", 4),
    FieldSpec::unbounded("MDVP:Fhi(Hz)", "MDVP: Fhi(Hz)", 4),
    FieldSpec::unbounded("MDVP:Flo(Hz)", "MDVP: Flo(Hz)", 4),
    FieldSpec::unbounded("MDVP:Jitter(%)", "MDVP: Jitter(%)", 4),
    FieldSpec::unbounded("MDVP:Jitter(Abs)", "MDVP: Jitter(Abs)", 4),
    FieldSpec::unbounded("MDVP:RAP", "MDVP: RAP", 4),
    FieldSpec::unbounded("MDVP:PPQ", "MDVP: PPQ", 4),
    FieldSpec::unbounded("Jitter:DDP", "Jitter: DDP", 4),
    FieldSpec::unbounded("MDVP:Shimmer", "MDVP: Shimmer", 4),
    FieldSpec::unbounded("MDVP:Shimmer(dB)", "MDVP: Shimmer(dB)", 4),
    FieldSpec::unbounded("Shimmer:APQ3", "Shimmer: APQ3", 4),
    FieldSpec::unbounded("Shimmer:APQ5", "Shimmer: APQ5", 4),
    FieldSpec::unbounded("MDVP:APQ", "MDVP: APQ", 4),
    FieldSpec::unbounded("Shimmer:DDA", "Shimmer: DDA", 4),
    FieldSpec::unbounded("NHR", "NHR", 4),
    FieldSpec::unbounded("HNR", "HNR", 4),
    FieldSpec::unbounded("RPDE", "RPDE", 4),
    FieldSpec::unbounded("DFA", "DFA", 4),
    FieldSpec::unbounded("spread1", "spread1", 4),
    FieldSpec::unbounded("spread2", "spread2", 4),
    FieldSpec::unbounded("D2", "D2", 4),
    FieldSpec::unbounded("PPE", "PPE", 4),
];

/// Pima diabetes features.
pub static DIABETES_SCHEMA: FlowSchema = FlowSchema {
    flow: Flow::Diabetes,
    fields: &DIABETES_FIELDS,
};

/// Cleveland heart disease features.
pub static HEART_SCHEMA: FlowSchema = FlowSchema {
    flow: Flow::Heart,
    fields: &HEART_FIELDS,
};

/// Voice-measurement features from the Oxford Parkinson's dataset.
pub static PARKINSONS_SCHEMA: FlowSchema = FlowSchema {
    flow: Flow::Parkinsons,
    fields: &PARKINSONS_FIELDS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lengths() {
        assert_eq!(Flow::Diabetes.schema().len(), 8);
        assert_eq!(Flow::Heart.schema().len(), 13);
        assert_eq!(Flow::Parkinsons.schema().len(), 22);
    }

    #[test]
    fn test_heart_vector_order() {
        let names: Vec<&str> = Flow::Heart.schema().names().collect();
        assert_eq!(
            names,
            [
                "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang",
                "oldpeak", "slope", "ca", "thal"
            ]
        );
    }

    #[test]
    fn test_heart_fields_pinned_to_columns() {
        let column = |name: &str| {
            HEART_SCHEMA
                .field(name)
                .and_then(|f| f.column)
                .expect("Heart field should have a column")
        };
        assert_eq!(column("age"), 0);
        assert_eq!(column("thal"), 0);
        assert_eq!(column("ca"), 1);
        assert_eq!(column("exang"), 2);
        assert!(DIABETES_SCHEMA.fields.iter().all(|f| f.column.is_none()));
    }

    #[test]
    fn test_defaults_within_bounds() {
        for flow in Flow::ALL {
            for field in flow.schema().fields {
                assert!(
                    field.min <= field.default && field.default <= field.max,
                    "{} default out of range",
                    field.name
                );
            }
        }
    }

    #[test]
    fn test_clamp() {
        let glucose = DIABETES_SCHEMA.field("Glucose").expect("Glucose field");
        assert_eq!(glucose.clamp(-5.0), 0.0);
        assert_eq!(glucose.clamp(250.0), 200.0);
        assert_eq!(glucose.clamp(120.0), 120.0);
        assert_eq!(glucose.clamp(f64::NAN), 110.0);

        let unbounded = PARKINSONS_SCHEMA.field("HNR").expect("HNR field");
        assert_eq!(unbounded.clamp(-1.0e6), -1.0e6);
    }

    #[test]
    fn test_format_and_step() {
        let bmi = DIABETES_SCHEMA.field("BMI").expect("BMI field");
        assert_eq!(bmi.format(25.0), "25.00");
        assert!((bmi.step() - 0.01).abs() < 1e-12);
        assert_eq!(bmi.range_hint(), "10.00-70.00");

        let age = DIABETES_SCHEMA.field("Age").expect("Age field");
        assert_eq!(age.format(30.0), "30");
        assert!((age.step() - 1.0).abs() < f64::EPSILON);

        let ppe = PARKINSONS_SCHEMA.field("PPE").expect("PPE field");
        assert_eq!(ppe.range_hint(), "any value");
    }

    #[test]
    fn test_input_vector_length_check() {
        let err = InputVector::new(Flow::Diabetes, vec![1.0; 7]).expect_err("Should reject");
        assert_eq!(
            err,
            SchemaError::LengthMismatch {
                flow: Flow::Diabetes,
                expected: 8,
                got: 7
            }
        );
    }

    #[test]
    fn test_input_vector_rejects_non_finite() {
        let mut values = Flow::Diabetes.schema().defaults();
        values[5] = f64::NAN;
        let err = InputVector::new(Flow::Diabetes, values).expect_err("Should reject");
        assert_eq!(err, SchemaError::NonFinite { field: "BMI" });
    }

    #[test]
    fn test_input_vector_lookup_by_name() {
        let v = InputVector::defaults(Flow::Diabetes);
        assert_eq!(v.len(), 8);
        assert_eq!(v.get("Glucose"), Some(110.0));
        assert_eq!(v.get("DiabetesPedigreeFunction"), Some(0.5));
        assert_eq!(v.get("chol"), None);
    }

    #[test]
    fn test_check_feature_order() {
        let schema = Flow::Diabetes.schema();
        let mut declared: Vec<String> = schema.names().map(String::from).collect();
        assert!(schema.check_feature_order(&declared).is_ok());

        declared.swap(0, 1);
        match schema.check_feature_order(&declared) {
            Err(SchemaError::FeatureOrder { position, .. }) => assert_eq!(position, 0),
            other => panic!("unexpected result: {other:?}"),
        }

        declared.pop();
        assert!(matches!(
            schema.check_feature_order(&declared),
            Err(SchemaError::LengthMismatch { expected: 7, got: 8, .. })
        ));
    }
}
