//! Feature engineering that turns a validated application into the classifier row.
//!
//! The seven categorical fields go through static integer tables and are never scaled.
//! Only the three continuous fields pass through the frozen scaler, after a `log1p` on
//! income and loan amount. Both column orders come from the artifact lists.

use serde::Serialize;

use super::domain::{Dependents, Education, Gender, PropertyArea, ValidatedApplication};
use super::scaler::{FeatureScaler, ScalerError};

/// Every column the pipeline can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureColumn {
    Gender,
    Married,
    Dependents,
    Education,
    SelfEmployed,
    CreditHistory,
    PropertyArea,
    TotalIncome,
    LoanAmount,
    LoanAmountTerm,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; 10] = [
        FeatureColumn::Gender,
        FeatureColumn::Married,
        FeatureColumn::Dependents,
        FeatureColumn::Education,
        FeatureColumn::SelfEmployed,
        FeatureColumn::CreditHistory,
        FeatureColumn::PropertyArea,
        FeatureColumn::TotalIncome,
        FeatureColumn::LoanAmount,
        FeatureColumn::LoanAmountTerm,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            FeatureColumn::Gender => "Gender",
            FeatureColumn::Married => "Married",
            FeatureColumn::Dependents => "Dependents",
            FeatureColumn::Education => "Education",
            FeatureColumn::SelfEmployed => "Self_Employed",
            FeatureColumn::CreditHistory => "Credit_History",
            FeatureColumn::PropertyArea => "Property_Area",
            FeatureColumn::TotalIncome => "TotalIncome",
            FeatureColumn::LoanAmount => "LoanAmount",
            FeatureColumn::LoanAmountTerm => "Loan_Amount_Term",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.name() == name)
    }
}

pub const fn gender_code(value: Gender) -> f64 {
    match value {
        Gender::Male => 1.0,
        Gender::Female => 0.0,
    }
}

pub const fn flag_code(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

pub const fn dependents_code(value: Dependents) -> f64 {
    match value {
        Dependents::Zero => 0.0,
        Dependents::One => 1.0,
        Dependents::Two => 2.0,
        Dependents::ThreeOrMore => 3.0,
    }
}

pub const fn education_code(value: Education) -> f64 {
    match value {
        Education::Graduate => 1.0,
        Education::NotGraduate => 0.0,
    }
}

pub const fn property_area_code(value: PropertyArea) -> f64 {
    match value {
        PropertyArea::Rural => 0.0,
        PropertyArea::Semiurban => 1.0,
        PropertyArea::Urban => 2.0,
    }
}

/// Categorical fields after the static table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoricalFeatures {
    pub gender: f64,
    pub married: f64,
    pub dependents: f64,
    pub education: f64,
    pub self_employed: f64,
    pub credit_history: f64,
    pub property_area: f64,
}

impl CategoricalFeatures {
    pub fn from_application(application: &ValidatedApplication) -> Self {
        let application = application.application();
        Self {
            gender: gender_code(application.gender),
            married: flag_code(application.married),
            dependents: dependents_code(application.dependents),
            education: education_code(application.education),
            self_employed: flag_code(application.self_employed),
            credit_history: flag_code(application.credit_history),
            property_area: property_area_code(application.property_area),
        }
    }
}

/// The three continuous fields before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContinuousFeatures {
    pub total_income_log: f64,
    pub loan_amount_log: f64,
    pub loan_amount_term: f64,
}

impl ContinuousFeatures {
    pub fn from_application(application: &ValidatedApplication) -> Self {
        let application = application.application();
        Self {
            total_income_log: application.total_income().ln_1p(),
            loan_amount_log: application.loan_amount.ln_1p(),
            loan_amount_term: application.loan_amount_term,
        }
    }

    fn value(&self, column: FeatureColumn) -> Option<f64> {
        match column {
            FeatureColumn::TotalIncome => Some(self.total_income_log),
            FeatureColumn::LoanAmount => Some(self.loan_amount_log),
            FeatureColumn::LoanAmountTerm => Some(self.loan_amount_term),
            _ => None,
        }
    }

    /// Values laid out in `scaled_columns` order.
    pub fn ordered(&self, scaled_columns: &[String]) -> Result<Vec<f64>, FeatureError> {
        scaled_columns
            .iter()
            .map(|name| {
                FeatureColumn::from_name(name)
                    .and_then(|column| self.value(column))
                    .ok_or_else(|| FeatureError::UnknownScaledColumn(name.clone()))
            })
            .collect()
    }
}

/// Scaled continuous values, looked up by name out of the scaler output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaledFeatures {
    pub total_income: f64,
    pub loan_amount: f64,
    pub loan_amount_term: f64,
}

impl ScaledFeatures {
    fn from_output(scaled_columns: &[String], output: &[f64]) -> Result<Self, FeatureError> {
        let lookup = |column: FeatureColumn| {
            scaled_columns
                .iter()
                .position(|name| name == column.name())
                .and_then(|index| output.get(index).copied())
                .ok_or(FeatureError::MissingScaledColumn(column.name()))
        };

        Ok(Self {
            total_income: lookup(FeatureColumn::TotalIncome)?,
            loan_amount: lookup(FeatureColumn::LoanAmount)?,
            loan_amount_term: lookup(FeatureColumn::LoanAmountTerm)?,
        })
    }
}

/// One named value inside a model row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureValue {
    pub column: String,
    pub value: f64,
}

/// The numeric row handed to the classifier, in `model_columns_ordered` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRow {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl ModelRow {
    pub fn new(columns: Vec<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|index| self.values[index])
    }

    pub fn entries(&self) -> Vec<FeatureValue> {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| FeatureValue {
                column: column.clone(),
                value: *value,
            })
            .collect()
    }
}

/// Expected vs actual columns, reported when the row does not fit the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDiagnostics {
    pub expected_columns: Vec<String>,
    pub actual_columns: Vec<String>,
    pub row: Vec<FeatureValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ColumnDiagnostics {
    pub fn missing(&self) -> Vec<&str> {
        self.expected_columns
            .iter()
            .filter(|name| !self.actual_columns.contains(name))
            .map(String::as_str)
            .collect()
    }

    pub fn unexpected(&self) -> Vec<&str> {
        self.actual_columns
            .iter()
            .filter(|name| !self.expected_columns.contains(name))
            .map(String::as_str)
            .collect()
    }
}

impl std::fmt::Display for ColumnDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "expected {:?}, got {:?}",
            self.expected_columns, self.actual_columns
        )?;
        if let Some(note) = &self.note {
            write!(f, " ({note})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("scaled column list names unknown feature {0}")]
    UnknownScaledColumn(String),
    #[error("scaler output is missing {0}")]
    MissingScaledColumn(&'static str),
    #[error(transparent)]
    Scaler(#[from] ScalerError),
    #[error("model columns do not match the assembled features: {0}")]
    ColumnMismatch(ColumnDiagnostics),
}

/// Result of running the pipeline on one application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedFeatures {
    pub categorical: CategoricalFeatures,
    pub continuous: ContinuousFeatures,
    pub scaled: ScaledFeatures,
    pub row: ModelRow,
}

/// Pure mapping from a validated application to the classifier row.
pub fn prepare<S>(
    application: &ValidatedApplication,
    scaler: &S,
    scaled_columns: &[String],
    model_columns: &[String],
) -> Result<PreparedFeatures, FeatureError>
where
    S: FeatureScaler + ?Sized,
{
    let categorical = CategoricalFeatures::from_application(application);
    let continuous = ContinuousFeatures::from_application(application);

    let to_scale = continuous.ordered(scaled_columns)?;
    let output = scaler.transform(scaled_columns, &to_scale)?;
    let scaled = ScaledFeatures::from_output(scaled_columns, &output)?;

    let assembled = [
        (FeatureColumn::Gender, categorical.gender),
        (FeatureColumn::Married, categorical.married),
        (FeatureColumn::Dependents, categorical.dependents),
        (FeatureColumn::Education, categorical.education),
        (FeatureColumn::SelfEmployed, categorical.self_employed),
        (FeatureColumn::CreditHistory, categorical.credit_history),
        (FeatureColumn::PropertyArea, categorical.property_area),
        (FeatureColumn::TotalIncome, scaled.total_income),
        (FeatureColumn::LoanAmount, scaled.loan_amount),
        (FeatureColumn::LoanAmountTerm, scaled.loan_amount_term),
    ];

    let row = assemble_row(&assembled, model_columns)?;

    Ok(PreparedFeatures {
        categorical,
        continuous,
        scaled,
        row,
    })
}

fn assemble_row(
    assembled: &[(FeatureColumn, f64)],
    model_columns: &[String],
) -> Result<ModelRow, FeatureError> {
    let lookup = |name: &str| {
        assembled
            .iter()
            .find(|(column, _)| column.name() == name)
            .map(|(_, value)| *value)
    };

    let covers_every_feature = assembled
        .iter()
        .all(|(column, _)| model_columns.iter().any(|name| name == column.name()));
    let values: Option<Vec<f64>> = model_columns.iter().map(|name| lookup(name)).collect();

    match values {
        Some(values) if covers_every_feature && values.len() == assembled.len() => {
            Ok(ModelRow::new(model_columns.to_vec(), values))
        }
        _ => {
            let actual_columns: Vec<String> = assembled
                .iter()
                .map(|(column, _)| column.name().to_string())
                .collect();
            let row = assembled
                .iter()
                .map(|(column, value)| FeatureValue {
                    column: column.name().to_string(),
                    value: *value,
                })
                .collect();
            Err(FeatureError::ColumnMismatch(ColumnDiagnostics {
                expected_columns: model_columns.to_vec(),
                actual_columns,
                row,
                note: None,
            }))
        }
    }
}
