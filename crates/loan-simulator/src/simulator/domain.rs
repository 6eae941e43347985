use serde::{Deserialize, Serialize};

/// Applicant gender as captured by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// Number of dependents, with everything above two collapsed into `3+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dependents {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3+")]
    ThreeOrMore,
}

impl Dependents {
    pub const fn label(self) -> &'static str {
        match self {
            Dependents::Zero => "0",
            Dependents::One => "1",
            Dependents::Two => "2",
            Dependents::ThreeOrMore => "3+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    Graduate,
    NotGraduate,
}

impl Education {
    pub const fn label(self) -> &'static str {
        match self {
            Education::Graduate => "Graduate",
            Education::NotGraduate => "Not Graduate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyArea {
    Rural,
    Semiurban,
    Urban,
}

impl PropertyArea {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyArea::Rural => "Rural",
            PropertyArea::Semiurban => "Semi-Urban",
            PropertyArea::Urban => "Urban",
        }
    }
}

pub const fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Form values for one simulation. Missing fields in a JSON body take the form defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanApplication {
    pub name: String,
    pub gender: Gender,
    pub married: bool,
    pub dependents: Dependents,
    pub education: Education,
    pub self_employed: bool,
    pub applicant_income: f64,
    pub coapplicant_income: f64,
    /// Requested principal in thousands.
    pub loan_amount: f64,
    /// Repayment term in months.
    pub loan_amount_term: f64,
    pub credit_history: bool,
    pub property_area: PropertyArea,
}

impl Default for LoanApplication {
    fn default() -> Self {
        Self {
            name: String::new(),
            gender: Gender::Male,
            married: false,
            dependents: Dependents::Zero,
            education: Education::Graduate,
            self_employed: false,
            applicant_income: 5000.0,
            coapplicant_income: 0.0,
            loan_amount: 100.0,
            loan_amount_term: 360.0,
            credit_history: true,
            property_area: PropertyArea::Semiurban,
        }
    }
}

impl LoanApplication {
    pub fn total_income(&self) -> f64 {
        self.applicant_income + self.coapplicant_income
    }
}

/// An application that passed intake validation. Only `validation::validate` builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedApplication(pub(crate) LoanApplication);

impl ValidatedApplication {
    pub fn application(&self) -> &LoanApplication {
        &self.0
    }

    pub fn into_inner(self) -> LoanApplication {
        self.0
    }
}

/// Classifier verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanDecision {
    Approved,
    Rejected,
}

impl LoanDecision {
    pub const fn label(self) -> &'static str {
        match self {
            LoanDecision::Approved => "approved",
            LoanDecision::Rejected => "rejected",
        }
    }

    pub const fn is_approved(self) -> bool {
        matches!(self, LoanDecision::Approved)
    }
}

/// Label plus probability of approval in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub decision: LoanDecision,
    pub approval_probability: f64,
}

/// Submitted values kept untransformed for echoing back to the applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationEcho {
    pub name: String,
    pub gender: &'static str,
    pub married: &'static str,
    pub dependents: &'static str,
    pub education: &'static str,
    pub self_employed: &'static str,
    pub property_area: &'static str,
    pub credit_history: &'static str,
    pub applicant_income: f64,
    pub coapplicant_income: f64,
    pub total_income: f64,
    pub loan_amount_thousands: f64,
    pub loan_term_months: f64,
}

impl From<&LoanApplication> for ApplicationEcho {
    fn from(application: &LoanApplication) -> Self {
        Self {
            name: application.name.clone(),
            gender: application.gender.label(),
            married: yes_no(application.married),
            dependents: application.dependents.label(),
            education: application.education.label(),
            self_employed: yes_no(application.self_employed),
            property_area: application.property_area.label(),
            credit_history: yes_no(application.credit_history),
            applicant_income: application.applicant_income,
            coapplicant_income: application.coapplicant_income,
            total_income: application.total_income(),
            loan_amount_thousands: application.loan_amount,
            loan_term_months: application.loan_amount_term,
        }
    }
}

/// Everything produced by one successful simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub echo: ApplicationEcho,
    pub prediction: PredictionResult,
}
