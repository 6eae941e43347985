use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    ApplicationEcho, LoanApplication, LoanDecision, PredictionResult, SimulationOutcome,
};
use super::session::{SessionState, SimulationSession};

/// Format an amount with `.` thousands and `,` decimals, e.g. `1.234,56`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped},{cents}")
}

pub fn format_brl(value: f64) -> String {
    format!("R$ {}", format_currency(value))
}

/// Probability in `[0, 1]` as a two-decimal percentage.
pub fn format_percentage(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

pub const fn headline(decision: LoanDecision) -> &'static str {
    match decision {
        LoanDecision::Approved => "Congratulations! Your loan was APPROVED!",
        LoanDecision::Rejected => {
            "Based on the data provided, we cannot offer the loan at this time."
        }
    }
}

/// Qualitative band shown under the probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalOutlook {
    Excellent,
    Good,
    Limited,
    Low,
}

impl ApprovalOutlook {
    pub fn from_prediction(prediction: &PredictionResult) -> Option<Self> {
        let percent = prediction.approval_probability * 100.0;
        match prediction.decision {
            LoanDecision::Approved if percent >= 75.0 => Some(ApprovalOutlook::Excellent),
            LoanDecision::Approved if percent >= 50.0 => Some(ApprovalOutlook::Good),
            LoanDecision::Approved => None,
            LoanDecision::Rejected if percent < 25.0 => Some(ApprovalOutlook::Low),
            LoanDecision::Rejected => Some(ApprovalOutlook::Limited),
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            ApprovalOutlook::Excellent => "You have an excellent chance of approval!",
            ApprovalOutlook::Good => "Your chances of approval are good.",
            ApprovalOutlook::Limited => "Your chances of approval are not high.",
            ApprovalOutlook::Low => {
                "Your chances of approval are low. Consider improving your financial profile."
            }
        }
    }
}

/// Echo values formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoDisplay {
    pub applicant_income: String,
    pub coapplicant_income: String,
    pub total_income: String,
    pub loan_amount: String,
    pub loan_term: String,
}

impl From<&ApplicationEcho> for EchoDisplay {
    fn from(echo: &ApplicationEcho) -> Self {
        Self {
            applicant_income: format_brl(echo.applicant_income),
            coapplicant_income: format_brl(echo.coapplicant_income),
            total_income: format_brl(echo.total_income),
            loan_amount: format!(
                "{} ({} thousand)",
                format_brl(echo.loan_amount_thousands * 1000.0),
                echo.loan_amount_thousands
            ),
            loan_term: format!("{:.0} months", echo.loan_term_months),
        }
    }
}

/// Public representation of a finished simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationView {
    pub applicant: String,
    pub decision: LoanDecision,
    pub headline: &'static str,
    pub approval_probability: f64,
    pub approval_percentage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlook: Option<ApprovalOutlook>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlook_message: Option<&'static str>,
    pub echo: ApplicationEcho,
    pub display: EchoDisplay,
}

impl From<&SimulationOutcome> for SimulationView {
    fn from(outcome: &SimulationOutcome) -> Self {
        let prediction = &outcome.prediction;
        let outlook = ApprovalOutlook::from_prediction(prediction);
        Self {
            applicant: outcome.echo.name.clone(),
            decision: prediction.decision,
            headline: headline(prediction.decision),
            approval_probability: prediction.approval_probability,
            approval_percentage: format_percentage(prediction.approval_probability),
            outlook,
            outlook_message: outlook.map(ApprovalOutlook::message),
            echo: outcome.echo.clone(),
            display: EchoDisplay::from(&outcome.echo),
        }
    }
}

/// What the page renders: the form values and, after a submission, the verdict.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub state: &'static str,
    pub form: LoanApplication,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SimulationView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated_at: Option<DateTime<Utc>>,
}

impl From<&SimulationSession> for SessionView {
    fn from(session: &SimulationSession) -> Self {
        let (result, simulated_at) = match session.state() {
            SessionState::ResultShown(shown) => (
                Some(SimulationView::from(&shown.outcome)),
                Some(shown.simulated_at),
            ),
            SessionState::Idle => (None, None),
        };
        Self {
            state: session.state().label(),
            form: session.form().clone(),
            result,
            simulated_at,
        }
    }
}

/// Plain-text rendering used by the terminal command.
pub fn render_text(outcome: &SimulationOutcome) -> String {
    let view = SimulationView::from(outcome);
    let (echo, display) = (&view.echo, &view.display);

    let mut lines = vec![
        "Data provided for the simulation".to_string(),
        format!("- Name: {}", echo.name),
        format!("- Gender: {}", echo.gender),
        format!("- Married: {}", echo.married),
        format!("- Dependents: {}", echo.dependents),
        format!("- Education: {}", echo.education),
        format!("- Self-employed: {}", echo.self_employed),
        format!("- Property area: {}", echo.property_area),
        format!("- Credit history: {}", echo.credit_history),
        format!("- Applicant income: {}", display.applicant_income),
        format!("- Co-applicant income: {}", display.coapplicant_income),
        format!("- Total income: {}", display.total_income),
        format!("- Loan amount: {}", display.loan_amount),
        format!("- Term: {}", display.loan_term),
        String::new(),
        format!("Simulation result for {}", echo.name),
        view.headline.to_string(),
        format!("Approval probability: {}", view.approval_percentage),
    ];
    if let Some(message) = view.outlook_message {
        lines.push(message.to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands_with_dots() {
        assert_eq!(format_currency(0.0), "0,00");
        assert_eq!(format_currency(999.5), "999,50");
        assert_eq!(format_currency(5000.0), "5.000,00");
        assert_eq!(format_currency(1234567.891), "1.234.567,89");
        assert_eq!(format_currency(-2500.0), "-2.500,00");
        assert_eq!(format_brl(100000.0), "R$ 100.000,00");
    }

    #[test]
    fn percentage_has_two_decimals() {
        assert_eq!(format_percentage(0.7812), "78.12%");
        assert_eq!(format_percentage(1.0), "100.00%");
    }

    fn prediction(decision: LoanDecision, approval_probability: f64) -> PredictionResult {
        PredictionResult {
            decision,
            approval_probability,
        }
    }

    #[test]
    fn outlook_bands_follow_decision_and_probability() {
        use ApprovalOutlook::*;
        let cases = [
            (LoanDecision::Approved, 0.91, Some(Excellent)),
            (LoanDecision::Approved, 0.75, Some(Excellent)),
            (LoanDecision::Approved, 0.60, Some(Good)),
            (LoanDecision::Approved, 0.45, None),
            (LoanDecision::Rejected, 0.40, Some(Limited)),
            (LoanDecision::Rejected, 0.10, Some(Low)),
        ];
        for (decision, probability, expected) in cases {
            assert_eq!(
                ApprovalOutlook::from_prediction(&prediction(decision, probability)),
                expected,
                "{decision:?} at {probability}"
            );
        }
    }

    #[test]
    fn echo_display_formats_amounts_and_term() {
        let application = LoanApplication {
            name: "Ana Souza".to_string(),
            coapplicant_income: 1250.5,
            ..LoanApplication::default()
        };
        let display = EchoDisplay::from(&ApplicationEcho::from(&application));
        assert_eq!(display.applicant_income, "R$ 5.000,00");
        assert_eq!(display.total_income, "R$ 6.250,50");
        assert_eq!(display.loan_amount, "R$ 100.000,00 (100 thousand)");
        assert_eq!(display.loan_term, "360 months");
    }
}
