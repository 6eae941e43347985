use super::domain::{LoanApplication, ValidatedApplication};

pub const MIN_LOAN_AMOUNT_THOUSANDS: f64 = 1.0;
pub const MIN_LOAN_TERM_MONTHS: f64 = 12.0;
pub const MAX_LOAN_TERM_MONTHS: f64 = 480.0;

/// Intake problems that block a submission before any inference runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("applicant name is required")]
    BlankName,
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be at least {min} (found {found})")]
    BelowMinimum {
        field: &'static str,
        found: f64,
        min: f64,
    },
    #[error("{field} must be between {min} and {max} (found {found})")]
    OutOfRange {
        field: &'static str,
        found: f64,
        min: f64,
        max: f64,
    },
    #[error("total income (applicant or co-applicant) must be greater than zero")]
    NoIncome,
}

impl ValidationError {
    /// Form field the error should be shown next to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::BlankName => "name",
            ValidationError::NotFinite { field }
            | ValidationError::BelowMinimum { field, .. }
            | ValidationError::OutOfRange { field, .. } => field,
            ValidationError::NoIncome => "applicant_income",
        }
    }
}

fn check_minimum(field: &'static str, found: f64, min: f64) -> Result<(), ValidationError> {
    if !found.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if found < min {
        return Err(ValidationError::BelowMinimum { field, found, min });
    }
    Ok(())
}

fn check_range(field: &'static str, found: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !found.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if found < min || found > max {
        return Err(ValidationError::OutOfRange {
            field,
            found,
            min,
            max,
        });
    }
    Ok(())
}

/// Check the intake invariants in form order: name, numeric bounds, then total income.
pub fn validate(application: LoanApplication) -> Result<ValidatedApplication, ValidationError> {
    if application.name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }

    check_minimum("applicant_income", application.applicant_income, 0.0)?;
    check_minimum("coapplicant_income", application.coapplicant_income, 0.0)?;
    if !application.total_income().is_finite() {
        return Err(ValidationError::NotFinite {
            field: "total_income",
        });
    }
    check_minimum(
        "loan_amount",
        application.loan_amount,
        MIN_LOAN_AMOUNT_THOUSANDS,
    )?;
    check_range(
        "loan_amount_term",
        application.loan_amount_term,
        MIN_LOAN_TERM_MONTHS,
        MAX_LOAN_TERM_MONTHS,
    )?;

    if application.applicant_income <= 0.0 && application.coapplicant_income <= 0.0 {
        return Err(ValidationError::NoIncome);
    }

    Ok(ValidatedApplication(application))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named() -> LoanApplication {
        LoanApplication {
            name: "Ana Souza".to_string(),
            ..LoanApplication::default()
        }
    }

    #[test]
    fn defaults_with_a_name_pass() {
        let validated = validate(named()).expect("defaults are valid");
        assert_eq!(validated.application().name, "Ana Souza");
    }

    #[test]
    fn whitespace_name_is_blank() {
        let application = LoanApplication {
            name: "   \t".to_string(),
            ..LoanApplication::default()
        };
        assert_eq!(validate(application), Err(ValidationError::BlankName));
    }

    #[test]
    fn blank_name_is_reported_before_income() {
        let application = LoanApplication {
            applicant_income: 0.0,
            ..LoanApplication::default()
        };
        assert_eq!(validate(application), Err(ValidationError::BlankName));
    }

    #[test]
    fn both_incomes_zero_is_rejected() {
        let application = LoanApplication {
            applicant_income: 0.0,
            coapplicant_income: 0.0,
            ..named()
        };
        let err = validate(application).expect_err("no income");
        assert_eq!(err, ValidationError::NoIncome);
        assert_eq!(err.field(), "applicant_income");
    }

    #[test]
    fn coapplicant_income_alone_is_enough() {
        let application = LoanApplication {
            applicant_income: 0.0,
            coapplicant_income: 1800.0,
            ..named()
        };
        assert!(validate(application).is_ok());
    }

    #[test]
    fn term_outside_bounds_is_rejected() {
        let application = LoanApplication {
            loan_amount_term: 600.0,
            ..named()
        };
        assert!(matches!(
            validate(application),
            Err(ValidationError::OutOfRange {
                field: "loan_amount_term",
                ..
            })
        ));
    }

    #[test]
    fn loan_amount_below_one_thousand_is_rejected() {
        let application = LoanApplication {
            loan_amount: 0.5,
            ..named()
        };
        let err = validate(application).expect_err("amount too small");
        assert_eq!(err.field(), "loan_amount");
    }

    #[test]
    fn nan_income_is_rejected() {
        let application = LoanApplication {
            coapplicant_income: f64::NAN,
            ..named()
        };
        assert_eq!(
            validate(application),
            Err(ValidationError::NotFinite {
                field: "coapplicant_income"
            })
        );
    }

    #[test]
    fn overflowing_total_income_is_rejected() {
        let application = LoanApplication {
            applicant_income: 1e308,
            coapplicant_income: 1e308,
            ..named()
        };
        let err = validate(application).expect_err("sum overflows");
        assert_eq!(
            err,
            ValidationError::NotFinite {
                field: "total_income"
            }
        );
        assert_eq!(err.field(), "total_income");
    }
}
