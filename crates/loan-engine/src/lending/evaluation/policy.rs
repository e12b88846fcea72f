use super::super::domain::ApplicantProfile;
use super::config::PolicyConfig;

pub(crate) const FEASIBLE_MESSAGE: &str = "Loan is feasible!";
pub(crate) const INFEASIBLE_MESSAGE: &str = "Loan is not feasible.";

/// Structural problems with an applicant profile, raised before any numeric work.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("CIBIL score must be a three-digit number between {min} and {max}.")]
    CreditScoreOutOfRange { score: i32, min: i32, max: i32 },
    #[error("Monthly expenses cannot exceed monthly income.")]
    ExpenseExceedsIncome { income: f64, expense: f64 },
    #[error("{field} cannot be negative.")]
    NegativeAmount { field: &'static str },
    #[error("{field} must be a number.")]
    NonFiniteAmount { field: &'static str },
}

fn check_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteAmount { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeAmount { field });
    }
    Ok(())
}

/// Credit score range first, then the income/expense relationship.
pub(crate) fn validate_profile(
    profile: &ApplicantProfile,
    config: &PolicyConfig,
) -> Result<(), ValidationError> {
    if !(config.min_credit_score..=config.max_credit_score).contains(&profile.credit_score) {
        return Err(ValidationError::CreditScoreOutOfRange {
            score: profile.credit_score,
            min: config.min_credit_score,
            max: config.max_credit_score,
        });
    }

    check_amount("Monthly income", profile.monthly_income)?;
    check_amount("Monthly expense", profile.monthly_expense)?;

    if profile.monthly_expense > profile.monthly_income {
        return Err(ValidationError::ExpenseExceedsIncome {
            income: profile.monthly_income,
            expense: profile.monthly_expense,
        });
    }

    Ok(())
}

/// Outcome of the deterministic affordability guardrail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Affordability {
    WithinLimit,
    Exceeded { burden: f64, limit: f64 },
}

pub(crate) fn check_affordability(
    emi: f64,
    income: f64,
    expense: f64,
    config: &PolicyConfig,
) -> Affordability {
    let burden = expense + emi;
    let limit = config.affordability_ratio * income;
    if burden > limit {
        Affordability::Exceeded { burden, limit }
    } else {
        Affordability::WithinLimit
    }
}

/// Message and suggestions when the guardrail rejects the loan.
pub(crate) fn guardrail_rejection(config: &PolicyConfig) -> (String, Vec<String>) {
    (
        format!(
            "Loan is not feasible. Expenses and EMI exceed {:.0}% of your income.",
            config.affordability_ratio * 100.0
        ),
        vec![
            "Consider reducing the loan amount or tenure.".to_string(),
            "Lower your expenses to meet eligibility.".to_string(),
        ],
    )
}

/// Message and suggestions for the classifier's verdict.
pub(crate) fn classifier_outcome(feasible: bool) -> (String, Vec<String>) {
    if feasible {
        (FEASIBLE_MESSAGE.to_string(), Vec::new())
    } else {
        (
            INFEASIBLE_MESSAGE.to_string(),
            vec![
                "Improve your CIBIL score.".to_string(),
                "Ensure your income exceeds your expenses by a larger margin.".to_string(),
            ],
        )
    }
}
