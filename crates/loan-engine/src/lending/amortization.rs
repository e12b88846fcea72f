//! Reducing-balance amortization.
//!
//! All monetary outputs are rounded to two decimal places, half away from zero.

use serde::{Deserialize, Serialize};

/// EMI and repayment totals for one loan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub emi: f64,
    pub total_repayment: f64,
    pub total_interest: f64,
}

/// Cumulative position at the end of a repayment month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepaymentPoint {
    pub month: u32,
    pub cumulative_paid: f64,
    pub cumulative_interest: f64,
}

/// Loan terms that cannot produce a meaningful installment.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoanParameterError {
    #[error("principal must be a positive amount (got {0})")]
    NonPositivePrincipal(f64),
    #[error("tenure must be at least one month")]
    NonPositiveTenure,
    #[error("tenure of {tenure_months} months exceeds the {max}-month limit")]
    TenureTooLong { tenure_months: u32, max: u32 },
    #[error("annual interest rate must be a finite, non-negative percentage (got {0})")]
    InvalidRate(f64),
    #[error("installment is not representable for {tenure_months} months at {annual_rate}%")]
    NonFiniteInstallment { annual_rate: f64, tenure_months: u32 },
    #[error("installment for {principal} over {tenure_months} months rounds to zero")]
    InstallmentRoundsToZero { principal: f64, tenure_months: u32 },
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn check_terms(principal: f64, tenure_months: u32) -> Result<(), LoanParameterError> {
    if !(principal.is_finite() && principal > 0.0) {
        return Err(LoanParameterError::NonPositivePrincipal(principal));
    }
    if tenure_months == 0 {
        return Err(LoanParameterError::NonPositiveTenure);
    }
    Ok(())
}

/// Compute the equated monthly installment and the implied totals.
///
/// A zero rate falls back to straight-line repayment. The total interest is clamped at zero
/// since rounding the installment can otherwise leave it slightly negative. An installment
/// that rounds to nothing is rejected rather than quoted as a free loan.
pub fn compute_emi(
    principal: f64,
    annual_rate_percent: f64,
    tenure_months: u32,
) -> Result<AmortizationResult, LoanParameterError> {
    check_terms(principal, tenure_months)?;
    if !(annual_rate_percent.is_finite() && annual_rate_percent >= 0.0) {
        return Err(LoanParameterError::InvalidRate(annual_rate_percent));
    }

    let months = f64::from(tenure_months);
    let monthly_rate = annual_rate_percent / 1200.0;
    let raw_emi = if monthly_rate == 0.0 {
        principal / months
    } else {
        let growth = (1.0 + monthly_rate).powf(months);
        principal * monthly_rate * growth / (growth - 1.0)
    };

    if !raw_emi.is_finite() {
        return Err(LoanParameterError::NonFiniteInstallment {
            annual_rate: annual_rate_percent,
            tenure_months,
        });
    }

    let emi = round2(raw_emi);
    if emi <= 0.0 {
        return Err(LoanParameterError::InstallmentRoundsToZero {
            principal,
            tenure_months,
        });
    }
    let total_repayment = round2(emi * months);
    let total_interest = round2(total_repayment - principal).max(0.0);

    Ok(AmortizationResult {
        emi,
        total_repayment,
        total_interest,
    })
}

/// Month-by-month cumulative repayment for chart rendering.
///
/// Interest is recognised once the cumulative payments pass the principal, matching the
/// total-interest clamp.
pub fn generate_repayment_series(
    principal: f64,
    tenure_months: u32,
    emi: f64,
) -> Result<Vec<RepaymentPoint>, LoanParameterError> {
    check_terms(principal, tenure_months)?;

    Ok((1..=tenure_months)
        .map(|month| {
            let cumulative_paid = round2(emi * f64::from(month));
            RepaymentPoint {
                month,
                cumulative_paid,
                cumulative_interest: round2(cumulative_paid - principal).max(0.0),
            }
        })
        .collect())
}
