mod config;
mod insights;
mod policy;

pub use config::PolicyConfig;
pub use insights::generate_insights;
pub use policy::ValidationError;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::amortization::{
    check_terms, compute_emi, generate_repayment_series, round2, LoanParameterError,
    RepaymentPoint,
};
use super::domain::{
    ApplicantProfile, DecisionBasis, EmiQuote, FeasibilityVerdict, LoanRequest, RateSource,
};
use super::models::{
    FeasibilityPredictor, ModelError, ModelKind, ModelRegistry, ModelSet, RatePredictor,
};
use policy::{
    check_affordability, classifier_outcome, guardrail_rejection, validate_profile, Affordability,
};

/// Error returned by the evaluation engine. No partial verdict accompanies it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid loan parameters: {0}")]
    InvalidLoanParameters(#[from] LoanParameterError),
    #[error("{model} unavailable: {source}")]
    PredictionUnavailable {
        model: ModelKind,
        #[source]
        source: ModelError,
    },
}

/// Repayment schedule with the installment it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepaymentSchedule {
    pub annual_rate: f64,
    pub rate_source: RateSource,
    pub emi: f64,
    pub points: Vec<RepaymentPoint>,
}

/// Decision policy combining amortization, the trained models, and the guardrail.
///
/// Stateless per evaluation; the model set is read once per call from the registry.
pub struct LoanEvaluationEngine {
    config: PolicyConfig,
    models: Arc<ModelRegistry>,
}

impl LoanEvaluationEngine {
    pub fn new(config: PolicyConfig, models: Arc<ModelRegistry>) -> Self {
        Self { config, models }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    fn check_limits(&self, principal: f64, tenure_months: u32) -> Result<(), EvaluationError> {
        check_terms(principal, tenure_months)?;
        if tenure_months > self.config.max_tenure_months {
            return Err(LoanParameterError::TenureTooLong {
                tenure_months,
                max: self.config.max_tenure_months,
            }
            .into());
        }
        Ok(())
    }

    pub fn models(&self) -> &Arc<ModelRegistry> {
        &self.models
    }

    /// EMI for caller-supplied terms, predicting the rate when it is omitted.
    pub fn evaluate_emi(&self, request: &LoanRequest) -> Result<EmiQuote, EvaluationError> {
        self.check_limits(request.principal, request.tenure_months)?;
        let models = self.models.snapshot();

        let (annual_rate, rate_source) = resolve_rate(
            &models,
            request.annual_interest_rate,
            request.principal,
            request.tenure_months,
        )?;
        let result = compute_emi(request.principal, annual_rate, request.tenure_months)?;

        Ok(EmiQuote {
            annual_rate: round2(annual_rate),
            rate_source,
            emi: result.emi,
            total_repayment: result.total_repayment,
            total_interest: result.total_interest,
            tenure_months: request.tenure_months,
            regressor_r2_score: self
                .config
                .include_model_metrics
                .then_some(models.metrics.regressor_r2)
                .flatten()
                .map(round2),
        })
    }

    /// Feasibility verdict: validation, guardrail, then the classifier.
    pub fn evaluate_feasibility(
        &self,
        profile: &ApplicantProfile,
    ) -> Result<FeasibilityVerdict, EvaluationError> {
        validate_profile(profile, &self.config)?;

        let tenure_months = self.config.feasibility_tenure_months;
        self.check_limits(profile.loan_amount, tenure_months)?;
        let models = self.models.snapshot();

        let (annual_rate, _) = resolve_rate(
            &models,
            profile.annual_interest_rate,
            profile.loan_amount,
            tenure_months,
        )?;
        let emi = compute_emi(profile.loan_amount, annual_rate, tenure_months)?.emi;

        let (feasible, message, suggestions, decided_by) = match check_affordability(
            emi,
            profile.monthly_income,
            profile.monthly_expense,
            &self.config,
        ) {
            Affordability::Exceeded { burden, limit } => {
                info!(emi, burden, limit, "affordability guardrail rejected loan");
                let (message, suggestions) = guardrail_rejection(&self.config);
                (
                    false,
                    message,
                    suggestions,
                    DecisionBasis::AffordabilityGuardrail,
                )
            }
            Affordability::WithinLimit => {
                let feasible = FeasibilityPredictor::new(models.classifier.as_ref())
                    .predict_feasible(
                        profile.credit_score,
                        profile.monthly_income,
                        profile.monthly_expense,
                        profile.loan_amount,
                    )
                    .map_err(|source| {
                        warn!(%source, "feasibility classifier failed");
                        EvaluationError::PredictionUnavailable {
                            model: ModelKind::FeasibilityClassifier,
                            source,
                        }
                    })?;
                debug!(feasible, "feasibility classifier decided");
                let (message, suggestions) = classifier_outcome(feasible);
                (feasible, message, suggestions, DecisionBasis::Classifier)
            }
        };

        let insights = generate_insights(
            emi,
            profile.monthly_income,
            profile.monthly_expense,
            self.config.high_emi_ratio,
            self.config.high_expense_ratio,
        );

        Ok(FeasibilityVerdict {
            feasible,
            message,
            suggestions,
            insights,
            emi,
            decided_by,
            model_accuracy: self
                .config
                .include_model_metrics
                .then_some(models.metrics.classifier_accuracy)
                .flatten()
                .map(|accuracy| round2(accuracy * 100.0)),
        })
    }

    /// Cumulative repayment points for the requested terms.
    pub fn repayment_schedule(
        &self,
        request: &LoanRequest,
    ) -> Result<RepaymentSchedule, EvaluationError> {
        let quote = self.evaluate_emi(request)?;
        let points =
            generate_repayment_series(request.principal, request.tenure_months, quote.emi)?;
        Ok(RepaymentSchedule {
            annual_rate: quote.annual_rate,
            rate_source: quote.rate_source,
            emi: quote.emi,
            points,
        })
    }
}

fn resolve_rate(
    models: &ModelSet,
    supplied: Option<f64>,
    principal: f64,
    tenure_months: u32,
) -> Result<(f64, RateSource), EvaluationError> {
    if let Some(rate) = supplied {
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(LoanParameterError::InvalidRate(rate).into());
        }
        debug!(rate, "using supplied interest rate");
        return Ok((rate, RateSource::Supplied));
    }

    let rate = RatePredictor::new(models.regressor.as_ref())
        .predict_rate(principal, tenure_months)
        .map_err(|source| {
            warn!(%source, principal, tenure_months, "interest rate prediction failed");
            EvaluationError::PredictionUnavailable {
                model: ModelKind::InterestRegressor,
                source,
            }
        })?;
    debug!(rate, tenure_months, "predicted interest rate");
    Ok((rate, RateSource::Predicted))
}
