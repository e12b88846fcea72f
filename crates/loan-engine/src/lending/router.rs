use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use super::domain::{ApplicantProfile, DecisionBasis, LoanRequest, RateSource};
use super::evaluation::{EvaluationError, LoanEvaluationEngine, PolicyConfig, ValidationError};
use crate::error::AppError;

const EMI_SUGGESTION: &str = "Try reducing your loan amount or tenure to reduce overall interest.";

/// Router exposing the EMI, feasibility, and repayment-series endpoints.
pub fn lending_router(engine: Arc<LoanEvaluationEngine>) -> Router {
    Router::new()
        .route("/api/calculate-emi", post(calculate_emi_handler))
        .route("/api/predict-feasibility", post(predict_feasibility_handler))
        .route("/api/repayment-series", post(repayment_series_handler))
        .route("/api/interest-insight", get(interest_insight_handler))
        .with_state(engine)
}

/// Loan terms as posted by the calculator form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTermsPayload {
    #[serde(default)]
    pub loan_amount: f64,
    #[serde(default)]
    pub tenure_years: Option<f64>,
    #[serde(default)]
    pub tenure_months: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_optional_rate")]
    pub interest: Option<f64>,
}

impl LoanTermsPayload {
    /// Whole months, preferring an explicit month count. Unusable input maps to zero so the
    /// engine reports it as an invalid tenure.
    pub fn resolved_tenure_months(&self) -> u32 {
        if let Some(months) = self.tenure_months {
            return months;
        }
        let within_range = |months: f64| (1.0..=f64::from(u32::MAX)).contains(&months);
        match self.tenure_years.map(|years| (years * 12.0).floor()) {
            Some(months) if within_range(months) => months as u32,
            _ => 0,
        }
    }

    pub fn to_request(&self) -> LoanRequest {
        LoanRequest {
            principal: self.loan_amount,
            tenure_months: self.resolved_tenure_months(),
            annual_interest_rate: self.interest,
        }
    }
}

/// Applicant attributes as posted by the feasibility form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityPayload {
    #[serde(default)]
    pub cibil: f64,
    #[serde(default)]
    pub income: f64,
    #[serde(default)]
    pub expense: f64,
    #[serde(default)]
    pub loan_amount: f64,
    #[serde(default, deserialize_with = "deserialize_optional_rate")]
    pub interest: Option<f64>,
}

impl FeasibilityPayload {
    /// Range-checks the score as sent, then drops any fractional part.
    pub fn into_profile(self, config: &PolicyConfig) -> Result<ApplicantProfile, ValidationError> {
        let (min, max) = (config.min_credit_score, config.max_credit_score);
        if !(f64::from(min)..=f64::from(max)).contains(&self.cibil) {
            return Err(ValidationError::CreditScoreOutOfRange {
                score: self.cibil as i32,
                min,
                max,
            });
        }

        Ok(ApplicantProfile {
            credit_score: self.cibil.trunc() as i32,
            monthly_income: self.income,
            monthly_expense: self.expense,
            loan_amount: self.loan_amount,
            annual_interest_rate: self.interest,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiResponse {
    pub emi: f64,
    pub total_repayment: f64,
    pub total_interest: f64,
    pub predicted_interest_rate: f64,
    pub rate_source: RateSource,
    pub tenure_months: u32,
    pub suggestion: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_model_r2_score: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityResponse {
    pub feasible: bool,
    pub message: String,
    pub suggestions: Vec<String>,
    pub insights: Vec<String>,
    pub emi: f64,
    pub decided_by: DecisionBasis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feasibility_model_accuracy: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentPointView {
    pub month: u32,
    pub cumulative_paid: f64,
    pub cumulative_interest: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentSeriesResponse {
    pub emi: f64,
    pub annual_rate: f64,
    pub rate_source: RateSource,
    pub points: Vec<RepaymentPointView>,
}

pub(crate) async fn calculate_emi_handler(
    State(engine): State<Arc<LoanEvaluationEngine>>,
    payload: Result<Json<LoanTermsPayload>, JsonRejection>,
) -> Result<Json<EmiResponse>, AppError> {
    let Json(payload) = payload?;
    let quote = engine.evaluate_emi(&payload.to_request())?;

    Ok(Json(EmiResponse {
        emi: quote.emi,
        total_repayment: quote.total_repayment,
        total_interest: quote.total_interest,
        predicted_interest_rate: quote.annual_rate,
        rate_source: quote.rate_source,
        tenure_months: quote.tenure_months,
        suggestion: EMI_SUGGESTION,
        interest_model_r2_score: quote.regressor_r2_score,
    }))
}

pub(crate) async fn predict_feasibility_handler(
    State(engine): State<Arc<LoanEvaluationEngine>>,
    payload: Result<Json<FeasibilityPayload>, JsonRejection>,
) -> Result<Json<FeasibilityResponse>, AppError> {
    let Json(payload) = payload?;
    let profile = payload
        .into_profile(engine.config())
        .map_err(EvaluationError::from)?;
    let verdict = engine.evaluate_feasibility(&profile)?;

    Ok(Json(FeasibilityResponse {
        feasible: verdict.feasible,
        message: verdict.message,
        suggestions: verdict.suggestions,
        insights: verdict.insights,
        emi: verdict.emi,
        decided_by: verdict.decided_by,
        feasibility_model_accuracy: verdict.model_accuracy,
    }))
}

pub(crate) async fn repayment_series_handler(
    State(engine): State<Arc<LoanEvaluationEngine>>,
    payload: Result<Json<LoanTermsPayload>, JsonRejection>,
) -> Result<Json<RepaymentSeriesResponse>, AppError> {
    let Json(payload) = payload?;
    let schedule = engine.repayment_schedule(&payload.to_request())?;

    Ok(Json(RepaymentSeriesResponse {
        emi: schedule.emi,
        annual_rate: schedule.annual_rate,
        rate_source: schedule.rate_source,
        points: schedule
            .points
            .into_iter()
            .map(|point| RepaymentPointView {
                month: point.month,
                cumulative_paid: point.cumulative_paid,
                cumulative_interest: point.cumulative_interest,
            })
            .collect(),
    }))
}

pub(crate) async fn interest_insight_handler() -> Json<Value> {
    Json(json!({
        "description": "Interest rates are determined by several factors including:",
        "factors": [
            "1. Credit Score: A higher CIBIL score generally leads to lower interest rates.",
            "2. Loan Amount: Larger loans may have different rates compared to smaller ones.",
            "3. Loan Tenure: Longer tenures may result in higher interest costs over time.",
            "4. Market Conditions: Economic factors and central bank policies can affect interest rates.",
            "5. Lender Policies: Different financial institutions may have varying criteria for interest rates.",
        ]
    }))
}

/// Accepts a number, a numeric string, an empty string, or null.
fn deserialize_optional_rate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRate {
        Number(f64),
        Text(String),
    }

    match Option::<RawRate>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawRate::Number(value)) => Ok(Some(value)),
        Some(RawRate::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed.parse::<f64>().map(Some).map_err(|_| {
                    serde::de::Error::custom(format!("interest '{trimmed}' is not a number"))
                })
            }
        }
    }
}
