use serde::{Deserialize, Serialize};

/// Requested loan terms for an EMI computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: f64,
    pub tenure_months: u32,
    /// Annual percentage; `None` means the rate must be predicted.
    #[serde(default)]
    pub annual_interest_rate: Option<f64>,
}

impl LoanRequest {
    pub fn new(principal: f64, tenure_months: u32) -> Self {
        Self {
            principal,
            tenure_months,
            annual_interest_rate: None,
        }
    }

    pub fn with_rate(mut self, annual_interest_rate: f64) -> Self {
        self.annual_interest_rate = Some(annual_interest_rate);
        self
    }
}

/// Applicant financial attributes submitted for a feasibility verdict.
///
/// The tenure used for the feasibility EMI is fixed by policy, so the profile only carries
/// the requested principal and an optional rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub credit_score: i32,
    pub monthly_income: f64,
    pub monthly_expense: f64,
    pub loan_amount: f64,
    #[serde(default)]
    pub annual_interest_rate: Option<f64>,
}

/// Where the annual rate used for an evaluation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Supplied,
    Predicted,
}

impl RateSource {
    pub fn label(&self) -> &'static str {
        match self {
            RateSource::Supplied => "supplied",
            RateSource::Predicted => "predicted",
        }
    }
}

/// Output of the EMI evaluation path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmiQuote {
    pub annual_rate: f64,
    pub rate_source: RateSource,
    pub emi: f64,
    pub total_repayment: f64,
    pub total_interest: f64,
    pub tenure_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regressor_r2_score: Option<f64>,
}

/// Final verdict for a feasibility evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeasibilityVerdict {
    pub feasible: bool,
    pub message: String,
    pub suggestions: Vec<String>,
    pub insights: Vec<String>,
    pub emi: f64,
    pub decided_by: DecisionBasis,
    /// Held-out classifier accuracy in percent, only when metrics reporting is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_accuracy: Option<f64>,
}

/// Which tier of the policy produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionBasis {
    AffordabilityGuardrail,
    Classifier,
}
