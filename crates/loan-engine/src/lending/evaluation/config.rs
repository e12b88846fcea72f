use serde::{Deserialize, Serialize};

/// Thresholds and switches for the decision policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub min_credit_score: i32,
    pub max_credit_score: i32,
    /// Expenses plus EMI above this share of income is infeasible outright.
    pub affordability_ratio: f64,
    pub high_emi_ratio: f64,
    pub high_expense_ratio: f64,
    pub feasibility_tenure_months: u32,
    /// Longest tenure any evaluation accepts.
    pub max_tenure_months: u32,
    pub include_model_metrics: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_credit_score: 300,
            max_credit_score: 900,
            affordability_ratio: 0.7,
            high_emi_ratio: 0.5,
            high_expense_ratio: 0.6,
            feasibility_tenure_months: 60,
            max_tenure_months: 600,
            include_model_metrics: false,
        }
    }
}
