pub(crate) const HIGH_EMI_INSIGHT: &str =
    "Your EMI is significantly high compared to your income. Consider reducing your loan amount.";
pub(crate) const HIGH_EXPENSE_INSIGHT: &str =
    "Your expenses are quite high. It's advisable to cut down on non-essential spending.";

/// Observations on the EMI and expense burden, EMI check first.
pub fn generate_insights(
    emi: f64,
    income: f64,
    expense: f64,
    high_emi_ratio: f64,
    high_expense_ratio: f64,
) -> Vec<String> {
    let mut insights = Vec::new();
    if emi > high_emi_ratio * income {
        insights.push(HIGH_EMI_INSIGHT.to_string());
    }
    if expense > high_expense_ratio * income {
        insights.push(HIGH_EXPENSE_INSIGHT.to_string());
    }
    insights
}
