//! Loan evaluation: amortization, trained-model adapters, and the decision policy.

pub mod amortization;
pub mod domain;
pub mod evaluation;
pub mod models;
pub mod router;

#[cfg(test)]
mod tests;

pub use amortization::{
    compute_emi, generate_repayment_series, AmortizationResult, LoanParameterError,
    RepaymentPoint,
};
pub use domain::{
    ApplicantProfile, DecisionBasis, EmiQuote, FeasibilityVerdict, LoanRequest, RateSource,
};
pub use evaluation::{
    generate_insights, EvaluationError, LoanEvaluationEngine, PolicyConfig, RepaymentSchedule,
    ValidationError,
};
pub use models::{
    FeasibilityPredictor, ModelError, ModelKind, ModelLoadError, ModelMetrics, ModelRegistry,
    ModelSet, RatePredictor, TrainedClassifier, TrainedRegressor,
};
pub use router::lending_router;
