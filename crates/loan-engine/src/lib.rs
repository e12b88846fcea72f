//! Loan evaluation engine.
//!
//! Computes equated monthly installments, resolves interest rates through a trained
//! regressor when the caller omits one, and combines a fixed affordability guardrail with a
//! trained feasibility classifier into a single verdict.

pub mod config;
pub mod error;
pub mod lending;
pub mod telemetry;
