use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::lending::evaluation::{LoanEvaluationEngine, PolicyConfig};
use crate::lending::models::{
    ModelError, ModelMetrics, ModelRegistry, ModelSet, TrainedClassifier, TrainedRegressor,
};
use crate::lending::ApplicantProfile;

/// Regressor returning a fixed rate and counting calls.
#[derive(Default)]
pub(super) struct FakeRegressor {
    pub(super) rate: f64,
    pub(super) calls: AtomicUsize,
    pub(super) last_tenure: AtomicUsize,
}

impl FakeRegressor {
    pub(super) fn with_rate(rate: f64) -> Self {
        Self {
            rate,
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn last_tenure(&self) -> usize {
        self.last_tenure.load(Ordering::SeqCst)
    }
}

impl TrainedRegressor for FakeRegressor {
    fn predict(&self, features: &[f64; 2]) -> Result<f64, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_tenure.store(features[1] as usize, Ordering::SeqCst);
        Ok(self.rate)
    }
}

/// Classifier returning a fixed label and counting calls.
#[derive(Default)]
pub(super) struct FakeClassifier {
    pub(super) label: i64,
    pub(super) calls: AtomicUsize,
}

impl FakeClassifier {
    pub(super) fn with_label(label: i64) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TrainedClassifier for FakeClassifier {
    fn predict(&self, _features: &[f64; 4]) -> Result<i64, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.label)
    }
}

pub(super) struct BrokenRegressor;

impl TrainedRegressor for BrokenRegressor {
    fn predict(&self, _features: &[f64; 2]) -> Result<f64, ModelError> {
        Err(ModelError::Malformed("coefficients missing".to_string()))
    }
}

pub(super) struct BrokenClassifier;

impl TrainedClassifier for BrokenClassifier {
    fn predict(&self, _features: &[f64; 4]) -> Result<i64, ModelError> {
        Err(ModelError::Malformed("no trees".to_string()))
    }
}

pub(super) struct Harness {
    pub(super) engine: LoanEvaluationEngine,
    pub(super) regressor: Arc<FakeRegressor>,
    pub(super) classifier: Arc<FakeClassifier>,
}

pub(super) fn harness(rate: f64, label: i64) -> Harness {
    harness_with_config(rate, label, PolicyConfig::default())
}

pub(super) fn harness_with_config(rate: f64, label: i64, config: PolicyConfig) -> Harness {
    let regressor = Arc::new(FakeRegressor::with_rate(rate));
    let classifier = Arc::new(FakeClassifier::with_label(label));
    let models = ModelSet::new(regressor.clone(), classifier.clone()).with_metrics(ModelMetrics {
        classifier_accuracy: Some(0.9734),
        regressor_r2: Some(0.0123),
    });
    let engine = LoanEvaluationEngine::new(config, Arc::new(ModelRegistry::new(models)));
    Harness {
        engine,
        regressor,
        classifier,
    }
}

pub(super) fn engine_with(
    regressor: Arc<dyn TrainedRegressor>,
    classifier: Arc<dyn TrainedClassifier>,
) -> LoanEvaluationEngine {
    LoanEvaluationEngine::new(
        PolicyConfig::default(),
        Arc::new(ModelRegistry::new(ModelSet::new(regressor, classifier))),
    )
}

pub(super) fn profile(credit_score: i32, income: f64, expense: f64, loan: f64) -> ApplicantProfile {
    ApplicantProfile {
        credit_score,
        monthly_income: income,
        monthly_expense: expense,
        loan_amount: loan,
        annual_interest_rate: None,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
