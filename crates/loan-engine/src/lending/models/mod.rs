//! Trained-model capabilities consumed by the evaluation engine.
//!
//! Models are trained and versioned elsewhere. The engine only sees a narrow `predict`
//! surface over a fixed-shape feature vector, so tests can swap in deterministic fakes.

mod artifact;

pub use artifact::{
    ForestClassifierArtifact, LinearRegressionArtifact, ModelLoadError, TreeArtifact, TreeNode,
};

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{info, warn};

/// Regression capability mapping `[loan_amount, tenure_months]` to an annual rate.
pub trait TrainedRegressor: Send + Sync {
    fn predict(&self, features: &[f64; 2]) -> Result<f64, ModelError>;
}

/// Classification capability over `[credit_score, income, expense, loan_amount]`.
pub trait TrainedClassifier: Send + Sync {
    fn predict(&self, features: &[f64; 4]) -> Result<i64, ModelError>;
}

/// Failure raised by a model while predicting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("feature {index} is not a finite number")]
    NonFiniteFeature { index: usize },
    #[error("model produced a non-finite output")]
    NonFiniteOutput,
    #[error("model predicted a negative rate ({0})")]
    NegativeRate(f64),
    #[error("malformed model: {0}")]
    Malformed(String),
}

/// Names the capability that failed, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    InterestRegressor,
    FeasibilityClassifier,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::InterestRegressor => write!(f, "interest rate regressor"),
            ModelKind::FeasibilityClassifier => write!(f, "feasibility classifier"),
        }
    }
}

fn check_features(features: &[f64]) -> Result<(), ModelError> {
    match features.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(ModelError::NonFiniteFeature { index }),
        None => Ok(()),
    }
}

/// Predicts an annual interest rate when the caller omits one.
pub struct RatePredictor<'a> {
    regressor: &'a dyn TrainedRegressor,
}

impl<'a> RatePredictor<'a> {
    pub fn new(regressor: &'a dyn TrainedRegressor) -> Self {
        Self { regressor }
    }

    pub fn predict_rate(&self, loan_amount: f64, tenure_months: u32) -> Result<f64, ModelError> {
        let features = [loan_amount, f64::from(tenure_months)];
        check_features(&features)?;
        let rate = self.regressor.predict(&features)?;
        if !rate.is_finite() {
            return Err(ModelError::NonFiniteOutput);
        }
        if rate < 0.0 {
            return Err(ModelError::NegativeRate(rate));
        }
        Ok(rate)
    }
}

/// Secondary feasibility check behind the affordability guardrail.
pub struct FeasibilityPredictor<'a> {
    classifier: &'a dyn TrainedClassifier,
}

impl<'a> FeasibilityPredictor<'a> {
    pub fn new(classifier: &'a dyn TrainedClassifier) -> Self {
        Self { classifier }
    }

    /// Any non-zero class label counts as feasible.
    pub fn predict_feasible(
        &self,
        credit_score: i32,
        income: f64,
        expense: f64,
        loan_amount: f64,
    ) -> Result<bool, ModelError> {
        let features = [f64::from(credit_score), income, expense, loan_amount];
        check_features(&features)?;
        let label = self.classifier.predict(&features)?;
        Ok(label != 0)
    }
}

/// Held-out evaluation figures recorded when the models were trained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ModelMetrics {
    /// Fraction in `[0, 1]`.
    pub classifier_accuracy: Option<f64>,
    pub regressor_r2: Option<f64>,
}

/// One consistent pair of trained models.
#[derive(Clone)]
pub struct ModelSet {
    pub regressor: Arc<dyn TrainedRegressor>,
    pub classifier: Arc<dyn TrainedClassifier>,
    pub metrics: ModelMetrics,
}

impl std::fmt::Debug for ModelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSet")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl ModelSet {
    pub fn new(
        regressor: Arc<dyn TrainedRegressor>,
        classifier: Arc<dyn TrainedClassifier>,
    ) -> Self {
        Self {
            regressor,
            classifier,
            metrics: ModelMetrics::default(),
        }
    }

    pub fn with_metrics(mut self, metrics: ModelMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Load both artifacts from disk.
    pub fn load(
        regressor_path: impl AsRef<Path>,
        classifier_path: impl AsRef<Path>,
    ) -> Result<Self, ModelLoadError> {
        let regressor = LinearRegressionArtifact::from_path(regressor_path.as_ref())?;
        let classifier = ForestClassifierArtifact::from_path(classifier_path.as_ref())?;

        let metrics = ModelMetrics {
            classifier_accuracy: classifier.accuracy,
            regressor_r2: regressor.r2_score,
        };

        info!(
            regressor = %regressor_path.as_ref().display(),
            classifier = %classifier_path.as_ref().display(),
            trees = classifier.trees.len(),
            "trained models loaded"
        );

        Ok(Self {
            regressor: Arc::new(regressor),
            classifier: Arc::new(classifier),
            metrics,
        })
    }
}

/// Holds the active model set and swaps it atomically on redeploy.
///
/// Evaluations take a snapshot at the start and keep it for the whole request, so a
/// concurrent `publish` never mixes models within one verdict.
pub struct ModelRegistry {
    current: RwLock<Arc<ModelSet>>,
}

impl ModelRegistry {
    pub fn new(models: ModelSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(models)),
        }
    }

    pub fn snapshot(&self) -> Arc<ModelSet> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the active set, returning the retired one.
    pub fn publish(&self, models: ModelSet) -> Arc<ModelSet> {
        let next = Arc::new(models);
        let mut guard = self.current.write().unwrap_or_else(|poisoned| {
            warn!("model registry lock poisoned; recovering");
            poisoned.into_inner()
        });
        let retired = std::mem::replace(&mut *guard, next);
        info!(metrics = ?guard.metrics, "published new model set");
        retired
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("current", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRate(f64);

    impl TrainedRegressor for FixedRate {
        fn predict(&self, _features: &[f64; 2]) -> Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    struct FixedLabel(i64);

    impl TrainedClassifier for FixedLabel {
        fn predict(&self, _features: &[f64; 4]) -> Result<i64, ModelError> {
            Ok(self.0)
        }
    }

    #[test]
    fn rate_predictor_rejects_non_finite_output() {
        let regressor = FixedRate(f64::NAN);
        let err = RatePredictor::new(&regressor)
            .predict_rate(100_000.0, 60)
            .expect_err("nan rejected");
        assert_eq!(err, ModelError::NonFiniteOutput);
    }

    #[test]
    fn rate_predictor_rejects_negative_extrapolation() {
        let regressor = FixedRate(-0.4);
        let err = RatePredictor::new(&regressor)
            .predict_rate(10_000.0, 12)
            .expect_err("negative rejected");
        assert_eq!(err, ModelError::NegativeRate(-0.4));
    }

    #[test]
    fn rate_predictor_rejects_non_finite_features() {
        let regressor = FixedRate(9.5);
        let err = RatePredictor::new(&regressor)
            .predict_rate(f64::INFINITY, 60)
            .expect_err("infinite loan rejected");
        assert_eq!(err, ModelError::NonFiniteFeature { index: 0 });
    }

    #[test]
    fn feasibility_label_coercion() {
        for (label, expected) in [(0, false), (1, true), (2, true), (-1, true)] {
            let classifier = FixedLabel(label);
            let feasible = FeasibilityPredictor::new(&classifier)
                .predict_feasible(720, 80_000.0, 20_000.0, 300_000.0)
                .expect("prediction succeeds");
            assert_eq!(feasible, expected, "label {label}");
        }
    }

    #[test]
    fn publish_swaps_without_disturbing_existing_snapshots() {
        let registry = ModelRegistry::new(ModelSet::new(
            Arc::new(FixedRate(8.0)),
            Arc::new(FixedLabel(1)),
        ));
        let before = registry.snapshot();

        let retired = registry.publish(
            ModelSet::new(Arc::new(FixedRate(12.0)), Arc::new(FixedLabel(0))).with_metrics(
                ModelMetrics {
                    classifier_accuracy: Some(0.9),
                    regressor_r2: None,
                },
            ),
        );

        assert!(Arc::ptr_eq(&before, &retired));
        assert_eq!(before.regressor.predict(&[1.0, 1.0]), Ok(8.0));
        let after = registry.snapshot();
        assert_eq!(after.regressor.predict(&[1.0, 1.0]), Ok(12.0));
        assert_eq!(after.metrics.classifier_accuracy, Some(0.9));
    }
}
