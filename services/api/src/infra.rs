use loan_engine::config::AppConfig;
use loan_engine::error::AppError;
use loan_engine::lending::{LoanEvaluationEngine, ModelRegistry, ModelSet};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the configured artifacts and wrap them in an engine with the configured policy.
pub(crate) fn engine_from_config(config: &AppConfig) -> Result<LoanEvaluationEngine, AppError> {
    let models = ModelSet::load(&config.models.regressor_path, &config.models.classifier_path)?;
    let registry = Arc::new(ModelRegistry::new(models));
    Ok(LoanEvaluationEngine::new(config.policy.clone(), registry))
}

#[cfg(test)]
pub(crate) fn shipped_engine() -> LoanEvaluationEngine {
    use loan_engine::lending::PolicyConfig;
    use std::path::PathBuf;

    let models_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models");
    let models = ModelSet::load(
        models_dir.join("interest_regressor.json"),
        models_dir.join("feasibility_classifier.json"),
    )
    .expect("shipped artifacts load");
    LoanEvaluationEngine::new(PolicyConfig::default(), Arc::new(ModelRegistry::new(models)))
}
