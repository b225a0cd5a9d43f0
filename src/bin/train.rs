use job_risk_radar::{config::AppConfig, services::training};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env()?;
    let train_config = config.train();

    tracing::info!(
        dataset = %config.dataset_path,
        model = %config.model_path,
        seed = train_config.seed,
        n_estimators = train_config.n_estimators,
        "Starting training run"
    );

    let report = training::run(&config.dataset_path, &config.model_path, &train_config)
        .inspect_err(|e| tracing::error!(error = %e, "Training failed, no artifact written"))?;

    for class in &report.evaluation.per_class {
        tracing::info!(
            label = %class.label,
            support = class.support,
            precision = class.precision,
            recall = class.recall,
            "Holdout class report"
        );
    }
    tracing::info!(
        class_counts = ?report.class_counts,
        train_rows = report.train_rows,
        test_rows = report.test_rows,
        accuracy = report.evaluation.accuracy,
        confusion = ?report.evaluation.confusion,
        "Training complete"
    );

    Ok(())
}
