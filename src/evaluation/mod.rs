//! Offline accuracy report for the deployed model.
//!
//! Reproduces the training split over the historical sales, scores the model
//! on both partitions and renders the comparison chart.

pub mod dataset;
pub mod metrics;
pub mod outliers;
pub mod report;
pub mod split;

use crate::config::AppConfig;
use crate::error::InferenceError;
use crate::features::Demographics;
use crate::model::{loader::load_model, Predictor};
use dataset::LabeledDataset;
use metrics::PartitionMetrics;
use outliers::Outlier;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub use report::{render_report, RenderError};
pub use split::{train_test_split, SplitError};

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Model file not found at {0} - run training first or point model.path to the model artifact")]
    ModelMissing(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Split(#[from] SplitError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Model returned {got} predictions for {expected} rows")]
    PredictionCount { expected: usize, got: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub train: PartitionMetrics,
    pub test: PartitionMetrics,
    /// Largest absolute errors on the test partition.
    pub outliers: Vec<Outlier>,
    /// `(actual, predicted)` for every test row, in split order.
    pub test_points: Vec<(f64, f64)>,
    pub n_train: usize,
    pub n_test: usize,
}

/// Splits `dataset`, predicts both partitions and scores them.
pub fn evaluate(
    model: &dyn Predictor,
    dataset: &LabeledDataset,
    split: &crate::config::SplitConfig,
    n_outliers: usize,
) -> Result<EvaluationReport, EvaluationError> {
    let indices = train_test_split(dataset.len(), split)?;

    let (train_x, train_y) = dataset.partition(&indices.train);
    let (test_x, test_y) = dataset.partition(&indices.test);

    let train_pred = predict_checked(model, &train_x)?;
    let test_pred = predict_checked(model, &test_x)?;

    Ok(EvaluationReport {
        train: PartitionMetrics::compute(&train_y, &train_pred),
        test: PartitionMetrics::compute(&test_y, &test_pred),
        outliers: outliers::top_outliers(&test_y, &test_pred, n_outliers),
        test_points: test_y.iter().copied().zip(test_pred.iter().copied()).collect(),
        n_train: train_y.len(),
        n_test: test_y.len(),
    })
}

fn predict_checked(
    model: &dyn Predictor,
    features: &crate::features::FeatureTable,
) -> Result<Vec<f64>, EvaluationError> {
    let predictions = model.predict(features)?;
    if predictions.len() != features.n_rows() {
        return Err(EvaluationError::PredictionCount {
            expected: features.n_rows(),
            got: predictions.len(),
        });
    }
    Ok(predictions)
}

/// Full batch job: load data, check for the model, evaluate, render.
pub fn run(config: &AppConfig) -> Result<EvaluationReport, EvaluationError> {
    let demographics = Demographics::load(&config.data.demographics_path)?;
    let dataset = dataset::load_sales(&config.data.sales_path, &demographics)?;
    info!(
        rows = dataset.len(),
        unmatched = dataset.features.unmatched_rows().len(),
        "loaded sales history"
    );

    let model_path = &config.model.path;
    if !model_path.exists() {
        return Err(EvaluationError::ModelMissing(model_path.display().to_string()));
    }
    let model = load_model(model_path)?;

    let report = evaluate(
        model.as_ref(),
        &dataset,
        &config.split,
        config.evaluation.outliers,
    )?;
    info!(
        seed = config.split.seed,
        n_train = report.n_train,
        n_test = report.n_test,
        train_rmse = report.train.rmse,
        train_r2 = report.train.r2,
        test_rmse = report.test.rmse,
        test_r2 = report.test.r2,
        "evaluation complete"
    );

    render_report(&report, &config.evaluation.output_path)?;
    info!(path = %config.evaluation.output_path.display(), "saved visualization");

    Ok(report)
}
