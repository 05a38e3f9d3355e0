use crate::config::AppConfig;
use crate::error::InferenceError;
use crate::features::{join_demographics, Demographics, RawRecord, SALES_COLUMN_SELECTION};
use crate::features::record::{normalize_zipcode, ZIPCODE_COLUMN};
use crate::model::ModelRegistry;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Receive → Join → Predict for a single task. Holds no mutable state; the
/// demographics table is re-read on every call.
pub struct PredictionService {
    demographics_path: PathBuf,
    registry: ModelRegistry,
}

impl PredictionService {
    pub fn new(demographics_path: impl Into<PathBuf>, registry: ModelRegistry) -> Self {
        Self {
            demographics_path: demographics_path.into(),
            registry,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.data.demographics_path.clone(),
            ModelRegistry::from_config(&config.model),
        )
    }

    pub fn demographics_path(&self) -> &Path {
        &self.demographics_path
    }

    pub fn predict(&self, task: &RawRecord) -> Result<f64, InferenceError> {
        let demographics = Demographics::load(&self.demographics_path)?;
        let features =
            join_demographics(std::slice::from_ref(task), &SALES_COLUMN_SELECTION, &demographics)?;

        let degraded = !features.is_matched(0);
        if degraded {
            warn!(
                zipcode = %zipcode_of(task),
                "no demographics for zipcode, predicting with missing values"
            );
        }

        let model = self.registry.get()?;
        let output = model.predict(&features)?;
        let price = output
            .first()
            .copied()
            .ok_or_else(|| InferenceError::PredictionFailed("model returned no output".to_string()))?;

        if !price.is_finite() {
            return Err(if degraded {
                InferenceError::LookupDegraded(zipcode_of(task))
            } else {
                InferenceError::PredictionFailed(format!("model returned {}", price))
            });
        }

        Ok(price)
    }
}

fn zipcode_of(task: &RawRecord) -> String {
    task.get(ZIPCODE_COLUMN)
        .and_then(|v| normalize_zipcode(v).ok())
        .unwrap_or_default()
}
