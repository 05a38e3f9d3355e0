use crate::config::{LoadPolicy, ModelConfig};
use crate::error::InferenceError;
use crate::model::loader::load_model;
use crate::model::predictor::Predictor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Hands out the model artifact according to the configured [`LoadPolicy`].
///
/// With `Fresh` every call re-reads the file, so a replaced artifact is
/// picked up by the next request. With `Cached` the first successful load is
/// kept; a failed load is not cached and is retried on the next call.
#[derive(Clone)]
pub struct ModelRegistry {
    path: PathBuf,
    policy: LoadPolicy,
    cached: Arc<RwLock<Option<Arc<dyn Predictor>>>>,
}

impl ModelRegistry {
    pub fn new(path: impl Into<PathBuf>, policy: LoadPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.path.clone(), config.load_policy)
    }

    /// A registry that always serves `predictor` and never touches disk.
    pub fn preloaded(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            path: PathBuf::new(),
            policy: LoadPolicy::Cached,
            cached: Arc::new(RwLock::new(Some(predictor))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    pub fn get(&self) -> Result<Arc<dyn Predictor>, InferenceError> {
        match self.policy {
            LoadPolicy::Fresh => load_model(&self.path),
            LoadPolicy::Cached => {
                {
                    let slot = self.cached.read().unwrap_or_else(|e| e.into_inner());
                    if let Some(model) = slot.as_ref() {
                        return Ok(Arc::clone(model));
                    }
                }

                let mut slot = self.cached.write().unwrap_or_else(|e| e.into_inner());
                // Another request may have loaded it while we waited.
                if let Some(model) = slot.as_ref() {
                    return Ok(Arc::clone(model));
                }
                let model = load_model(&self.path)?;
                tracing::info!(path = %self.path.display(), "model cached");
                *slot = Some(Arc::clone(&model));
                Ok(model)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::predictor::LinearPredictor;
    use tempfile::Builder;

    fn write_model(file: &tempfile::NamedTempFile, intercept: f64) {
        let model = LinearPredictor::constant(intercept, 0);
        std::fs::write(file.path(), serde_json::to_string(&model).unwrap()).unwrap();
    }

    fn intercept_of(registry: &ModelRegistry) -> f64 {
        let table = crate::features::join_demographics(
            &[serde_json::json!({"zipcode": "98027"}).as_object().cloned().unwrap()],
            &["zipcode"],
            &crate::features::Demographics::default(),
        )
        .unwrap();
        registry.get().unwrap().predict(&table).unwrap()[0]
    }

    #[test]
    fn test_fresh_policy_rereads_file() {
        let file = Builder::new().suffix(".json").tempfile().unwrap();
        write_model(&file, 1.0);
        let registry = ModelRegistry::new(file.path(), LoadPolicy::Fresh);
        assert_eq!(intercept_of(&registry), 1.0);

        write_model(&file, 2.0);
        assert_eq!(intercept_of(&registry), 2.0);
    }

    #[test]
    fn test_cached_policy_keeps_first_load() {
        let file = Builder::new().suffix(".json").tempfile().unwrap();
        write_model(&file, 1.0);
        let registry = ModelRegistry::new(file.path(), LoadPolicy::Cached);
        assert_eq!(intercept_of(&registry), 1.0);

        write_model(&file, 2.0);
        assert_eq!(intercept_of(&registry), 1.0);
    }

    #[test]
    fn test_cached_policy_does_not_cache_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let registry = ModelRegistry::new(&path, LoadPolicy::Cached);
        assert!(matches!(
            registry.get(),
            Err(InferenceError::ModelNotFound(_))
        ));

        std::fs::write(&path, r#"{"intercept": 3.0, "coefficients": []}"#).unwrap();
        assert_eq!(intercept_of(&registry), 3.0);
    }

    #[test]
    fn test_preloaded() {
        let registry = ModelRegistry::preloaded(Arc::new(LinearPredictor::constant(7.0, 0)));
        assert_eq!(registry.policy(), LoadPolicy::Cached);
        assert_eq!(intercept_of(&registry), 7.0);
    }

    #[test]
    fn test_from_config() {
        let config = ModelConfig::default();
        let registry = ModelRegistry::from_config(&config);
        assert_eq!(registry.path(), Path::new("model/model.onnx"));
        assert_eq!(registry.policy(), LoadPolicy::Fresh);
    }
}
