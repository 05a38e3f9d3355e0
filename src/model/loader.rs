use crate::error::InferenceError;
use crate::model::predictor::{LinearPredictor, Predictor};
use std::path::Path;
use std::sync::Arc;

/// Loads a model artifact from disk, choosing the format by file extension.
///
/// # Arguments
/// * `model_path` - Path to a `.onnx` graph or a `.json` linear model
pub fn load_model(model_path: impl AsRef<Path>) -> Result<Arc<dyn Predictor>, InferenceError> {
    let path = model_path.as_ref();
    if !path.exists() {
        return Err(InferenceError::ModelNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let model: Arc<dyn Predictor> = match extension.as_deref() {
        Some("json") => Arc::new(LinearPredictor::from_file(path)?),
        #[cfg(feature = "onnx")]
        Some("onnx") => Arc::new(crate::model::onnx::OnnxPredictor::from_file(path)?),
        _ => {
            return Err(InferenceError::UnsupportedModel(format!(
                "{} (expected .json{})",
                path.display(),
                if cfg!(feature = "onnx") { " or .onnx" } else { "" }
            )))
        }
    };

    tracing::debug!(path = %path.display(), "loaded model");
    Ok(model)
}
