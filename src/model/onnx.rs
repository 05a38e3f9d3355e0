use crate::error::InferenceError;
use crate::features::FeatureTable;
use crate::model::predictor::Predictor;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;

/// Regressor exported to ONNX (e.g. a scikit-learn pipeline through skl2onnx).
pub struct OnnxPredictor {
    // `Session::run` needs exclusive access.
    session: Mutex<Session>,
    input_name: String,
}

impl OnnxPredictor {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(1)?
            .commit_from_file(path)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| InferenceError::ModelLoad {
                path: path.display().to_string(),
                reason: "model declares no inputs".to_string(),
            })?;

        for (i, input) in session.inputs.iter().enumerate() {
            tracing::debug!(index = i, name = %input.name, ty = ?input.input_type, "model input");
        }

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>, InferenceError> {
        let shape = vec![features.n_rows(), features.n_columns()];
        let data = features.to_f32_row_major().into_boxed_slice();
        let input = Tensor::from_array((shape, data))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::PredictionFailed("model session poisoned".to_string()))?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input])?;

        let (_, data) = outputs[0].try_extract_tensor::<f32>()?;
        if data.len() != features.n_rows() {
            return Err(InferenceError::PredictionFailed(format!(
                "model returned {} values for {} rows",
                data.len(),
                features.n_rows()
            )));
        }

        Ok(data.iter().map(|&v| v as f64).collect())
    }
}
