pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod predictor;
pub mod registry;

pub use predictor::{LinearPredictor, Predictor};
pub use registry::ModelRegistry;
