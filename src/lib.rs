pub mod config;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod model;
pub mod server;
pub mod service;
pub mod telemetry;

#[cfg(test)]
mod integration_tests;

// Re-export common types
pub use error::InferenceError;
pub use service::PredictionService;
