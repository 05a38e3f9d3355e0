use crate::features::RawRecord;
use crate::service::PredictionService;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared Application State
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    /// Present when a Prometheus recorder was installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(service: PredictionService) -> Self {
        Self {
            service: Arc::new(service),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

// --- DTOs (Data Transfer Objects) ---

#[derive(Deserialize, Debug)]
pub struct PredictRequest {
    /// Raw sale attributes; absent means empty, which fails validation.
    #[serde(default)]
    pub task: RawRecord,
    pub request_id: Option<String>,
    pub task_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct PredictResponse {
    pub price: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct StatusResponse {
    #[serde(rename = "Status")]
    pub status: String,
}
