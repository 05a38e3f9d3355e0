use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::error::InferenceError;
use crate::server::types::*;

pub async fn health_check() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "Running".to_string(),
    })
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, InferenceError> {
    let start = Instant::now();
    let result = run_prediction(&state, payload).await;
    histogram!(
        "prediction_latency_seconds",
        start.elapsed().as_secs_f64()
    );

    match &result {
        Ok(response) => {
            counter!("predictions_total", 1);
            info!(price = response.price, "prediction result");
        }
        Err(err) => {
            counter!("prediction_errors_total", 1, "kind" => err.kind().as_str());
            error!(kind = err.kind().as_str(), error = %err, "prediction failed");
        }
    }

    result.map(Json)
}

async fn run_prediction(
    state: &AppState,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<PredictResponse, InferenceError> {
    let Json(request) = payload.map_err(|e| InferenceError::InvalidRequest(e.body_text()))?;

    info!(
        request_id = request.request_id.as_deref().unwrap_or("-"),
        task_type = request.task_type.as_deref().unwrap_or("-"),
        task = %serde_json::Value::Object(request.task.clone()),
        "received prediction request"
    );

    let service = Arc::clone(&state.service);
    let task = request.task;
    let price = tokio::task::spawn_blocking(move || service.predict(&task))
        .await
        .map_err(|e| InferenceError::PredictionFailed(format!("prediction task aborted: {}", e)))??;

    Ok(PredictResponse { price })
}

pub async fn render_metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
