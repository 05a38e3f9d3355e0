use anyhow::Context;
use pricecast::{config, server, telemetry, PredictionService};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Init
    telemetry::init_tracing();

    // 2. Load Config
    let mut config = config::AppConfig::load()?;
    if let Some(port) = std::env::args().nth(1) {
        config.server.port = port
            .parse()
            .with_context(|| format!("invalid port argument '{}'", port))?;
    }

    // 3. Build the service
    let service = PredictionService::from_config(&config);
    info!(
        model = %config.model.path.display(),
        demographics = %config.data.demographics_path.display(),
        policy = ?config.model.load_policy,
        "prediction service configured"
    );

    // 4. Create Router
    let mut state = server::types::AppState::new(service);
    if let Some(handle) = telemetry::install_metrics_recorder() {
        state = state.with_metrics(handle);
    }
    let app = server::routes::create_router(state);

    // 5. Bind & Serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
