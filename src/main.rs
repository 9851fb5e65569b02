use miniapp_bridge::{config, routes, state};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::BridgeConfig::from_env();
    tracing::info!(
        stall_timeout_secs = config.stall_timeout.as_secs(),
        max_total_chunks = config.max_total_chunks,
        "bridge config loaded"
    );

    let state = state::AppState::new(config);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "miniapp-bridge listening");
    axum::serve(listener, app).await.expect("server failed");
}
