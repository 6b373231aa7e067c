use eventcard_server::config::ServerConfig;
use eventcard_server::routes;
use eventcard_server::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env().expect("invalid server configuration");
    if config.cloudinary.is_none() {
        tracing::warn!("Cloudinary not configured; uploads will fail");
    }
    if config.resend_api_key.is_none() {
        tracing::warn!("RESEND_API_KEY not set; confirmation emails disabled");
    }

    let state = AppState::from_config(&config);

    // Load fonts and build the measurer before the first render needs them.
    let cards = state.cards.clone();
    tokio::spawn(async move {
        if let Err(e) = cards.measurer().await {
            tracing::error!(error = %e, "font warm-up failed");
        }
    });

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "eventcard server listening");
    axum::serve(listener, app).await.expect("server failed");
}
