use std::sync::Arc;
use thumbnail_service::{
    config::{tracing::init_tracing, ServiceConfig},
    routes::create_router,
    service::{synthesizer, workflow::ThumbnailWorkflow},
    ServiceState,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let mut config = ServiceConfig::default();
    config.init_from_env()?;

    std::fs::create_dir_all(&config.server.output_dir).map_err(|e| {
        format!(
            "Failed to create output directory {}: {}",
            config.server.output_dir.display(),
            e
        )
    })?;
    if config.synthesis.api_key.is_none() {
        warn!("No synthesis API key configured; generation requests will fail.");
    }

    let synthesizer = synthesizer::from_config(&config.synthesis).map_err(|e| e.to_string())?;
    info!("Using the {} synthesis backend.", synthesizer.name());
    let workflow = ThumbnailWorkflow::new(synthesizer, &config.thumbnail);

    let addr = config
        .server
        .get_socket_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;
    let http_addr = config.server.get_http_addr();
    let state = Arc::new(ServiceState { config, workflow });

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
    info!("Thumbnail service listening on {}", http_addr);

    axum::serve(listener, create_router(state))
        .await
        .map_err(|e| format!("Server error: {}", e))
}
