use crate::config::server::ServerConfig;
use crate::ServiceState;
use std::sync::Arc;
use tower_http::services::ServeDir;

pub fn add_routers(
    router: axum::Router<Arc<ServiceState>>,
    server: &ServerConfig,
) -> axum::Router<Arc<ServiceState>> {
    router.nest_service(
        server.public_url_prefix.trim_end_matches('/'),
        ServeDir::new(&server.output_dir),
    )
}
