use std::sync::Arc;

use crate::controllers::thumbnail;
use crate::ServiceState;
use axum::routing::{get, post};

pub fn add_routers(router: axum::Router<Arc<ServiceState>>) -> axum::Router<Arc<ServiceState>> {
    router
        .route("/", get(thumbnail::index))
        .route("/generate", post(thumbnail::generate_thumbnail))
        .route("/api/thumbnail", post(thumbnail::generate_thumbnail))
        .route("/api/health", get(thumbnail::health))
}
