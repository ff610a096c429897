pub mod public;
pub mod thumbnail;
use std::sync::Arc;

use crate::{utils::error::handle_panic, ServiceState};
use axum::{extract::DefaultBodyLimit, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

pub fn create_router(state: Arc<ServiceState>) -> Router {
    let router = Router::new();
    let router = thumbnail::add_routers(router);
    let router = public::add_routers(router, &state.config.server);
    let router = router.layer(DefaultBodyLimit::max(64 * 1024));
    router
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
}
