//! Route assembly: common routes, client API, static fallback, and the cross-cutting layers.

mod client;
mod common;

pub use client::client_routes;
pub use common::common_routes;

use crate::middleware::security_headers;
use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Request bodies above this size are rejected with 413.
pub const MAX_BODY_BYTES: usize = 100 * 1024;

/// Full application router. Unmatched paths are served from the public directory.
pub fn app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.public_dir);
    let headers = security_headers(&state.config);

    let mut router = Router::new()
        .merge(common_routes(state.clone()))
        .merge(client_routes(state))
        .fallback_service(static_files)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));
    for (name, value) in headers {
        router = router.layer(SetResponseHeaderLayer::overriding(name, value));
    }
    router.layer(TraceLayer::new_for_http())
}
