//! Client CRUD routes under /api, behind the per-IP rate limit.

use crate::error::AppError;
use crate::handlers::client::{create, delete as delete_handler, list, read, update};
use crate::middleware::rate_limit;
use crate::state::AppState;
use axum::{middleware, routing::get, Router};

async fn api_not_found() -> AppError {
    AppError::NotFound("Not found".into())
}

/// Every path under /api counts against the limit, including unmatched ones.
pub fn client_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/clients", get(list).post(create))
        .route(
            "/clients/:id",
            get(read).put(update).delete(delete_handler),
        )
        .fallback(api_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .with_state(state);
    Router::new().nest("/api", api)
}
