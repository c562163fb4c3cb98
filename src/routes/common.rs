//! Common routes: health, landing page, favicon, clients page.

use crate::response::HealthBody;
use crate::state::AppState;
use crate::store::connectivity_check;
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use tower_http::services::ServeFile;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Client Registry</title>
</head>
<body>
  <h1>Client Registry</h1>
  <p>REST API for client contact records.</p>
  <ul>
    <li><code>GET /api/clients?page=1&amp;limit=10</code> list clients</li>
    <li><code>GET /api/clients/:id</code> fetch one client</li>
    <li><code>POST /api/clients</code> create a client</li>
    <li><code>PUT /api/clients/:id</code> update a client</li>
    <li><code>DELETE /api/clients/:id</code> delete a client</li>
    <li><code>GET /_health</code> health check</li>
  </ul>
  <p><a href="/clients">Manage clients</a></p>
</body>
</html>
"#;

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthBody>) {
    let timestamp = chrono::Utc::now();
    match connectivity_check(state.pool()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthBody {
                status: "ok",
                database: "connected",
                timestamp,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthBody {
                    status: "error",
                    database: "disconnected",
                    timestamp,
                }),
            )
        }
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET /_health, GET /, GET /favicon.ico, GET /clients.
pub fn common_routes(state: AppState) -> Router {
    let clients_page = ServeFile::new(state.config.public_dir.join("clients.html"));
    Router::new()
        .route("/_health", get(health))
        .route("/", get(index))
        .route("/favicon.ico", get(favicon))
        .route_service("/clients", clients_page)
        .with_state(state)
}
