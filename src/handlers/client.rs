//! Client CRUD handlers: list, read, create, update, delete.

use crate::error::AppError;
use crate::model::ClientFields;
use crate::response::{self, ClientList};
use crate::service::{Pagination, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

pub const NOT_FOUND: &str = "Client not found";

/// Ids are SERIAL; anything else cannot match a row.
fn parse_id(id_str: &str) -> Result<i32, AppError> {
    id_str
        .trim()
        .parse::<i32>()
        .map_err(|_| AppError::NotFound(NOT_FOUND.into()))
}

/// Decode a JSON body into the field allow-list.
fn body_to_fields(body: Result<Json<Value>, JsonRejection>) -> Result<ClientFields, AppError> {
    let Json(value) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if !value.is_object() {
        return Err(AppError::BadRequest("body must be a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| AppError::BadRequest(e.to_string()))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination::from_query(&params, state.config.max_page_size);
    let page = state
        .clients
        .list(pagination)
        .await
        .map_err(|e| e.context("Failed to fetch clients"))?;
    Ok(response::ok(ClientList::from(page)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let client = state
        .clients
        .get(id)
        .await
        .map_err(|e| e.context("Failed to fetch client"))?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(response::ok(client))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let fields = body_to_fields(body)?;
    let create = async {
        let new = RequestValidator::validate_new(fields)?;
        state.clients.create(&new).await
    };
    let client = create.await.map_err(|e| e.context("Failed to create client"))?;
    tracing::info!(id = client.id, "client created");
    Ok(response::created(client))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let fields = body_to_fields(body)?;
    if let Err(invalid) = RequestValidator::validate_partial(&fields) {
        // an absent record is reported as such, whatever the body holds
        let existing = state
            .clients
            .get(id)
            .await
            .map_err(|e| e.context("Failed to update client"))?;
        if existing.is_none() {
            return Err(AppError::NotFound(NOT_FOUND.into()));
        }
        return Err(invalid.context("Failed to update client"));
    }
    let client = state
        .clients
        .update(id, &fields)
        .await
        .map_err(|e| e.context("Failed to update client"))?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    tracing::info!(id, "client updated");
    Ok(response::ok(client))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let deleted = state
        .clients
        .delete(id)
        .await
        .map_err(|e| e.context("Failed to delete client"))?;
    if !deleted {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }
    tracing::info!(id, "client deleted");
    Ok(response::message("Client deleted successfully"))
}
