//! Response bodies shared by handlers.

use axum::{http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Client;
use crate::service::ClientPage;

/// `{"error": "..."}`; every failed request uses this shape.
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize, Debug)]
pub struct MessageBody {
    pub message: &'static str,
}

/// Paginated list envelope. Field names are camelCase on the wire.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ClientList {
    pub total_records: i64,
    pub current_page: u32,
    pub total_pages: i64,
    pub clients: Vec<Client>,
}

impl From<ClientPage> for ClientList {
    fn from(page: ClientPage) -> Self {
        ClientList {
            total_records: page.total_records,
            current_page: page.current_page,
            total_pages: page.total_pages,
            clients: page.clients,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct HealthBody {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn message(message: &'static str) -> (StatusCode, Json<MessageBody>) {
    (StatusCode::OK, Json(MessageBody { message }))
}
