//! HTTP handlers for client CRUD.

pub mod client;
pub use client::*;
