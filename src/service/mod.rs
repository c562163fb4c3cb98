//! ClientService: CRUD, validation, and pagination.

mod crud;
mod pagination;
mod validation;
pub use crud::{ClientPage, ClientService};
pub use pagination::{Pagination, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use validation::{RequestValidator, MAX_FIELD_LENGTH};
