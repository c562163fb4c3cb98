//! Client CRUD against PostgreSQL.

use sqlx::PgPool;

use crate::error::AppError;
use crate::model::{Client, ClientFields, NewClient};
use crate::service::Pagination;
use crate::store::qualified_table;

const SELECT_COLUMNS: &str = "id, first_name, last_name, email, phone, company, address, city, postal_code, country, created_at, updated_at";

/// One page of clients plus the counts needed to render pagination.
#[derive(Clone, Debug)]
pub struct ClientPage {
    pub total_records: i64,
    pub current_page: u32,
    pub total_pages: i64,
    pub clients: Vec<Client>,
}

/// Sole writer of the clients table.
#[derive(Clone, Debug)]
pub struct ClientService {
    pool: PgPool,
    table: String,
}

impl ClientService {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        ClientService {
            pool,
            table: qualified_table(schema),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Total count plus one page, newest first.
    pub async fn list(&self, pagination: Pagination) -> Result<ClientPage, AppError> {
        let count_sql = format!("SELECT COUNT(*) FROM {}", self.table);
        tracing::debug!(sql = %count_sql, "query");
        let total_records: i64 = sqlx::query_scalar(&count_sql).fetch_one(&self.pool).await?;

        let sql = format!(
            "SELECT {} FROM {} ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            SELECT_COLUMNS, self.table
        );
        tracing::debug!(sql = %sql, limit = pagination.limit, offset = pagination.offset(), "query");
        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(i64::from(pagination.limit))
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(ClientPage {
            total_records,
            current_page: pagination.page,
            total_pages: pagination.total_pages(total_records),
            clients,
        })
    }

    /// Fetch one row by id.
    pub async fn get(&self, id: i32) -> Result<Option<Client>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", SELECT_COLUMNS, self.table);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert one row. Duplicate email surfaces as a unique violation from the database.
    pub async fn create(&self, new: &NewClient) -> Result<Client, AppError> {
        let sql = format!(
            "INSERT INTO {} (first_name, last_name, email, phone, company, address, city, postal_code, country) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            self.table, SELECT_COLUMNS
        );
        tracing::debug!(sql = %sql, email = %new.email, "query");
        let row = sqlx::query_as::<_, Client>(&sql)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(&new.email)
            .bind(&new.phone)
            .bind(&new.company)
            .bind(&new.address)
            .bind(&new.city)
            .bind(&new.postal_code)
            .bind(&new.country)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Merge supplied fields into the row and refresh `updated_at`. Returns None when the id is absent.
    /// An empty change set leaves the row untouched.
    pub async fn update(&self, id: i32, fields: &ClientFields) -> Result<Option<Client>, AppError> {
        if fields.is_empty() {
            return self.get(id).await;
        }
        let sql = format!(
            "UPDATE {} SET \
             first_name = COALESCE($2, first_name), \
             last_name = COALESCE($3, last_name), \
             email = COALESCE($4, email), \
             phone = COALESCE($5, phone), \
             company = COALESCE($6, company), \
             address = COALESCE($7, address), \
             city = COALESCE($8, city), \
             postal_code = COALESCE($9, postal_code), \
             country = COALESCE($10, country), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            self.table, SELECT_COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(&fields.first_name)
            .bind(&fields.last_name)
            .bind(&fields.email)
            .bind(&fields.phone)
            .bind(&fields.company)
            .bind(&fields.address)
            .bind(&fields.city)
            .bind(&fields.postal_code)
            .bind(&fields.country)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Hard delete. Returns false when the id is absent.
    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        tracing::debug!(sql = %sql, id, "query");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
