use async_trait::async_trait;
use sqlx::PgPool;
use tarmac_core::{StoreResult, User, UserRepository};

use crate::database::map_db_error;

#[derive(sqlx::FromRow)]
struct CustomerRow {
    customer_id: i32,
    handle: String,
    full_name: String,
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn log_in(&self, handle: &str, password: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT customer_id, handle, full_name FROM customers WHERE handle = $1 AND password = $2",
        )
        .bind(handle)
        .bind(password)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(|r| User {
            id: r.customer_id,
            handle: r.handle,
            full_name: r.full_name,
        }))
    }
}
