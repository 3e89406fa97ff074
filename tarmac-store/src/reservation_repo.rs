use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use tarmac_core::{Flight, IsolationLevel, ReservationStore, ReservationTx, StoreResult};
use tracing::debug;

use crate::database::map_db_error;
use crate::flight_repo::{flight_from_row, FLIGHT_COLUMNS};

pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// An open PostgreSQL transaction. sqlx rolls it back if dropped uncommitted.
pub struct PgReservationTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn begin(&self, isolation: IsolationLevel) -> StoreResult<Box<dyn ReservationTx>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Must be the first statement of the transaction.
        let set_isolation = format!("SET TRANSACTION ISOLATION LEVEL {}", isolation.as_sql());
        sqlx::query(&set_isolation)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        debug!(%isolation, "Postgres transaction started");
        Ok(Box::new(PgReservationTx { tx }))
    }

    async fn list_reservations(&self, user_id: i32) -> StoreResult<Vec<Flight>> {
        let sql = format!(
            r#"
            SELECT {FLIGHT_COLUMNS}
            FROM reservations r
            JOIN flights f ON r.flight_id = f.fid
            JOIN carriers c ON f.carrier_id = c.cid
            WHERE r.customer_id = $1
            ORDER BY f.flight_date ASC, f.fid ASC
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        rows.iter()
            .map(|row| flight_from_row(row, ""))
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_db_error)
    }
}

#[async_trait]
impl ReservationTx for PgReservationTx {
    async fn count_reservations_on_flight(&mut self, flight_id: i32) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations WHERE flight_id = $1")
            .bind(flight_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_db_error)
    }

    async fn has_reservation_on_date(&mut self, user_id: i32, date: NaiveDate) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM reservations r
                JOIN flights f ON r.flight_id = f.fid
                WHERE r.customer_id = $1 AND f.flight_date = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)
    }

    async fn insert_reservation(&mut self, user_id: i32, flight_id: i32) -> StoreResult<()> {
        sqlx::query("INSERT INTO reservations (customer_id, flight_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(flight_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn delete_reservation(&mut self, user_id: i32, flight_id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE customer_id = $1 AND flight_id = $2")
            .bind(user_id)
            .bind(flight_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await.map_err(map_db_error)
    }
}
