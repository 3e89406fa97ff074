use chrono::NaiveDate;
use tarmac_core::{ReservationTx, StoreResult};

/// Evaluates the per-user daily limit and per-flight capacity against the
/// state visible inside the caller's transaction.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintChecker {
    capacity_limit: u32,
}

impl ConstraintChecker {
    pub fn new(capacity_limit: u32) -> Self {
        Self { capacity_limit }
    }

    /// True iff the user holds no reservation on a flight departing on `date`
    pub async fn check_day_available(
        &self,
        tx: &mut dyn ReservationTx,
        user_id: i32,
        date: NaiveDate,
    ) -> StoreResult<bool> {
        Ok(!tx.has_reservation_on_date(user_id, date).await?)
    }

    /// True iff the flight holds strictly fewer reservations than the limit
    pub async fn check_flight_capacity(
        &self,
        tx: &mut dyn ReservationTx,
        flight_id: i32,
    ) -> StoreResult<bool> {
        let booked = tx.count_reservations_on_flight(flight_id).await?;
        Ok(booked < i64::from(self.capacity_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarmac_core::{Flight, IsolationLevel, MemoryStore, ReservationStore};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .add_flight(Flight {
                id: 1,
                date: day(),
                carrier: "Delta Air Lines Inc.".into(),
                flight_number: "DL100".into(),
                origin_city: "Seattle WA".into(),
                dest_city: "Boston MA".into(),
                duration_minutes: 300,
            })
            .await;
        store
    }

    #[tokio::test]
    async fn test_capacity_is_strictly_below_limit() {
        let store = store().await;
        store.seed_reservation(10, 1).await;
        store.seed_reservation(11, 1).await;

        let checker = ConstraintChecker::new(3);
        let mut tx = store.begin(IsolationLevel::Serializable).await.unwrap();
        assert!(checker.check_flight_capacity(tx.as_mut(), 1).await.unwrap());
        tx.insert_reservation(12, 1).await.unwrap();
        assert!(!checker.check_flight_capacity(tx.as_mut(), 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_capacity_is_always_full() {
        let store = store().await;
        let checker = ConstraintChecker::new(0);
        let mut tx = store.begin(IsolationLevel::Serializable).await.unwrap();
        assert!(!checker.check_flight_capacity(tx.as_mut(), 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_day_check_looks_only_at_that_user_and_date() {
        let store = store().await;
        store.seed_reservation(10, 1).await;

        let checker = ConstraintChecker::new(3);
        let mut tx = store.begin(IsolationLevel::Serializable).await.unwrap();
        assert!(!checker.check_day_available(tx.as_mut(), 10, day()).await.unwrap());
        assert!(checker.check_day_available(tx.as_mut(), 11, day()).await.unwrap());
        assert!(checker
            .check_day_available(tx.as_mut(), 10, day().succ_opt().unwrap())
            .await
            .unwrap());
    }
}
