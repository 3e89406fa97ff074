use tarmac_core::{ReservationTx, StoreResult};

/// Stages reservation writes inside the caller's transaction.
///
/// Nothing here commits. If any write fails the caller drops or rolls back
/// the transaction and none of the rows survive.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingExecutor;

impl BookingExecutor {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_reservations(
        &self,
        tx: &mut dyn ReservationTx,
        user_id: i32,
        flight_ids: &[i32],
    ) -> StoreResult<()> {
        for &flight_id in flight_ids {
            tx.insert_reservation(user_id, flight_id).await?;
        }
        Ok(())
    }

    /// Removes whichever of the rows exist. Returns how many were removed.
    pub async fn delete_reservations(
        &self,
        tx: &mut dyn ReservationTx,
        user_id: i32,
        flight_ids: &[i32],
    ) -> StoreResult<usize> {
        let mut removed = 0;
        for &flight_id in flight_ids {
            if tx.delete_reservation(user_id, flight_id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
