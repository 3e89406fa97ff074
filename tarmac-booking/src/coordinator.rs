use std::sync::Arc;
use tarmac_core::{BookingConfig, Flight, Itinerary, ReservationStore, ReservationTx};
use tracing::{info, warn};

use crate::attempt::{BookingAttempt, BookingPhase, Rejection};
use crate::checker::ConstraintChecker;
use crate::executor::BookingExecutor;
use crate::{BookingError, BookingOutcome, BookingResult};

/// Runs each booking or cancellation inside exactly one store transaction.
///
/// The coordinator holds no locks of its own. Concurrent bookers are kept
/// apart solely by the isolation level the store provides, and a
/// serialization conflict is surfaced to the caller rather than retried here.
#[derive(Clone)]
pub struct TransactionCoordinator {
    store: Arc<dyn ReservationStore>,
    config: BookingConfig,
    checker: ConstraintChecker,
    executor: BookingExecutor,
}

impl TransactionCoordinator {
    pub fn new(store: Arc<dyn ReservationStore>, config: BookingConfig) -> Self {
        Self {
            store,
            checker: ConstraintChecker::new(config.capacity_limit),
            executor: BookingExecutor::new(),
            config,
        }
    }

    /// Reserve every leg of the itinerary for the user, or none of them.
    ///
    /// Day availability is checked for all dates before capacity is checked
    /// for any leg, so `DayFull` wins when both would apply.
    pub async fn book_itinerary(
        &self,
        user_id: i32,
        itinerary: &Itinerary,
    ) -> BookingResult<BookingOutcome> {
        let mut attempt = BookingAttempt::new(user_id);
        let flight_ids = itinerary.flight_ids();

        let mut tx = self.store.begin(self.config.isolation).await?;

        match self.check_and_stage(tx.as_mut(), &mut attempt, user_id, itinerary).await {
            Ok(None) => {
                if let Err(e) = tx.commit().await {
                    attempt.advance(BookingPhase::Aborted)?;
                    warn!(user_id, ?flight_ids, error = %e, "Booking commit failed");
                    return Err(e.into());
                }
                attempt.advance(BookingPhase::Committed)?;
                info!(user_id, ?flight_ids, "Itinerary booked");
                Ok(BookingOutcome::Booked)
            }
            Ok(Some(rejection)) => {
                if let Err(e) = tx.rollback().await {
                    attempt.advance(BookingPhase::Aborted)?;
                    warn!(user_id, ?flight_ids, error = %e, "Rollback of rejected booking failed");
                    return Err(e.into());
                }
                attempt.advance(BookingPhase::RolledBack(rejection))?;
                let outcome = BookingOutcome::from(rejection);
                info!(user_id, ?flight_ids, ?outcome, "Booking rejected");
                Ok(outcome)
            }
            Err(e) => {
                abort(tx, user_id).await;
                if !attempt.phase().is_terminal() {
                    attempt.advance(BookingPhase::Aborted)?;
                }
                warn!(user_id, ?flight_ids, error = %e, "Booking aborted");
                Err(e)
            }
        }
    }

    /// Returns `None` once every row is staged, or the rejection that stopped it.
    async fn check_and_stage(
        &self,
        tx: &mut dyn ReservationTx,
        attempt: &mut BookingAttempt,
        user_id: i32,
        itinerary: &Itinerary,
    ) -> BookingResult<Option<Rejection>> {
        attempt.advance(BookingPhase::CheckingDay)?;
        for date in itinerary.dates() {
            if !self.checker.check_day_available(tx, user_id, date).await? {
                return Ok(Some(Rejection::DayFull));
            }
        }

        attempt.advance(BookingPhase::CheckingCapacity)?;
        for leg in itinerary.legs() {
            if !self.checker.check_flight_capacity(tx, leg.id).await? {
                return Ok(Some(Rejection::FlightFull));
            }
        }

        attempt.advance(BookingPhase::Writing)?;
        self.executor
            .insert_reservations(tx, user_id, &itinerary.flight_ids())
            .await?;
        Ok(None)
    }

    /// Remove the user's reservations on the given flights.
    ///
    /// Flights the user does not hold are skipped, so repeating a
    /// cancellation succeeds without changing anything.
    pub async fn cancel_itinerary(&self, user_id: i32, flights: &[Flight]) -> BookingResult<()> {
        let flight_ids: Vec<i32> = flights.iter().map(|f| f.id).collect();
        let mut tx = self.store.begin(self.config.isolation).await?;

        match self
            .executor
            .delete_reservations(tx.as_mut(), user_id, &flight_ids)
            .await
        {
            Ok(removed) => {
                tx.commit().await?;
                info!(user_id, ?flight_ids, removed, "Itinerary cancelled");
                Ok(())
            }
            Err(e) => {
                abort(tx, user_id).await;
                warn!(user_id, ?flight_ids, error = %e, "Cancellation aborted");
                Err(BookingError::from(e))
            }
        }
    }
}

async fn abort(tx: Box<dyn ReservationTx>, user_id: i32) {
    if let Err(e) = tx.rollback().await {
        warn!(user_id, error = %e, "Rollback after failure did not complete");
    }
}
