pub mod attempt;
pub mod checker;
pub mod executor;
pub mod coordinator;

pub use attempt::{BookingAttempt, BookingPhase, Rejection};
pub use checker::ConstraintChecker;
pub use coordinator::TransactionCoordinator;
pub use executor::BookingExecutor;

use serde::Serialize;
use tarmac_core::{ItineraryError, StoreError};

/// Result of a booking attempt that reached a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingOutcome {
    Booked,
    /// The user already holds a reservation on that date
    DayFull,
    /// At least one leg is at capacity
    FlightFull,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid itinerary: {0}")]
    InvalidItinerary(#[from] ItineraryError),

    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid booking phase transition from {from} to {to}")]
    InvalidTransition {
        from: String,
        to: String,
    },
}

impl BookingError {
    /// True when re-running the whole attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Store(e) if e.is_retryable())
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
