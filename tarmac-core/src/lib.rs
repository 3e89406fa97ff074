pub mod models;
pub mod repository;
pub mod search;
pub mod config;
pub mod memory;

pub use config::{BookingConfig, IsolationLevel};
pub use memory::MemoryStore;
pub use models::{Flight, Itinerary, ItineraryError, Reservation, User};
pub use repository::{FlightRepository, ReservationStore, ReservationTx, UserRepository};

/// Failures raised by a store implementation.
///
/// Every variant is fatal to the transaction it occurred in. Only
/// serialization conflicts are worth re-running from the start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Serialization conflict: {0}")]
    SerializationConflict(String),
    #[error("Storage constraint violated: {0}")]
    Constraint(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::SerializationConflict(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
