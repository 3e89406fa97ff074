use async_trait::async_trait;
use chrono::NaiveDate;
use crate::config::IsolationLevel;
use crate::models::{Flight, Itinerary, User};
use crate::search::FlightSearchRequest;
use crate::StoreResult;

/// Transactional access to the reservation table
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Open a transaction at the given isolation level.
    ///
    /// The returned handle owns the transaction until `commit` or `rollback`
    /// consumes it. Dropping it without either discards every staged write.
    async fn begin(&self, isolation: IsolationLevel) -> StoreResult<Box<dyn ReservationTx>>;

    /// Flights currently reserved by the user, by date then flight id
    async fn list_reservations(&self, user_id: i32) -> StoreResult<Vec<Flight>>;
}

/// Point operations available inside an open transaction
#[async_trait]
pub trait ReservationTx: Send {
    async fn count_reservations_on_flight(&mut self, flight_id: i32) -> StoreResult<i64>;

    async fn has_reservation_on_date(&mut self, user_id: i32, date: NaiveDate) -> StoreResult<bool>;

    async fn insert_reservation(&mut self, user_id: i32, flight_id: i32) -> StoreResult<()>;

    /// Returns whether a row was removed
    async fn delete_reservation(&mut self, user_id: i32, flight_id: i32) -> StoreResult<bool>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Read-only flight lookups
#[async_trait]
pub trait FlightRepository: Send + Sync {
    /// Direct and one-stop itineraries, ranked by total duration then flight ids
    async fn search(&self, request: &FlightSearchRequest) -> StoreResult<Vec<Itinerary>>;

    /// Flights with the given ids, in the order requested. Unknown ids are skipped.
    async fn get_flights(&self, ids: &[i32]) -> StoreResult<Vec<Flight>>;
}

/// Credential verification
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn log_in(&self, handle: &str, password: &str) -> StoreResult<Option<User>>;
}
