use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::config::IsolationLevel;
use crate::models::{Flight, Itinerary, Reservation, User};
use crate::repository::{FlightRepository, ReservationStore, ReservationTx, UserRepository};
use crate::search::{find_itineraries, FlightSearchRequest};
use crate::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<(User, String)>,
    flights: BTreeMap<i32, Flight>,
    reservations: BTreeSet<Reservation>,
    failing_inserts: BTreeSet<i32>,
}

/// In-process store backing tests and local runs.
///
/// A transaction holds the whole state lock from `begin` until it is
/// committed, rolled back or dropped, so transactions execute one after
/// another. That is a valid (if blunt) serializable schedule for every
/// isolation level requested.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: User, password: &str) {
        self.state.lock().await.users.push((user, password.to_string()));
    }

    pub async fn add_flight(&self, flight: Flight) {
        self.state.lock().await.flights.insert(flight.id, flight);
    }

    /// Writes a reservation row outside of any booking transaction
    pub async fn seed_reservation(&self, user_id: i32, flight_id: i32) {
        self.state
            .lock()
            .await
            .reservations
            .insert(Reservation { user_id, flight_id });
    }

    pub async fn reservations(&self) -> Vec<Reservation> {
        self.state.lock().await.reservations.iter().copied().collect()
    }

    pub async fn reservation_count(&self, flight_id: i32) -> usize {
        self.state
            .lock()
            .await
            .reservations
            .iter()
            .filter(|r| r.flight_id == flight_id)
            .count()
    }

    /// Every later insert for `flight_id` fails with a backend error
    pub async fn fail_inserts_for(&self, flight_id: i32) {
        self.state.lock().await.failing_inserts.insert(flight_id);
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: BTreeSet<Reservation>,
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn begin(&self, isolation: IsolationLevel) -> StoreResult<Box<dyn ReservationTx>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.reservations.clone();
        debug!(%isolation, "Memory transaction started");
        Ok(Box::new(MemoryTx { guard, staged }))
    }

    async fn list_reservations(&self, user_id: i32) -> StoreResult<Vec<Flight>> {
        let state = self.state.lock().await;
        let mut flights: Vec<Flight> = state
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| state.flights.get(&r.flight_id).cloned())
            .collect();
        flights.sort_by_key(|f| (f.date, f.id));
        Ok(flights)
    }
}

#[async_trait]
impl ReservationTx for MemoryTx {
    async fn count_reservations_on_flight(&mut self, flight_id: i32) -> StoreResult<i64> {
        Ok(self.staged.iter().filter(|r| r.flight_id == flight_id).count() as i64)
    }

    async fn has_reservation_on_date(&mut self, user_id: i32, date: NaiveDate) -> StoreResult<bool> {
        let flights = &self.guard.flights;
        Ok(self.staged.iter().any(|r| {
            r.user_id == user_id && flights.get(&r.flight_id).is_some_and(|f| f.date == date)
        }))
    }

    async fn insert_reservation(&mut self, user_id: i32, flight_id: i32) -> StoreResult<()> {
        if self.guard.failing_inserts.contains(&flight_id) {
            return Err(StoreError::Backend(format!(
                "injected failure inserting reservation on flight {}",
                flight_id
            )));
        }
        if !self.guard.flights.contains_key(&flight_id) {
            return Err(StoreError::Constraint(format!("flight {} does not exist", flight_id)));
        }
        if !self.staged.insert(Reservation { user_id, flight_id }) {
            return Err(StoreError::Constraint(format!(
                "user {} already holds flight {}",
                user_id, flight_id
            )));
        }
        Ok(())
    }

    async fn delete_reservation(&mut self, user_id: i32, flight_id: i32) -> StoreResult<bool> {
        Ok(self.staged.remove(&Reservation { user_id, flight_id }))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, staged } = *self;
        guard.reservations = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl FlightRepository for MemoryStore {
    async fn search(&self, request: &FlightSearchRequest) -> StoreResult<Vec<Itinerary>> {
        let state = self.state.lock().await;
        let flights: Vec<Flight> = state.flights.values().cloned().collect();
        Ok(find_itineraries(&flights, request))
    }

    async fn get_flights(&self, ids: &[i32]) -> StoreResult<Vec<Flight>> {
        let state = self.state.lock().await;
        Ok(ids.iter().filter_map(|id| state.flights.get(id).cloned()).collect())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn log_in(&self, handle: &str, password: &str) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|(user, secret)| user.handle == handle && secret == password)
            .map(|(user, _)| user.clone()))
    }
}
