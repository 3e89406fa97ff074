use std::sync::Arc;
use std::time::Duration;
use tarmac_booking::TransactionCoordinator;
use tarmac_core::search::DEFAULT_SEARCH_LIMIT;
use tarmac_core::{BookingConfig, FlightRepository, MemoryStore, ReservationStore, UserRepository};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

/// How often a booking request is re-run after a serialization conflict
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(50),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub flights: Arc<dyn FlightRepository>,
    pub reservations: Arc<dyn ReservationStore>,
    pub coordinator: TransactionCoordinator,
    pub auth: AuthConfig,
    pub retry: RetryPolicy,
    pub search_limit: usize,
}

impl AppState {
    /// Everything backed by one in-process store
    pub fn in_memory(store: MemoryStore, rules: BookingConfig, auth: AuthConfig) -> Self {
        let reservations: Arc<dyn ReservationStore> = Arc::new(store.clone());
        Self {
            users: Arc::new(store.clone()),
            flights: Arc::new(store),
            coordinator: TransactionCoordinator::new(reservations.clone(), rules),
            reservations,
            auth,
            retry: RetryPolicy::default(),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}
