pub mod app_config;
pub mod database;
pub mod flight_repo;
pub mod reservation_repo;
pub mod user_repo;

pub use database::DbClient;
pub use flight_repo::PgFlightRepository;
pub use reservation_repo::PgReservationStore;
pub use user_repo::PgUserRepository;
