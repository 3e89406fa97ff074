use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tarmac_api::{app, state::{AppState, AuthConfig, RetryPolicy}};
use tarmac_booking::TransactionCoordinator;
use tarmac_core::ReservationStore;
use tarmac_store::{DbClient, PgFlightRepository, PgReservationStore, PgUserRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tarmac_api=debug,tarmac_booking=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = tarmac_store::app_config::Config::load().context("Failed to load config")?;
    tracing::info!("Starting Tarmac API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let reservations: Arc<dyn ReservationStore> = Arc::new(PgReservationStore::new(db.pool.clone()));
    let rules = config.booking.rules();
    tracing::info!(
        capacity_limit = rules.capacity_limit,
        isolation = %rules.isolation,
        "Booking rules loaded"
    );

    let app_state = AppState {
        users: Arc::new(PgUserRepository::new(db.pool.clone())),
        flights: Arc::new(PgFlightRepository::new(db.pool.clone())),
        coordinator: TransactionCoordinator::new(reservations.clone(), rules),
        reservations,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        retry: RetryPolicy {
            max_attempts: config.booking.max_attempts,
            backoff: Duration::from_millis(config.booking.retry_backoff_ms),
        },
        search_limit: config.search.limit,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    db.close().await;
    Ok(())
}
