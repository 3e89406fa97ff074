use axum::{
    extract::{Extension, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tarmac_booking::{BookingError, BookingOutcome};
use tarmac_core::{Flight, Itinerary};
use tracing::info;

use crate::error::AppError;
use crate::middleware::auth::{customer_auth_middleware, CustomerClaims};
use crate::retry::book_with_retry;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub flight_ids: Vec<i32>,
    /// Travel date every leg must depart on. Defaults to the first leg's date.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub outcome: BookingOutcome,
    pub flight_ids: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub flight_ids: Vec<i32>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/reservations", get(list_reservations).post(book_reservation))
        .route("/v1/reservations/cancel", post(cancel_reservation))
        .route_layer(middleware::from_fn_with_state(state, customer_auth_middleware))
}

/// GET /v1/reservations
async fn list_reservations(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<Vec<Flight>>, AppError> {
    let user_id = claims.user_id()?;
    let flights = state.reservations.list_reservations(user_id).await?;
    Ok(Json(flights))
}

/// POST /v1/reservations
/// Business rejections (DAY_FULL, FLIGHT_FULL) are answered with 200 and the outcome.
async fn book_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<BookRequest>,
) -> Result<Json<BookResponse>, AppError> {
    let user_id = claims.user_id()?;
    let legs = load_flights(&state, &req.flight_ids).await?;

    let itinerary = match req.date {
        Some(date) => Itinerary::for_date(date, legs),
        None => Itinerary::new(legs),
    }
    .map_err(BookingError::from)?;

    let outcome = book_with_retry(&state.coordinator, user_id, &itinerary, state.retry).await?;
    info!(user_id, ?outcome, "Booking request finished");

    Ok(Json(BookResponse {
        outcome,
        flight_ids: itinerary.flight_ids(),
    }))
}

/// POST /v1/reservations/cancel
async fn cancel_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<CancelRequest>,
) -> Result<StatusCode, AppError> {
    let user_id = claims.user_id()?;
    let flights = state.flights.get_flights(&req.flight_ids).await?;
    state.coordinator.cancel_itinerary(user_id, &flights).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load_flights(state: &AppState, ids: &[i32]) -> Result<Vec<Flight>, AppError> {
    let flights = state.flights.get_flights(ids).await?;
    if let Some(missing) = ids.iter().find(|id| !flights.iter().any(|f| f.id == **id)) {
        return Err(AppError::NotFoundError(format!("Flight {} not found", missing)));
    }
    Ok(flights)
}
