use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tarmac_core::search::{FlightSearchRequest, FlightSearchResult};
use tracing::info;
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub date: NaiveDate,
    pub origin_city: String,
    pub dest_city: String,
    pub limit: Option<usize>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/flights/search", get(search_flights))
}

async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<FlightSearchResult>, AppError> {
    let limit = params
        .limit
        .map_or(state.search_limit, |l| l.min(state.search_limit));

    let request = FlightSearchRequest {
        date: params.date,
        origin_city: params.origin_city,
        dest_city: params.dest_city,
        limit,
    };

    let itineraries = state.flights.search(&request).await?;
    info!(
        "Search {} -> {} on {}: {} itineraries",
        request.origin_city,
        request.dest_city,
        request.date,
        itineraries.len()
    );

    Ok(Json(FlightSearchResult { itineraries }))
}
