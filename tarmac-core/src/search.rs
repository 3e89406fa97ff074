use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::models::{Flight, Itinerary};

pub const DEFAULT_SEARCH_LIMIT: usize = 99;

#[derive(Debug, Clone, Deserialize)]
pub struct FlightSearchRequest {
    pub date: NaiveDate,
    pub origin_city: String,
    pub dest_city: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize { DEFAULT_SEARCH_LIMIT }

#[derive(Debug, Serialize)]
pub struct FlightSearchResult {
    pub itineraries: Vec<Itinerary>,
}

/// Orders itineraries by ascending total duration, breaking ties on the
/// flight ids leg by leg, and keeps at most `limit` of them.
pub fn rank_itineraries(mut itineraries: Vec<Itinerary>, limit: usize) -> Vec<Itinerary> {
    itineraries.sort_by(|a, b| {
        a.total_duration()
            .cmp(&b.total_duration())
            .then_with(|| a.flight_ids().cmp(&b.flight_ids()))
    });
    itineraries.truncate(limit);
    itineraries
}

/// Two-step lookup over an in-memory flight table: direct flights on the
/// route, then pairs joined on the connecting city.
pub fn find_itineraries(flights: &[Flight], request: &FlightSearchRequest) -> Vec<Itinerary> {
    let date = request.date;
    let on_date = move || flights.iter().filter(move |f| f.date == date);

    let direct = on_date()
        .filter(|f| f.origin_city == request.origin_city && f.dest_city == request.dest_city)
        .filter_map(|f| Itinerary::new(vec![f.clone()]).ok());

    let one_stop = on_date()
        .filter(|first| first.origin_city == request.origin_city)
        .flat_map(|first| {
            on_date()
                .filter(move |second| {
                    second.dest_city == request.dest_city && second.origin_city == first.dest_city
                })
                .filter_map(move |second| Itinerary::new(vec![first.clone(), second.clone()]).ok())
        });

    rank_itineraries(direct.chain(one_stop).collect(), request.limit)
}
