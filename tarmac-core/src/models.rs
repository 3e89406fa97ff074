use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An authenticated customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub handle: String,
    pub full_name: String,
}

/// A scheduled flight leg. Reference data, never mutated by bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub id: i32,
    pub date: NaiveDate,
    pub carrier: String,
    pub flight_number: String,
    pub origin_city: String,
    pub dest_city: String,
    pub duration_minutes: i32,
}

/// A (user, flight) pair. Unique per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reservation {
    pub user_id: i32,
    pub flight_id: i32,
}

pub const MAX_LEGS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItineraryError {
    #[error("Itinerary has no legs")]
    Empty,
    #[error("Itinerary has {0} legs, at most 2 are allowed")]
    TooManyLegs(usize),
    #[error("Leg {flight_id} departs on {actual}, expected {expected}")]
    DateMismatch {
        flight_id: i32,
        expected: NaiveDate,
        actual: NaiveDate,
    },
    #[error("Leg {from} arrives in {arrives} but leg {to} departs from {departs}")]
    Disconnected {
        from: i32,
        to: i32,
        arrives: String,
        departs: String,
    },
    #[error("Flight {0} appears more than once")]
    DuplicateLeg(i32),
}

/// One or two legs flown on a single day.
///
/// Construction validates the shape, so every `Itinerary` in circulation is
/// non-empty, single-date and connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Itinerary {
    legs: Vec<Flight>,
}

impl Itinerary {
    pub fn new(legs: Vec<Flight>) -> Result<Self, ItineraryError> {
        let date = legs.first().ok_or(ItineraryError::Empty)?.date;
        Self::for_date(date, legs)
    }

    /// Like [`Itinerary::new`], but every leg must depart on `date`.
    pub fn for_date(date: NaiveDate, legs: Vec<Flight>) -> Result<Self, ItineraryError> {
        if legs.is_empty() {
            return Err(ItineraryError::Empty);
        }
        if legs.len() > MAX_LEGS {
            return Err(ItineraryError::TooManyLegs(legs.len()));
        }

        let mut seen = BTreeSet::new();
        for leg in &legs {
            if leg.date != date {
                return Err(ItineraryError::DateMismatch {
                    flight_id: leg.id,
                    expected: date,
                    actual: leg.date,
                });
            }
            if !seen.insert(leg.id) {
                return Err(ItineraryError::DuplicateLeg(leg.id));
            }
        }

        for pair in legs.windows(2) {
            if pair[0].dest_city != pair[1].origin_city {
                return Err(ItineraryError::Disconnected {
                    from: pair[0].id,
                    to: pair[1].id,
                    arrives: pair[0].dest_city.clone(),
                    departs: pair[1].origin_city.clone(),
                });
            }
        }

        Ok(Self { legs })
    }

    pub fn legs(&self) -> &[Flight] {
        &self.legs
    }

    pub fn flight_ids(&self) -> Vec<i32> {
        self.legs.iter().map(|f| f.id).collect()
    }

    /// Travel date of the first leg
    pub fn date(&self) -> NaiveDate {
        self.legs[0].date
    }

    /// Distinct departure dates, ascending
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.legs
            .iter()
            .map(|f| f.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn total_duration(&self) -> i32 {
        self.legs.iter().map(|f| f.duration_minutes).sum()
    }

    pub fn is_direct(&self) -> bool {
        self.legs.len() == 1
    }
}

#[cfg(test)]
pub(crate) fn flight(id: i32, date: NaiveDate, origin: &str, dest: &str, duration: i32) -> Flight {
    Flight {
        id,
        date,
        carrier: "Alaska Airlines Inc.".to_string(),
        flight_number: format!("AS{}", id),
        origin_city: origin.to_string(),
        dest_city: dest.to_string(),
        duration_minutes: duration,
    }
}
