use std::fmt;
use tracing::debug;

use crate::{BookingError, BookingOutcome};

/// Why a booking attempt was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    DayFull,
    FlightFull,
}

impl From<Rejection> for BookingOutcome {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::DayFull => BookingOutcome::DayFull,
            Rejection::FlightFull => BookingOutcome::FlightFull,
        }
    }
}

/// Lifecycle of a single booking attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingPhase {
    Started,
    CheckingDay,
    CheckingCapacity,
    Writing,
    Committed,
    RolledBack(Rejection),
    /// A storage failure ended the attempt
    Aborted,
}

impl BookingPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingPhase::Committed | BookingPhase::RolledBack(_) | BookingPhase::Aborted
        )
    }

    fn can_move_to(&self, next: BookingPhase) -> bool {
        use BookingPhase::*;
        match (self, next) {
            (Started, CheckingDay) => true,
            (CheckingDay, CheckingCapacity) => true,
            (CheckingDay, RolledBack(Rejection::DayFull)) => true,
            (CheckingCapacity, Writing) => true,
            (CheckingCapacity, RolledBack(Rejection::FlightFull)) => true,
            (Writing, Committed) => true,
            (current, Aborted) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for BookingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingPhase::Started => f.write_str("STARTED"),
            BookingPhase::CheckingDay => f.write_str("CHECKING_DAY"),
            BookingPhase::CheckingCapacity => f.write_str("CHECKING_CAPACITY"),
            BookingPhase::Writing => f.write_str("WRITING"),
            BookingPhase::Committed => f.write_str("COMMITTED"),
            BookingPhase::RolledBack(Rejection::DayFull) => f.write_str("ROLLED_BACK(DAY_FULL)"),
            BookingPhase::RolledBack(Rejection::FlightFull) => f.write_str("ROLLED_BACK(FLIGHT_FULL)"),
            BookingPhase::Aborted => f.write_str("ABORTED"),
        }
    }
}

/// Tracks one booking attempt through its phases. Phases only move forward.
#[derive(Debug)]
pub struct BookingAttempt {
    user_id: i32,
    phase: BookingPhase,
}

impl BookingAttempt {
    pub fn new(user_id: i32) -> Self {
        Self {
            user_id,
            phase: BookingPhase::Started,
        }
    }

    pub fn phase(&self) -> BookingPhase {
        self.phase
    }

    pub fn advance(&mut self, next: BookingPhase) -> Result<(), BookingError> {
        if !self.phase.can_move_to(next) {
            return Err(BookingError::InvalidTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        debug!(user_id = self.user_id, from = %self.phase, to = %next, "Booking phase transition");
        self.phase = next;
        Ok(())
    }
}
