use tarmac_booking::{BookingOutcome, BookingResult, TransactionCoordinator};
use tarmac_core::Itinerary;
use tracing::warn;

use crate::state::RetryPolicy;

/// Re-runs the whole check-and-write sequence while the store reports
/// serialization conflicts, up to `policy.max_attempts` tries in total.
pub async fn book_with_retry(
    coordinator: &TransactionCoordinator,
    user_id: i32,
    itinerary: &Itinerary,
    policy: RetryPolicy,
) -> BookingResult<BookingOutcome> {
    let mut attempt = 1;
    loop {
        match coordinator.book_itinerary(user_id, itinerary).await {
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                warn!(user_id, attempt, "Booking conflicted, retrying: {}", e);
                tokio::time::sleep(policy.backoff * attempt).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
