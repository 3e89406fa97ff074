use chrono::NaiveDate;
use std::sync::Arc;
use tarmac_booking::{BookingError, BookingOutcome, TransactionCoordinator};
use tarmac_core::{BookingConfig, Flight, Itinerary, MemoryStore};

fn march_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn flight(id: i32, date: NaiveDate, origin: &str, dest: &str) -> Flight {
    Flight {
        id,
        date,
        carrier: "JetBlue Airways".to_string(),
        flight_number: format!("B6{}", id),
        origin_city: origin.to_string(),
        dest_city: dest.to_string(),
        duration_minutes: 150,
    }
}

async fn setup(flights: &[Flight]) -> (MemoryStore, TransactionCoordinator) {
    let store = MemoryStore::new();
    for f in flights {
        store.add_flight(f.clone()).await;
    }
    let coordinator = TransactionCoordinator::new(Arc::new(store.clone()), BookingConfig::default());
    (store, coordinator)
}

#[tokio::test]
async fn test_full_flight_is_rejected_without_changes() {
    let f = flight(1, march_first(), "Seattle WA", "Boston MA");
    let (store, coordinator) = setup(&[f.clone()]).await;
    for user in 10..13 {
        store.seed_reservation(user, 1).await;
    }

    let itinerary = Itinerary::new(vec![f]).unwrap();
    let outcome = coordinator.book_itinerary(99, &itinerary).await.unwrap();

    assert_eq!(outcome, BookingOutcome::FlightFull);
    assert_eq!(store.reservation_count(1).await, 3);
}

#[tokio::test]
async fn test_second_booking_on_same_day_is_day_full() {
    let g = flight(1, march_first(), "Seattle WA", "Boston MA");
    let h = flight(2, march_first(), "Portland OR", "Denver CO");
    let (store, coordinator) = setup(&[g, h.clone()]).await;
    store.seed_reservation(7, 1).await;

    let outcome = coordinator
        .book_itinerary(7, &Itinerary::new(vec![h]).unwrap())
        .await
        .unwrap();

    assert_eq!(outcome, BookingOutcome::DayFull);
    assert_eq!(store.reservations().await.len(), 1);
}

#[tokio::test]
async fn test_day_full_takes_precedence_over_flight_full() {
    let g = flight(1, march_first(), "Seattle WA", "Boston MA");
    let h = flight(2, march_first(), "Portland OR", "Denver CO");
    let (store, coordinator) = setup(&[g, h.clone()]).await;
    store.seed_reservation(7, 1).await;
    for user in 10..13 {
        store.seed_reservation(user, 2).await;
    }

    let outcome = coordinator
        .book_itinerary(7, &Itinerary::new(vec![h]).unwrap())
        .await
        .unwrap();

    assert_eq!(outcome, BookingOutcome::DayFull);
}

#[tokio::test]
async fn test_reservation_on_another_day_does_not_block() {
    let earlier = flight(1, march_first().pred_opt().unwrap(), "Seattle WA", "Boston MA");
    let today = flight(2, march_first(), "Boston MA", "Seattle WA");
    let (store, coordinator) = setup(&[earlier, today.clone()]).await;
    store.seed_reservation(7, 1).await;

    let outcome = coordinator
        .book_itinerary(7, &Itinerary::new(vec![today]).unwrap())
        .await
        .unwrap();

    assert_eq!(outcome, BookingOutcome::Booked);
}

#[tokio::test]
async fn test_one_stop_booking_takes_a_seat_on_each_leg() {
    let f1 = flight(1, march_first(), "Seattle WA", "Chicago IL");
    let f2 = flight(2, march_first(), "Chicago IL", "Boston MA");
    let (store, coordinator) = setup(&[f1.clone(), f2.clone()]).await;
    store.seed_reservation(20, 1).await;
    store.seed_reservation(21, 2).await;
    store.seed_reservation(22, 2).await;

    let itinerary = Itinerary::for_date(march_first(), vec![f1, f2]).unwrap();
    let outcome = coordinator.book_itinerary(7, &itinerary).await.unwrap();

    assert_eq!(outcome, BookingOutcome::Booked);
    assert_eq!(store.reservation_count(1).await, 2);
    assert_eq!(store.reservation_count(2).await, 3);
}

#[tokio::test]
async fn test_full_second_leg_leaves_no_rows_for_either_leg() {
    let f1 = flight(1, march_first(), "Seattle WA", "Chicago IL");
    let f2 = flight(2, march_first(), "Chicago IL", "Boston MA");
    let (store, coordinator) = setup(&[f1.clone(), f2.clone()]).await;
    for user in 10..13 {
        store.seed_reservation(user, 2).await;
    }

    let outcome = coordinator
        .book_itinerary(7, &Itinerary::new(vec![f1, f2]).unwrap())
        .await
        .unwrap();

    assert_eq!(outcome, BookingOutcome::FlightFull);
    assert_eq!(store.reservation_count(1).await, 0);
    assert_eq!(store.reservation_count(2).await, 3);
}

#[tokio::test]
async fn test_storage_failure_on_second_leg_rolls_back_the_first() {
    let f1 = flight(1, march_first(), "Seattle WA", "Chicago IL");
    let f2 = flight(2, march_first(), "Chicago IL", "Boston MA");
    let (store, coordinator) = setup(&[f1.clone(), f2.clone()]).await;
    store.fail_inserts_for(2).await;

    let result = coordinator
        .book_itinerary(7, &Itinerary::new(vec![f1, f2]).unwrap())
        .await;

    assert!(matches!(result, Err(BookingError::Store(_))));
    assert!(store.reservations().await.is_empty());
}

#[tokio::test]
async fn test_rejected_attempt_leaks_nothing_to_the_next_booker() {
    let f1 = flight(1, march_first(), "Seattle WA", "Chicago IL");
    let f2 = flight(2, march_first(), "Chicago IL", "Boston MA");
    let (store, coordinator) = setup(&[f1.clone(), f2.clone()]).await;
    store.seed_reservation(20, 1).await;
    store.seed_reservation(21, 1).await;
    for user in 30..33 {
        store.seed_reservation(user, 2).await;
    }

    let one_stop = Itinerary::new(vec![f1.clone(), f2]).unwrap();
    assert_eq!(
        coordinator.book_itinerary(7, &one_stop).await.unwrap(),
        BookingOutcome::FlightFull
    );

    // The last seat on leg 1 is still there for someone else.
    let direct = Itinerary::new(vec![f1]).unwrap();
    assert_eq!(
        coordinator.book_itinerary(8, &direct).await.unwrap(),
        BookingOutcome::Booked
    );
    assert_eq!(store.reservation_count(1).await, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_for_the_last_seat_books_exactly_one() {
    let f = flight(1, march_first(), "Seattle WA", "Boston MA");
    let (store, coordinator) = setup(&[f.clone()]).await;
    store.seed_reservation(10, 1).await;
    store.seed_reservation(11, 1).await;

    let itinerary = Itinerary::new(vec![f]).unwrap();
    let first = {
        let (c, i) = (coordinator.clone(), itinerary.clone());
        tokio::spawn(async move { c.book_itinerary(1, &i).await })
    };
    let second = {
        let (c, i) = (coordinator.clone(), itinerary.clone());
        tokio::spawn(async move { c.book_itinerary(2, &i).await })
    };

    let mut outcomes = vec![
        first.await.unwrap().unwrap(),
        second.await.unwrap().unwrap(),
    ];
    outcomes.sort_by_key(|o| *o != BookingOutcome::Booked);

    assert_eq!(outcomes, vec![BookingOutcome::Booked, BookingOutcome::FlightFull]);
    assert_eq!(store.reservation_count(1).await, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_bookers_never_exceed_capacity() {
    let f = flight(1, march_first(), "Seattle WA", "Boston MA");
    let (store, coordinator) = setup(&[f.clone()]).await;
    let itinerary = Itinerary::new(vec![f]).unwrap();

    let handles: Vec<_> = (0..16)
        .map(|user| {
            let (c, i) = (coordinator.clone(), itinerary.clone());
            tokio::spawn(async move { c.book_itinerary(user, &i).await })
        })
        .collect();

    let mut booked = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() == BookingOutcome::Booked {
            booked += 1;
        }
    }

    assert_eq!(booked, 3);
    assert_eq!(store.reservation_count(1).await, 3);
}

#[tokio::test]
async fn test_cancelling_twice_is_a_no_op() {
    let f1 = flight(1, march_first(), "Seattle WA", "Chicago IL");
    let f2 = flight(2, march_first(), "Chicago IL", "Boston MA");
    let (store, coordinator) = setup(&[f1.clone(), f2.clone()]).await;
    store.seed_reservation(20, 1).await;
    store.seed_reservation(21, 2).await;
    store.seed_reservation(22, 2).await;

    let legs = vec![f1, f2];
    let itinerary = Itinerary::new(legs.clone()).unwrap();
    assert_eq!(
        coordinator.book_itinerary(7, &itinerary).await.unwrap(),
        BookingOutcome::Booked
    );

    coordinator.cancel_itinerary(7, &legs).await.unwrap();
    assert_eq!(store.reservation_count(1).await, 1);
    assert_eq!(store.reservation_count(2).await, 2);

    coordinator.cancel_itinerary(7, &legs).await.unwrap();
    assert_eq!(store.reservations().await.len(), 3);
}

#[tokio::test]
async fn test_cancelling_frees_the_day_for_a_new_booking() {
    let morning = flight(1, march_first(), "Seattle WA", "Boston MA");
    let evening = flight(2, march_first(), "Seattle WA", "Boston MA");
    let (store, coordinator) = setup(&[morning.clone(), evening.clone()]).await;

    let first = Itinerary::new(vec![morning.clone()]).unwrap();
    let second = Itinerary::new(vec![evening]).unwrap();

    assert_eq!(coordinator.book_itinerary(7, &first).await.unwrap(), BookingOutcome::Booked);
    assert_eq!(coordinator.book_itinerary(7, &second).await.unwrap(), BookingOutcome::DayFull);

    coordinator.cancel_itinerary(7, &[morning]).await.unwrap();
    assert_eq!(coordinator.book_itinerary(7, &second).await.unwrap(), BookingOutcome::Booked);
    assert_eq!(store.reservation_count(2).await, 1);
}
