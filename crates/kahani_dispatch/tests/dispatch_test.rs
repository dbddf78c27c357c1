use kahani_dispatch::{DispatchReport, Dispatcher, parallel_map};
use kahani_error::DispatchErrorKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Deterministic scrambled delay so later items often finish first.
fn delay_for(index: usize) -> Duration {
    Duration::from_millis(((index * 7919) % 23) as u64 * 3)
}

#[tokio::test]
async fn test_outputs_ordered_by_index_under_random_delays() {
    let items: Vec<usize> = (0..40).collect();
    let outcomes = parallel_map(items, 8, |index, item| async move {
        tokio::time::sleep(delay_for(index)).await;
        Ok::<_, String>(item * 2)
    })
    .await;

    assert_eq!(outcomes.len(), 40);
    for (position, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.index, position);
        assert_eq!(outcome.result.as_ref().ok(), Some(&(position * 2)));
    }
}

#[tokio::test]
async fn test_one_transport_error_stays_at_its_index() {
    let items = vec!["a", "b", "c", "d", "e"];
    let outcomes = parallel_map(items, 3, |index, item| async move {
        tokio::time::sleep(delay_for(index)).await;
        if index == 2 {
            Err(format!("connection reset while sending {item}"))
        } else {
            Ok(item.to_uppercase())
        }
    })
    .await;

    assert_eq!(outcomes.len(), 5);
    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 4);

    let failed = &outcomes[2];
    let error = failed.result.as_ref().unwrap_err();
    assert_eq!(error.index, 2);
    assert!(matches!(&error.kind, DispatchErrorKind::Unit(msg) if msg.contains("connection reset")));

    assert_eq!(outcomes[4].result.as_ref().ok().map(String::as_str), Some("E"));

    let report = DispatchReport::from_outcomes(&outcomes);
    assert_eq!(*report.succeeded(), 4);
    assert_eq!(report.failures().len(), 1);
}

#[tokio::test]
async fn test_concurrency_never_exceeds_cap() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let outcomes = parallel_map((0..20).collect::<Vec<_>>(), 3, |_, _| {
        let in_flight = in_flight.clone();
        let peak = peak.clone();
        async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok::<_, String>(())
        }
    })
    .await;

    assert_eq!(outcomes.len(), 20);
    assert!(peak.load(Ordering::SeqCst) <= 3);
    assert!(peak.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_timeout_only_affects_slow_item() {
    let dispatcher = Dispatcher::new(4).with_timeout(Duration::from_millis(50));
    let outcomes = dispatcher
        .run(vec![10u64, 500, 10], |_, millis| async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Ok::<_, String>(millis)
        })
        .await;

    assert!(outcomes[0].is_ok());
    assert!(matches!(
        outcomes[1].result.as_ref().unwrap_err().kind,
        DispatchErrorKind::Timeout(50)
    ));
    assert!(outcomes[2].is_ok());
}

#[tokio::test]
async fn test_panicking_item_is_isolated() {
    let outcomes = parallel_map(vec![1, 2, 3], 2, |index, n| async move {
        if index == 1 {
            panic!("unit exploded");
        }
        Ok::<_, String>(n)
    })
    .await;

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        &outcomes[1].result.as_ref().unwrap_err().kind,
        DispatchErrorKind::Panicked(msg) if msg == "unit exploded"
    ));
    assert_eq!(outcomes[2].result.as_ref().ok(), Some(&3));
}

#[tokio::test]
async fn test_empty_input_and_paced_dispatch() {
    let outcomes = parallel_map(Vec::<u8>::new(), 5, |_, n| async move { Ok::<_, String>(n) }).await;
    assert!(outcomes.is_empty());

    let dispatcher = Dispatcher::new(2).with_requests_per_minute(6000);
    let outcomes = dispatcher
        .run(vec![1, 2, 3], |_, n| async move { Ok::<_, String>(n + 1) })
        .await;
    let values: Vec<_> = outcomes.into_iter().filter_map(|o| o.ok()).collect();
    assert_eq!(values, vec![2, 3, 4]);
}
