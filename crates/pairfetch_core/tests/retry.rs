use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pairfetch_core::{FailureKind, FetchError, RetryPolicy, Single};
use pretty_assertions::assert_eq;
use tokio::runtime::Handle;
use tokio::time::Instant;

/// Source that fails every time and records when each attempt started.
fn always_failing(attempts: Arc<Mutex<Vec<Instant>>>) -> Single<String> {
    Single::new(move || {
        let attempts = attempts.clone();
        async move {
            attempts.lock().unwrap().push(Instant::now());
            Err(FetchError::new(FailureKind::Transport, "connection refused"))
        }
    })
}

fn gaps(attempts: &[Instant]) -> Vec<Duration> {
    attempts.windows(2).map(|w| w[1] - w[0]).collect()
}

/// The paused clock jumps to timer ticks, so allow a millisecond of slack.
fn assert_gaps(attempts: &[Instant], expected: &[Duration]) {
    let actual = gaps(attempts);
    assert_eq!(actual.len(), expected.len(), "gaps: {actual:?}");
    for (got, want) in actual.iter().zip(expected) {
        assert!(
            *got >= *want && *got <= *want + Duration::from_millis(1),
            "expected {want:?}, got {got:?}"
        );
    }
}

#[test]
fn delay_follows_initial_times_multiplier_power() {
    let doubling = RetryPolicy::new(3, Duration::from_secs(2), 2.0);
    assert_eq!(doubling.delay_for(0), Duration::from_secs(2));
    assert_eq!(doubling.delay_for(1), Duration::from_secs(4));
    assert_eq!(doubling.delay_for(2), Duration::from_secs(8));

    let constant = RetryPolicy::new(3, Duration::from_secs(2), 1.0);
    assert_eq!(constant.delay_for(0), Duration::from_secs(2));
    assert_eq!(constant.delay_for(5), Duration::from_secs(2));
}

#[test]
fn delay_saturates_and_tolerates_bad_multipliers() {
    let huge = RetryPolicy::new(100, Duration::from_secs(1), 10.0);
    assert_eq!(huge.delay_for(400), Duration::MAX);

    let negative = RetryPolicy::new(1, Duration::from_secs(1), -3.0);
    assert_eq!(negative.delay_for(1), Duration::ZERO);

    let nan = RetryPolicy::new(1, Duration::from_secs(1), f64::NAN);
    assert_eq!(nan.delay_for(1), Duration::ZERO);
}

#[test]
fn zero_initial_delay_stays_zero_for_any_multiplier() {
    let infinite = RetryPolicy::new(3, Duration::ZERO, f64::INFINITY);
    assert_eq!(infinite.delay_for(0), Duration::ZERO);
    assert_eq!(infinite.delay_for(1), Duration::ZERO);
    assert_eq!(infinite.delay_for(50), Duration::ZERO);

    let growing = RetryPolicy::new(3, Duration::ZERO, 2.0);
    assert_eq!(growing.delay_for(1000), Duration::ZERO);
}

#[test]
fn infinite_multiplier_saturates_a_real_delay() {
    let policy = RetryPolicy::new(3, Duration::from_millis(1), f64::INFINITY);
    assert_eq!(policy.delay_for(0), Duration::from_millis(1));
    assert_eq!(policy.delay_for(1), Duration::MAX);
}

#[test]
fn default_policy_matches_shipped_configuration() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.initial_delay, Duration::from_secs(2));
    assert_eq!(policy.multiplier, 1.0);
}

#[tokio::test(start_paused = true)]
async fn three_retries_mean_four_attempts_with_constant_delay() {
    let attempts = Arc::new(Mutex::new(Vec::new()));
    let single = always_failing(attempts.clone())
        .retry(RetryPolicy::new(3, Duration::from_secs(2), 1.0));

    let err = single.run().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Transport);

    let attempts = attempts.lock().unwrap();
    assert_eq!(attempts.len(), 4);
    assert_gaps(&attempts, &[Duration::from_secs(2); 3]);
}

#[tokio::test(start_paused = true)]
async fn delays_grow_with_multiplier() {
    let attempts = Arc::new(Mutex::new(Vec::new()));
    let single = always_failing(attempts.clone())
        .retry(RetryPolicy::new(3, Duration::from_secs(2), 2.0));

    single.run().await.unwrap_err();

    let attempts = attempts.lock().unwrap();
    assert_eq!(attempts.len(), 4);
    assert_gaps(
        &attempts,
        &[
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8),
        ],
    );
}

#[tokio::test(start_paused = true)]
async fn zero_attempts_is_pass_through() {
    let attempts = Arc::new(Mutex::new(Vec::new()));
    let single = always_failing(attempts.clone()).retry(RetryPolicy::none());

    let start = Instant::now();
    single.run().await.unwrap_err();
    assert_eq!(attempts.lock().unwrap().len(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn stops_retrying_after_success() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let flaky = Single::new(move || {
        let call = counted.fetch_add(1, Ordering::SeqCst);
        async move {
            if call < 2 {
                Err(FetchError::new(FailureKind::InvalidStatus(503), "busy"))
            } else {
                Ok(format!("attempt {call}"))
            }
        }
    });

    let value = flaky
        .retry(RetryPolicy::new(5, Duration::from_millis(100), 2.0))
        .run()
        .await
        .unwrap();
    assert_eq!(value, "attempt 2");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn last_error_is_forwarded_unchanged() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let source = Single::<String>::new(move || {
        let call = counted.fetch_add(1, Ordering::SeqCst);
        async move {
            Err(FetchError::new(
                FailureKind::InvalidStatus(500 + call as u16),
                "nope",
            ))
        }
    });

    let err = source
        .retry(RetryPolicy::new(2, Duration::from_millis(10), 1.0))
        .run()
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::new(FailureKind::InvalidStatus(502), "nope"));
}

#[tokio::test(start_paused = true)]
async fn each_subscription_gets_its_own_counter() {
    let attempts = Arc::new(Mutex::new(Vec::new()));
    let single = always_failing(attempts.clone())
        .retry(RetryPolicy::new(1, Duration::from_millis(10), 1.0));

    single.run().await.unwrap_err();
    single.run().await.unwrap_err();
    assert_eq!(attempts.lock().unwrap().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn cancelling_during_backoff_stops_further_attempts() {
    let attempts = Arc::new(Mutex::new(Vec::new()));
    let single = always_failing(attempts.clone())
        .retry(RetryPolicy::new(3, Duration::from_secs(2), 1.0));

    let fired = Arc::new(AtomicUsize::new(0));
    let fired_in_callback = fired.clone();
    let subscription = single.subscribe_on(&Handle::current(), move |_| {
        fired_in_callback.fetch_add(1, Ordering::SeqCst);
    });

    // First attempt has failed and the first backoff timer is pending.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(attempts.lock().unwrap().len(), 1);

    subscription.cancel();
    assert!(subscription.is_cancelled());
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(attempts.lock().unwrap().len(), 1);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
