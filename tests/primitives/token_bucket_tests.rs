// tests/primitives/token_bucket_tests.rs

#[cfg(test)]
mod tests {
    use crate::fixtures::test_clock::TestClock;
    use flux_primitives::{TokenBucket, TokenBucketConfig};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    const EPSILON: f64 = 1e-9;

    fn demo_bucket(clock: &TestClock) -> TokenBucket<TestClock> {
        // capacity 5, refill 2 tokens per second
        TokenBucket::with_config(TokenBucketConfig::new(5, 2.0), clock.clone()).unwrap()
    }

    #[test]
    fn burst_then_wait_scenario() {
        let clock = TestClock::new(0.0);
        let bucket = demo_bucket(&clock);

        // Six back-to-back requests: five admitted, the sixth denied
        let results: Vec<bool> = (0..6).map(|_| bucket.allow_request(1).unwrap()).collect();
        assert_eq!(results, [true, true, true, true, true, false]);
        assert_eq!(bucket.current_tokens().unwrap(), 0.0);

        // After 2 seconds the bucket holds 2.0 * 2.0 = 4 tokens
        clock.advance(2.0);
        assert_eq!(clock.now_seconds(), 2.0);
        assert!((bucket.current_tokens().unwrap() - 4.0).abs() < EPSILON);

        assert!(bucket.allow_request(1).unwrap());
        assert!((bucket.current_tokens().unwrap() - 3.0).abs() < EPSILON);
    }

    #[test]
    fn spaced_requests_after_wait() {
        let clock = TestClock::new(0.0);
        let bucket = demo_bucket(&clock);
        for _ in 0..5 {
            assert!(bucket.allow_request(1).unwrap());
        }
        clock.advance(2.0);

        // four requests 400ms apart: each one refills 0.8 tokens
        let mut expected = 4.0;
        for _ in 0..4 {
            assert!(bucket.allow_request(1).unwrap());
            expected -= 1.0;
            assert!((bucket.current_tokens().unwrap() - expected).abs() < EPSILON);
            clock.advance(0.4);
            expected += 0.8;
        }
    }

    #[test]
    fn refill_grows_by_min_of_headroom_and_rate_times_time() {
        let clock = TestClock::new(0.0);
        let bucket = TokenBucket::with_config(TokenBucketConfig::new(10, 3.0), clock.clone())
            .unwrap();
        assert!(bucket.allow_request(8).unwrap());

        let mut previous = bucket.current_tokens().unwrap();
        for step in [0.1, 0.25, 0.5, 1.0, 2.0] {
            clock.advance(step);
            let current = bucket.current_tokens().unwrap();
            let expected_gain = (10.0 - previous).min(3.0 * step);
            assert!((current - previous - expected_gain).abs() < 1e-6);
            assert!(current <= 10.0);
            previous = current;
        }
        assert_eq!(previous, 10.0);
    }

    #[test]
    fn concurrent_callers_admitted_exactly_min_of_balance_and_callers() {
        for (balance, callers) in [(5_u64, 12_usize), (12, 5), (8, 8)] {
            let clock = TestClock::new(0.0);
            let bucket = Arc::new(
                TokenBucket::with_config(TokenBucketConfig::new(balance, 1.0), clock).unwrap(),
            );
            let barrier = Arc::new(Barrier::new(callers));

            let handles: Vec<_> = (0..callers)
                .map(|_| {
                    let bucket = Arc::clone(&bucket);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        bucket.allow_request(1).unwrap()
                    })
                })
                .collect();

            let admitted = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|&allowed| allowed)
                .count();
            assert_eq!(admitted as u64, balance.min(callers as u64));
        }
    }

    #[test]
    fn denied_request_reports_retry_after() {
        let clock = TestClock::new(0.0);
        let bucket = demo_bucket(&clock);
        assert!(bucket.allow_request(5).unwrap());

        let decision = bucket.check_request(1).unwrap();
        assert!(!decision.allowed);
        assert!((decision.retry_after_seconds.unwrap() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn monotonic_clock_refills_in_real_time() {
        let bucket = TokenBucket::new(5, 20.0).unwrap();
        assert!(bucket.allow_request(5).unwrap());
        assert!(!bucket.allow_request(5).unwrap());

        thread::sleep(Duration::from_millis(150));
        let tokens = bucket.current_tokens().unwrap();
        assert!(tokens >= 2.9, "expected about 3 tokens, got {tokens}");
        assert!(tokens <= 5.0);
    }
}
