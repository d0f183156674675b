// tests/primitives/config_tests.rs

#[cfg(test)]
mod tests {
    use crate::fixtures::test_clock::TestClock;
    use flux_primitives::{TokenBucket, TokenBucketConfig, TokenBucketError};

    #[test]
    fn config_rejects_zero_capacity() {
        let config = TokenBucketConfig::new(0, 1.0);
        let result = config.validate();
        assert!(matches!(result, Err(TokenBucketError::InvalidCapacity)));
    }

    #[test]
    fn config_rejects_zero_rate() {
        let config = TokenBucketConfig::new(5, 0.0);
        let result = config.validate();
        assert!(matches!(
            result,
            Err(TokenBucketError::InvalidRefillRate { rate }) if rate == 0.0
        ));
    }

    #[test]
    fn config_rejects_negative_rate() {
        let config = TokenBucketConfig::new(5, -2.0);
        assert!(matches!(
            config.validate(),
            Err(TokenBucketError::InvalidRefillRate { .. })
        ));
    }

    #[test]
    fn config_accepts_valid_parameters() {
        let config = TokenBucketConfig::new(5, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_accepts_fractional_rate() {
        let config = TokenBucketConfig::new(1, 0.25);
        assert!(config.validate().is_ok());
    }

    // Test config builder pattern
    #[test]
    fn config_builder_pattern_works() {
        let config = TokenBucketConfig::new(0, 0.0).capacity(5).refill_rate(2.0);
        assert!(config.validate().is_ok());

        let clock = TestClock::new(0.0);
        let bucket = TokenBucket::with_config(config, clock).unwrap();
        assert_eq!(bucket.capacity(), 5);
        assert_eq!(bucket.refill_rate(), 2.0);
    }

    #[test]
    fn constructor_with_invalid_config_fails() {
        let clock = TestClock::new(0.0);
        let config = TokenBucketConfig::new(5, f64::NAN);
        let result = TokenBucket::with_config(config, clock);
        assert!(matches!(
            result,
            Err(TokenBucketError::InvalidRefillRate { .. })
        ));
    }
}
