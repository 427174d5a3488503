//! Backoff strategies for the publisher, notification dispatcher, and
//! reminder scheduler.
//!
//! Deliberately deterministic: jitter is a function of the attempt number,
//! not an RNG draw, so retry timing is reproducible in tests.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the delay before a retry attempt grows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetryStrategy {
    Exponential {
        base_ms: u64,
        max_ms: u64,
        multiplier: f64,
        jitter: bool,
    },
    Linear {
        delay_ms: u64,
        max_ms: u64,
    },
    Constant {
        delay_ms: u64,
    },
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::Exponential {
            base_ms: 100,
            max_ms: 30_000,
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryStrategy {
    /// Delay to wait before `attempt` (1-indexed: the first retry is attempt 1).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let millis = match *self {
            Self::Exponential {
                base_ms,
                max_ms,
                multiplier,
                jitter,
            } => {
                let raw = (base_ms as f64) * multiplier.powi(attempt.saturating_sub(1) as i32);
                let capped = raw.min(max_ms as f64);
                if jitter {
                    capped * jitter_factor(attempt)
                } else {
                    capped
                }
            }
            Self::Linear { delay_ms, max_ms } => {
                ((delay_ms as f64) * f64::from(attempt)).min(max_ms as f64)
            }
            Self::Constant { delay_ms } => delay_ms as f64,
        };
        Duration::from_millis(millis.round() as u64)
    }
}

/// Deterministic jitter multiplier: `1.0 + 0.1 * (attempt % 5)`, so retries
/// spread out without needing a random source.
fn jitter_factor(attempt: u32) -> f64 {
    1.0 + 0.1 * f64::from(attempt % 5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_grows_and_caps() {
        let strategy = RetryStrategy::Exponential {
            base_ms: 100,
            max_ms: 1_000,
            multiplier: 2.0,
            jitter: false,
        };
        assert_eq!(strategy.delay_for(1), Duration::from_millis(100));
        assert_eq!(strategy.delay_for(2), Duration::from_millis(200));
        assert_eq!(strategy.delay_for(3), Duration::from_millis(400));
        assert_eq!(strategy.delay_for(10), Duration::from_millis(1_000));
    }

    #[test]
    fn exponential_jitter_is_deterministic() {
        let strategy = RetryStrategy::Exponential {
            base_ms: 100,
            max_ms: 30_000,
            multiplier: 2.0,
            jitter: true,
        };
        let a = strategy.delay_for(2);
        let b = strategy.delay_for(2);
        assert_eq!(a, b);
        let without_jitter = RetryStrategy::Exponential {
            base_ms: 100,
            max_ms: 30_000,
            multiplier: 2.0,
            jitter: false,
        };
        assert!(a > without_jitter.delay_for(2));
    }

    #[test]
    fn linear_caps_at_max() {
        let strategy = RetryStrategy::Linear {
            delay_ms: 100,
            max_ms: 250,
        };
        assert_eq!(strategy.delay_for(1), Duration::from_millis(100));
        assert_eq!(strategy.delay_for(2), Duration::from_millis(200));
        assert_eq!(strategy.delay_for(5), Duration::from_millis(250));
    }

    #[test]
    fn constant_is_always_the_same() {
        let strategy = RetryStrategy::Constant { delay_ms: 50 };
        assert_eq!(strategy.delay_for(1), strategy.delay_for(100));
    }

    #[test]
    fn default_is_exponential_with_standard_bounds() {
        let default = RetryStrategy::default();
        match default {
            RetryStrategy::Exponential {
                base_ms,
                max_ms,
                multiplier,
                jitter,
            } => {
                assert_eq!(base_ms, 100);
                assert_eq!(max_ms, 30_000);
                assert!((multiplier - 2.0).abs() < f64::EPSILON);
                assert!(jitter);
            }
            _ => panic!("default strategy should be exponential"),
        }
    }

    #[test]
    fn serde_roundtrip() {
        let strategy = RetryStrategy::default();
        let json = serde_json::to_string(&strategy).unwrap();
        let back: RetryStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, strategy);
    }
}
