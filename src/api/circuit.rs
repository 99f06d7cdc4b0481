use crate::api::errors::ApiError;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<DateTime<Utc>>,
    next_attempt: Option<DateTime<Utc>>,
    /// Set while the single HALF_OPEN probe is in flight.
    probe_in_flight: bool,
}

/// Canonical circuit breaker: stops hammering a failing upstream and
/// self-heals through a single probe once the open window elapses.
///
/// `CLOSED --failures>=threshold--> OPEN --timeout--> HALF_OPEN --success--> CLOSED`,
/// `HALF_OPEN --failure--> OPEN`. Shared across concurrently issued requests,
/// so all state sits behind a mutex.
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    threshold: u32,
    timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
                next_attempt: None,
                probe_in_flight: false,
            }),
            threshold: threshold.max(1),
            timeout,
        }
    }

    /// Gate check, run before anything else in the request path. Fails fast
    /// with `CircuitOpen` while the breaker is open; after the open window
    /// has elapsed exactly one caller is admitted as the HALF_OPEN probe.
    /// Returns `true` for that probe caller, which must hand the slot back
    /// via `record_success`, `record_failure`, or `release_probe`.
    pub fn check(&self) -> Result<bool, ApiError> {
        let mut inner = self.inner.lock().expect("circuit breaker poisoned");
        match inner.state {
            CircuitState::Closed => Ok(false),
            CircuitState::Open => {
                let next_attempt = inner.next_attempt.unwrap_or_else(Utc::now);
                if Utc::now() < next_attempt {
                    return Err(ApiError::CircuitOpen(next_attempt));
                }
                info!("circuit breaker half-open, admitting probe");
                inner.state = CircuitState::HalfOpen;
                inner.probe_in_flight = true;
                Ok(true)
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    let next_attempt = inner.next_attempt.unwrap_or_else(Utc::now);
                    Err(ApiError::CircuitOpen(next_attempt))
                } else {
                    inner.probe_in_flight = true;
                    Ok(true)
                }
            }
        }
    }

    /// Hand back an admitted probe slot without recording an outcome, for
    /// requests that leave the pipeline before reaching the transport (cache
    /// hit, rate-limit rejection, coalescing, cancellation). Without this the
    /// breaker would stay HALF_OPEN with a phantom probe forever.
    pub fn release_probe(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker poisoned");
        if inner.state == CircuitState::HalfOpen {
            inner.probe_in_flight = false;
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker poisoned");
        if inner.state != CircuitState::Closed {
            info!("circuit breaker closed after successful probe");
        }
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.next_attempt = None;
        inner.probe_in_flight = false;
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker poisoned");
        inner.failure_count += 1;
        inner.last_failure = Some(Utc::now());
        inner.probe_in_flight = false;

        let should_open = inner.state == CircuitState::HalfOpen
            || inner.failure_count >= self.threshold;
        if should_open {
            let next_attempt =
                Utc::now() + chrono::Duration::from_std(self.timeout).unwrap_or_default();
            if inner.state != CircuitState::Open {
                warn!(
                    failures = inner.failure_count,
                    %next_attempt,
                    "circuit breaker opened"
                );
            }
            inner.state = CircuitState::Open;
            inner.next_attempt = Some(next_attempt);
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().expect("circuit breaker poisoned").state
    }

    pub fn failure_count(&self) -> u32 {
        self.inner
            .lock()
            .expect("circuit breaker poisoned")
            .failure_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(3, Duration::from_millis(50))
    }

    #[test]
    fn test_opens_after_threshold() {
        let cb = breaker();
        for _ in 0..2 {
            cb.check().unwrap();
            cb.record_failure();
        }
        assert_eq!(cb.state(), CircuitState::Closed);
        cb.check().unwrap();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(matches!(cb.check(), Err(ApiError::CircuitOpen(_))));
    }

    #[test]
    fn test_released_probe_slot_readmits_next_caller() {
        let cb = breaker();
        for _ in 0..3 {
            cb.record_failure();
        }
        std::thread::sleep(Duration::from_millis(60));

        // Probe admitted, then abandoned without an outcome.
        assert!(cb.check().unwrap());
        cb.release_probe();

        // The slot is free again; the breaker has not wedged.
        assert!(cb.check().unwrap());
        assert!(matches!(cb.check(), Err(ApiError::CircuitOpen(_))));
    }

    #[test]
    fn test_half_open_admits_exactly_one_probe() {
        let cb = breaker();
        for _ in 0..3 {
            cb.record_failure();
        }
        std::thread::sleep(Duration::from_millis(60));

        assert!(cb.check().is_ok());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        // Concurrent callers during the probe are rejected.
        assert!(matches!(cb.check(), Err(ApiError::CircuitOpen(_))));
        assert!(matches!(cb.check(), Err(ApiError::CircuitOpen(_))));
    }

    #[test]
    fn test_probe_success_closes() {
        let cb = breaker();
        for _ in 0..3 {
            cb.record_failure();
        }
        std::thread::sleep(Duration::from_millis(60));
        cb.check().unwrap();
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
        assert!(cb.check().is_ok());
    }

    #[test]
    fn test_probe_failure_reopens() {
        let cb = breaker();
        for _ in 0..3 {
            cb.record_failure();
        }
        std::thread::sleep(Duration::from_millis(60));
        cb.check().unwrap();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(matches!(cb.check(), Err(ApiError::CircuitOpen(_))));
    }

    #[test]
    fn test_success_resets_failure_streak() {
        let cb = breaker();
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
    }
}
