use crate::api::errors::ApiError;
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::warn;

/// Client-side sliding-window rate limiter over two windows (per-minute and
/// per-hour). Checked before any network use: a request rejected here never
/// reaches the transport. One timestamp deque serves both windows; entries
/// older than an hour are pruned on every check.
pub struct SlidingWindowRateLimiter {
    timestamps: Mutex<VecDeque<DateTime<Utc>>>,
    per_minute: u32,
    per_hour: u32,
}

impl SlidingWindowRateLimiter {
    pub fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            timestamps: Mutex::new(VecDeque::new()),
            per_minute,
            per_hour,
        }
    }

    /// Admit and record the request, or reject with a retryable error.
    pub fn check_and_record(&self) -> Result<(), ApiError> {
        let now = Utc::now();
        let mut timestamps = self.timestamps.lock().expect("rate limiter poisoned");

        let hour_ago = now - Duration::hours(1);
        while timestamps.front().is_some_and(|&t| t < hour_ago) {
            timestamps.pop_front();
        }

        if timestamps.len() as u32 >= self.per_hour {
            warn!(limit = self.per_hour, "hourly rate limit reached");
            return Err(ApiError::RateLimited(format!(
                "{} requests in the last hour",
                timestamps.len()
            )));
        }

        let minute_ago = now - Duration::minutes(1);
        let in_last_minute = timestamps.iter().rev().take_while(|&&t| t >= minute_ago).count();
        if in_last_minute as u32 >= self.per_minute {
            warn!(limit = self.per_minute, "per-minute rate limit reached");
            return Err(ApiError::RateLimited(format!(
                "{in_last_minute} requests in the last minute"
            )));
        }

        timestamps.push_back(now);
        Ok(())
    }

    pub fn in_flight_window_len(&self) -> usize {
        self.timestamps.lock().expect("rate limiter poisoned").len()
    }
}
