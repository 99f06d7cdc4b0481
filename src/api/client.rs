use crate::api::cache::{ResponseCache, cache_key};
use crate::api::circuit::CircuitBreaker;
use crate::api::errors::ApiError;
use crate::api::privacy::{PrivacyFilter, apply_filters};
use crate::api::rate_limit::SlidingWindowRateLimiter;
use crate::api::types::{ApiRequest, ApiResponse};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Raw transport capability injected at construction, so every resilience
/// layer above it is testable without network I/O.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Tunables for one client instance. Mirrors the knobs a deployment actually
/// changes; everything has a working default.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub circuit_breaker_threshold: u32,
    pub circuit_breaker_timeout: Duration,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub privacy_mode: Vec<PrivacyFilter>,
    pub requests_per_minute: u32,
    pub requests_per_hour: u32,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            circuit_breaker_threshold: 5,
            circuit_breaker_timeout: Duration::from_secs(60),
            cache_enabled: true,
            cache_ttl: Duration::from_secs(300),
            cache_max_entries: 100,
            privacy_mode: vec![PrivacyFilter::DomainOnly],
            requests_per_minute: 10,
            requests_per_hour: 100,
        }
    }
}

type SharedResult = Result<ApiResponse, ApiError>;

/// Resilient API client wrapping an injected transport with, in order:
/// circuit breaker, sliding-window rate limiting, TTL cache, in-flight
/// request coalescing, and an exponential-backoff retry loop with a privacy
/// transform on every outgoing body.
pub struct ResilientClient {
    config: ApiClientConfig,
    transport: Arc<dyn Transport>,
    breaker: CircuitBreaker,
    limiter: SlidingWindowRateLimiter,
    cache: ResponseCache,
    in_flight: DashMap<String, watch::Receiver<Option<SharedResult>>>,
}

impl ResilientClient {
    pub fn new(config: ApiClientConfig, transport: Arc<dyn Transport>) -> Self {
        let breaker = CircuitBreaker::new(
            config.circuit_breaker_threshold,
            config.circuit_breaker_timeout,
        );
        let limiter =
            SlidingWindowRateLimiter::new(config.requests_per_minute, config.requests_per_hour);
        let cache = ResponseCache::new(config.cache_ttl, config.cache_max_entries);
        Self {
            config,
            transport,
            breaker,
            limiter,
            cache,
            in_flight: DashMap::new(),
        }
    }

    pub async fn request(&self, request: ApiRequest) -> SharedResult {
        self.request_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// The orchestration contract, in fixed order: breaker gate, rate gate,
    /// cache check, in-flight coalescing, then the retry loop.
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    pub async fn request_with_cancel(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> SharedResult {
        let is_probe = self.breaker.check()?;

        if let Err(e) = self.limiter.check_and_record() {
            if is_probe {
                self.breaker.release_probe();
            }
            return Err(e);
        }

        let key = cache_key(&request);
        let use_cache = self.config.cache_enabled && !request.skip_cache;
        if use_cache {
            if let Some(hit) = self.cache.get(&key) {
                if is_probe {
                    self.breaker.release_probe();
                }
                debug!("cache hit");
                return Ok(hit);
            }
        }

        // Coalesce identical concurrent requests: one leader executes, every
        // follower waits on the leader's broadcast result.
        let tx = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                let rx = entry.get().clone();
                drop(entry);
                if is_probe {
                    self.breaker.release_probe();
                }
                debug!("coalescing onto in-flight request");
                return await_leader(rx, cancel).await;
            }
            Entry::Vacant(entry) => {
                let (tx, rx) = watch::channel(None);
                entry.insert(rx);
                tx
            }
        };

        let result = self.execute_with_retries(&request, cancel).await;

        match &result {
            Ok(response) => {
                if use_cache {
                    self.cache.put(key.clone(), response);
                }
                self.breaker.record_success();
            }
            Err(ApiError::Cancelled) => {
                // A cancelled attempt says nothing about upstream health.
                if is_probe {
                    self.breaker.release_probe();
                }
            }
            Err(_) => self.breaker.record_failure(),
        }

        self.in_flight.remove(&key);
        let _ = tx.send(Some(result.clone()));
        result
    }

    /// Up to `max_retries + 1` attempts with additive-jitter exponential
    /// backoff between retryable failures. The privacy transform runs on the
    /// outgoing body; the original request is never mutated.
    async fn execute_with_retries(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> SharedResult {
        let outgoing = self.prepare(request)?;

        let mut last_error = ApiError::Network("no attempt made".to_string());
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.config.retry_delay, attempt - 1);
                debug!(attempt, ?delay, "backing off before retry");
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ApiError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            let attempt_result = tokio::select! {
                _ = cancel.cancelled() => return Err(ApiError::Cancelled),
                result = tokio::time::timeout(self.config.timeout, self.transport.execute(&outgoing)) => {
                    match result {
                        Ok(inner) => inner,
                        // The timeout drops the transport future, aborting
                        // the underlying call rather than abandoning it.
                        Err(_) => Err(ApiError::Timeout(self.config.timeout)),
                    }
                }
            };

            match attempt_result {
                Ok(response) => return Ok(response),
                Err(e) if e.should_retry() => {
                    warn!(attempt, error = %e, "attempt failed, will retry");
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error)
    }

    /// Resolve the URL against the base and apply privacy filters to the body.
    fn prepare(&self, request: &ApiRequest) -> Result<ApiRequest, ApiError> {
        let mut outgoing = request.clone();

        if !outgoing.url.contains("://") {
            let base = url::Url::parse(&self.config.base_url)
                .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.config.base_url)))?;
            outgoing.url = base
                .join(&outgoing.url)
                .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", outgoing.url)))?
                .to_string();
        }

        let mut filters = self.config.privacy_mode.clone();
        for filter in &request.privacy {
            if !filters.contains(filter) {
                filters.push(*filter);
            }
        }
        if let Some(body) = outgoing.body.as_mut() {
            apply_filters(body, &filters);
        }
        Ok(outgoing)
    }

    pub fn circuit_state(&self) -> crate::api::circuit::CircuitState {
        self.breaker.state()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

async fn await_leader(
    mut rx: watch::Receiver<Option<SharedResult>>,
    cancel: &CancellationToken,
) -> SharedResult {
    loop {
        if let Some(result) = rx.borrow().as_ref() {
            return result.clone();
        }
        tokio::select! {
            _ = cancel.cancelled() => return Err(ApiError::Cancelled),
            changed = rx.changed() => {
                if changed.is_err() {
                    // Leader dropped without publishing; treat as transport loss.
                    return Err(ApiError::Network("coalesced request abandoned".to_string()));
                }
            }
        }
    }
}

/// `retry_delay * 2^attempt` plus additive jitter of at most 10%, so
/// synchronized clients do not produce retry storms. Jitter never shortens
/// the delay.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exp = base.saturating_mul(2u32.saturating_pow(attempt.min(16)));
    let jitter = exp.mul_f64(rand::thread_rng().gen_range(0.0..=0.1));
    exp + jitter
}
