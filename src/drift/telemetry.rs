use crate::messaging::MessageSink;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

const MAX_QUEUE_LEN: usize = 256;
const BATCH_SIZE: usize = 20;
const FLUSH_INTERVAL: Duration = Duration::from_secs(300);

/// One selector-drift observation: which strategies were tried and which
/// (if any) succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftEvent {
    pub platform: String,
    pub content_type: String,
    pub attempted_strategies: Vec<String>,
    pub successful_strategy: Option<String>,
    pub fallback_used: bool,
    pub detection_time_ms: u64,
    pub at: DateTime<Utc>,
}

/// Batching queue for drift events. Bounded: under sustained sink failure the
/// oldest events are dropped rather than growing without limit.
pub struct DriftTelemetry {
    queue: Mutex<VecDeque<DriftEvent>>,
    dropped: AtomicU64,
    flush_signal: Notify,
    sink: Arc<dyn MessageSink>,
}

impl DriftTelemetry {
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            dropped: AtomicU64::new(0),
            flush_signal: Notify::new(),
            sink,
        }
    }

    /// Enqueue an event. Never blocks and never fails; a full queue drops its
    /// oldest entry to make room.
    pub fn record(&self, event: DriftEvent) {
        let mut queue = self.queue.lock().expect("telemetry queue poisoned");
        if queue.len() >= MAX_QUEUE_LEN {
            queue.pop_front();
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(dropped, "drift telemetry queue full, dropping oldest event");
        }
        queue.push_back(event);
        if queue.len() >= BATCH_SIZE {
            self.flush_signal.notify_one();
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().expect("telemetry queue poisoned").len()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Send one batch to the sink. On failure the batch goes back to the
    /// front of the queue so nothing is lost to a transient outage.
    pub async fn flush(&self) {
        let batch: Vec<DriftEvent> = {
            let mut queue = self.queue.lock().expect("telemetry queue poisoned");
            let take = queue.len().min(BATCH_SIZE);
            queue.drain(..take).collect()
        };
        if batch.is_empty() {
            return;
        }

        let payload = json!({
            "kind": "selector-drift",
            "batch_id": Uuid::new_v4().to_string(),
            "events": &batch,
        });

        match self.sink.send(payload).await {
            Ok(_) => debug!(count = batch.len(), "flushed drift telemetry batch"),
            Err(e) => {
                warn!(error = %e, count = batch.len(), "telemetry send failed, re-queuing batch");
                let mut queue = self.queue.lock().expect("telemetry queue poisoned");
                for event in batch.into_iter().rev() {
                    if queue.len() >= MAX_QUEUE_LEN {
                        break;
                    }
                    queue.push_front(event);
                }
            }
        }
    }

    /// Periodic flush loop: every five minutes, or sooner once a full batch
    /// accumulates. Drains the queue on shutdown.
    pub async fn run_flush_loop(self: Arc<Self>, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(FLUSH_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("telemetry flush loop shutting down");
                    while self.pending() > 0 {
                        let before = self.pending();
                        self.flush().await;
                        if self.pending() >= before {
                            // Sink is down; final batch is lost by design.
                            break;
                        }
                    }
                    return;
                }
                _ = interval.tick() => self.flush().await,
                _ = self.flush_signal.notified() => self.flush().await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;

    struct RecordingSink {
        sent: Mutex<Vec<Value>>,
        fail: AtomicBool,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        async fn send(&self, payload: Value) -> anyhow::Result<Value> {
            if self.fail.load(Ordering::Relaxed) {
                anyhow::bail!("sink offline");
            }
            self.sent.lock().unwrap().push(payload);
            Ok(Value::Null)
        }
    }

    fn event() -> DriftEvent {
        DriftEvent {
            platform: "twitter".into(),
            content_type: "post".into(),
            attempted_strategies: vec!["a".into()],
            successful_strategy: None,
            fallback_used: true,
            detection_time_ms: 3,
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_flush_sends_batch() {
        let sink = Arc::new(RecordingSink::new());
        let telemetry = DriftTelemetry::new(sink.clone());
        for _ in 0..3 {
            telemetry.record(event());
        }
        telemetry.flush().await;
        assert_eq!(telemetry.pending(), 0);
        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["events"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_flush_requeues() {
        let sink = Arc::new(RecordingSink::new());
        sink.fail.store(true, Ordering::Relaxed);
        let telemetry = DriftTelemetry::new(sink.clone());
        for _ in 0..5 {
            telemetry.record(event());
        }
        telemetry.flush().await;
        assert_eq!(telemetry.pending(), 5);

        sink.fail.store(false, Ordering::Relaxed);
        telemetry.flush().await;
        assert_eq!(telemetry.pending(), 0);
    }

    #[tokio::test]
    async fn test_queue_is_bounded() {
        let telemetry = DriftTelemetry::new(Arc::new(RecordingSink::new()));
        for _ in 0..(MAX_QUEUE_LEN + 10) {
            telemetry.record(event());
        }
        assert_eq!(telemetry.pending(), MAX_QUEUE_LEN);
        assert_eq!(telemetry.dropped(), 10);
    }
}
