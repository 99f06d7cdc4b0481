use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Cross-context messaging collaborator (extension background worker in
/// production). Fire-and-forget: callers must treat a send failure as
/// non-fatal and never let it propagate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, payload: Value) -> anyhow::Result<Value>;
}

/// Sink that accepts and discards everything. Default for contexts with no
/// background worker attached.
pub struct NullSink;

#[async_trait]
impl MessageSink for NullSink {
    async fn send(&self, payload: Value) -> anyhow::Result<Value> {
        debug!(?payload, "message dropped by null sink");
        Ok(Value::Null)
    }
}
