use anyhow::Result;
use credo::{
    config::Config,
    consent::{ConsentData, ConsentGate},
    messaging::NullSink,
    pipeline::{CredibilityPipeline, PageContent},
    storage::MemoryStore,
};
use std::sync::Arc;

/// Score a URL plus a snippet of text from the command line. Without a local
/// model or fact-check service configured this exercises the heuristic path.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    tracing::debug!(base_url = config.factcheck_base_url(), "configured");

    let mut args = std::env::args().skip(1);
    let url = args.next();
    let text = args.next().unwrap_or_default();

    let store = Arc::new(MemoryStore::new());
    let consent = Arc::new(ConsentGate::new(store, Arc::new(NullSink)));
    if std::env::var("GRANT_CONSENT").is_ok() {
        consent.request_consent(ConsentData::granted()).await?;
    }

    let pipeline = CredibilityPipeline::new(None, None, consent);
    let content = PageContent { url, text };
    let score = pipeline.analyze(&content).await;

    println!("{}", serde_json::to_string_pretty(&score)?);
    Ok(())
}
