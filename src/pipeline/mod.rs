pub mod heuristics;
pub mod model;

pub use model::{LanguageModel, ModelAvailability, parse_model_response};

use crate::api::{ApiError, ApiRequest, ResilientClient};
use crate::consent::ConsentGate;
use crate::entities::{CredibilityScore, ScoreSource};
use crate::text::{EmojiAnalysis, SocialTextEntities, analyze_emojis, detect_language, parse_social_text};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

const MODEL_PROMPT_PREAMBLE: &str = "Assess the credibility of the following web content. \
Respond with a JSON object: {\"score\": 0-100, \"confidence\": 0.0-1.0, \"reasoning\": \"...\"}.";

/// Raw page content handed in by the extraction layer.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub url: Option<String>,
    pub text: String,
}

/// Signals derived from the page before any scoring path runs.
#[derive(Debug, Clone)]
pub struct ContentFeatures {
    pub url: Option<String>,
    pub entities: SocialTextEntities,
    pub emoji: EmojiAnalysis,
    pub language: Option<String>,
}

impl ContentFeatures {
    pub fn from_content(content: &PageContent) -> Self {
        let parsed = parse_social_text(&content.text);
        Self {
            url: content.url.clone(),
            entities: parsed.entities,
            emoji: analyze_emojis(&content.text),
            language: detect_language(&content.text),
        }
    }
}

/// Orchestrates the scoring paths: on-device model first, heuristic fallback,
/// then optional external corroboration behind the consent gate. Always
/// produces a score; "no answer" is not a terminal state.
pub struct CredibilityPipeline {
    model: Option<Arc<dyn LanguageModel>>,
    client: Option<Arc<ResilientClient>>,
    consent: Arc<ConsentGate>,
}

impl CredibilityPipeline {
    pub fn new(
        model: Option<Arc<dyn LanguageModel>>,
        client: Option<Arc<ResilientClient>>,
        consent: Arc<ConsentGate>,
    ) -> Self {
        Self {
            model,
            client,
            consent,
        }
    }

    pub async fn analyze(&self, content: &PageContent) -> CredibilityScore {
        self.analyze_with_cancel(content, &CancellationToken::new())
            .await
    }

    /// Cancellable so a page navigation can abandon an in-progress analysis.
    #[instrument(skip_all, fields(url = content.url.as_deref().unwrap_or("-")))]
    pub async fn analyze_with_cancel(
        &self,
        content: &PageContent,
        cancel: &CancellationToken,
    ) -> CredibilityScore {
        let features = ContentFeatures::from_content(content);

        let mut score = match self.model_score(content, cancel).await {
            Some(score) => score,
            None => heuristics::heuristic_score(&features),
        };

        if let Some(corroborated) = self.corroborate(content, &score, cancel).await {
            score = corroborated;
        }

        info!(
            score = score.score,
            source = ?score.source,
            confidence = score.confidence,
            "analysis complete"
        );
        score
    }

    /// Model path. Any failure here (unavailable, error, unparseable output)
    /// is expected and quietly yields `None`.
    async fn model_score(
        &self,
        content: &PageContent,
        cancel: &CancellationToken,
    ) -> Option<CredibilityScore> {
        let model = self.model.as_ref()?;
        match model.availability().await {
            ModelAvailability::Readily => {}
            availability => {
                debug!(?availability, "model not ready, using heuristics");
                return None;
            }
        }

        let prompt = format!(
            "{MODEL_PROMPT_PREAMBLE}\n\nSource: {}\n\nContent:\n{}",
            content.url.as_deref().unwrap_or("unknown"),
            content.text
        );

        let raw = tokio::select! {
            _ = cancel.cancelled() => return None,
            result = model.prompt(&prompt) => match result {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(error = %e, "model prompt failed, using heuristics");
                    return None;
                }
            }
        };
        parse_model_response(&raw)
    }

    /// External fact-check corroboration. Runs only with a configured client
    /// and valid consent; the local score survives any failure here.
    async fn corroborate(
        &self,
        content: &PageContent,
        local: &CredibilityScore,
        cancel: &CancellationToken,
    ) -> Option<CredibilityScore> {
        let client = self.client.as_ref()?;
        let url = content.url.as_deref()?;

        match self.consent.has_valid_consent().await {
            Ok(true) => {}
            Ok(false) => {
                debug!("external corroboration skipped, no valid consent");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "consent lookup failed, skipping external call");
                return None;
            }
        }

        let request = ApiRequest::post(
            "/v1/check",
            serde_json::json!({
                "url": url,
                "local_score": local.score,
            }),
        );
        let response = match client.request_with_cancel(request, cancel).await {
            Ok(response) => response,
            Err(ApiError::ConsentDenied) | Err(ApiError::Cancelled) => return None,
            Err(e) => {
                warn!(error = %e, "fact-check call failed, keeping local score");
                return None;
            }
        };

        let api_score = response.data.get("score")?.as_f64()?;
        let api_confidence = response
            .data
            .get("confidence")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.7);
        let reasoning = response
            .data
            .get("reasoning")
            .and_then(|v| v.as_str())
            .unwrap_or("corroborated by external fact-check source")
            .to_string();

        // Blend rather than replace: the external source refines the local
        // verdict in proportion to its confidence.
        let blended =
            local.score as f64 * (1.0 - api_confidence * 0.5) + api_score * api_confidence * 0.5;
        Some(CredibilityScore::new(
            blended.clamp(0.0, 100.0).round() as u8,
            local.confidence.max(api_confidence),
            reasoning,
            ScoreSource::Api,
        ))
    }
}
