use crate::entities::{CredibilityScore, ScoreSource};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

/// Whether the on-device model can serve a prompt right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelAvailability {
    No,
    Readily,
    AfterDownload,
}

/// On-device language model collaborator. Opaque: the pipeline hands it a
/// prompt and expects a JSON-encoded verdict back. Anything else (error,
/// garbage, truncation) means the heuristic path takes over.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn availability(&self) -> ModelAvailability;

    async fn prompt(&self, input: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Deserialize)]
struct ModelVerdict {
    score: f64,
    confidence: f64,
    reasoning: String,
}

/// Parse the model's raw output into a score. Models wrap JSON in prose or
/// code fences often enough that we scan for the first balanced object.
/// Returns `None` on any defect; parse failures here are expected, not
/// exceptional.
pub fn parse_model_response(raw: &str) -> Option<CredibilityScore> {
    let json_slice = extract_json_object(raw)?;
    let verdict: ModelVerdict = match serde_json::from_str(json_slice) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "model response not parseable, falling back");
            return None;
        }
    };
    if !verdict.score.is_finite() || !verdict.confidence.is_finite() {
        return None;
    }
    Some(CredibilityScore::new(
        verdict.score.clamp(0.0, 100.0).round() as u8,
        verdict.confidence,
        verdict.reasoning,
        ScoreSource::Ai,
    ))
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in raw[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
