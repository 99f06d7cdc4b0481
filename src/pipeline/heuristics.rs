use crate::domain::validate_domain;
use crate::entities::{CredibilityScore, ScoreSource};
use crate::pipeline::ContentFeatures;

const EXCESSIVE_HASHTAGS: usize = 5;
const EXCESSIVE_EMOJI_DENSITY: f64 = 0.2;
const STRONG_NEGATIVE_SENTIMENT: f64 = -0.8;

/// Domain-trust-driven scoring used when the model path is unavailable or
/// returns garbage. Deterministic and explainable: trust maps to score, and
/// shallow content signals nudge it downward.
pub fn heuristic_score(features: &ContentFeatures) -> CredibilityScore {
    let Some(url) = &features.url else {
        return CredibilityScore::unknown("no source URL available for heuristic scoring");
    };

    let validation = validate_domain(url);
    if !validation.is_valid {
        return CredibilityScore::unknown("source URL could not be parsed");
    }

    let mut score = validation.trust_score * 100.0;
    let mut reasons: Vec<String> = validation.suspicious_reasons.clone();

    if features.entities.hashtags.len() > EXCESSIVE_HASHTAGS {
        score -= 5.0;
        reasons.push(format!(
            "excessive hashtags ({})",
            features.entities.hashtags.len()
        ));
    }
    if features.emoji.emoji_density > EXCESSIVE_EMOJI_DENSITY {
        score -= 5.0;
        reasons.push("unusually emoji-dense content".to_string());
    }
    if features.emoji.overall_sentiment < STRONG_NEGATIVE_SENTIMENT {
        score -= 5.0;
        reasons.push("strongly negative emotional framing".to_string());
    }

    let reasoning = if reasons.is_empty() {
        "no trust signals against the source domain".to_string()
    } else {
        reasons.join("; ")
    };

    // Trust carries the certainty; a neutral 0.5 trust is also an uncertain one.
    let confidence = (validation.trust_score - 0.5).abs() * 2.0 * 0.8;

    CredibilityScore::new(
        score.clamp(0.0, 100.0).round() as u8,
        confidence,
        reasoning,
        ScoreSource::DomainReputation,
    )
}
