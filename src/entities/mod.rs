use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credibility band assigned to a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredibilityLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl CredibilityLevel {
    /// Band boundaries used whenever a numeric score has to be labeled.
    pub fn from_score(score: u8) -> Self {
        match score {
            70..=100 => Self::High,
            40..=69 => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Which stage of the pipeline produced the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreSource {
    Ai,
    Api,
    Fallback,
    DomainReputation,
}

/// Final analysis result handed to the render layer. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredibilityScore {
    pub score: u8, // 0..=100
    pub level: CredibilityLevel,
    pub confidence: f64, // 0.0..=1.0
    pub reasoning: String,
    pub source: ScoreSource,
    pub timestamp: DateTime<Utc>,
}

impl CredibilityScore {
    pub fn new(score: u8, confidence: f64, reasoning: String, source: ScoreSource) -> Self {
        let score = score.min(100);
        Self {
            score,
            level: CredibilityLevel::from_score(score),
            confidence: confidence.clamp(0.0, 1.0),
            reasoning,
            source,
            timestamp: Utc::now(),
        }
    }

    /// Terminal result when every scoring path failed. The pipeline must
    /// always hand the renderer something.
    pub fn unknown(reasoning: impl Into<String>) -> Self {
        Self {
            score: 50,
            level: CredibilityLevel::Unknown,
            confidence: 0.0,
            reasoning: reasoning.into(),
            source: ScoreSource::Fallback,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bands() {
        assert_eq!(CredibilityLevel::from_score(100), CredibilityLevel::High);
        assert_eq!(CredibilityLevel::from_score(70), CredibilityLevel::High);
        assert_eq!(CredibilityLevel::from_score(69), CredibilityLevel::Medium);
        assert_eq!(CredibilityLevel::from_score(40), CredibilityLevel::Medium);
        assert_eq!(CredibilityLevel::from_score(39), CredibilityLevel::Low);
        assert_eq!(CredibilityLevel::from_score(0), CredibilityLevel::Low);
    }

    #[test]
    fn test_score_clamping() {
        let s = CredibilityScore::new(250, 1.7, "clamped".to_string(), ScoreSource::Fallback);
        assert_eq!(s.score, 100);
        assert_eq!(s.confidence, 1.0);
    }

    #[test]
    fn test_unknown_has_zero_confidence() {
        let s = CredibilityScore::unknown("no data");
        assert_eq!(s.level, CredibilityLevel::Unknown);
        assert_eq!(s.confidence, 0.0);
        assert!(matches!(s.source, ScoreSource::Fallback));
    }
}
