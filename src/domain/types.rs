use serde::{Deserialize, Serialize};

/// Parsed structure of a URL's host. All fields are `None`/`false` when the
/// input could not be parsed; hostile input never panics the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    pub full_domain: Option<String>,
    /// Registrable domain (public suffix plus one label), e.g. "example.co.uk".
    pub domain: Option<String>,
    pub subdomain: Option<String>,
    pub public_suffix: Option<String>,
    pub is_ip: bool,
    /// Host sits under a private registrable suffix like "*.github.io".
    pub is_private: bool,
    pub is_idn: bool,
    pub is_tor: bool,
    pub is_localhost: bool,
    pub protocol: Option<String>,
    pub port: Option<String>,
}

impl DomainInfo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_parsed(&self) -> bool {
        self.full_domain.is_some()
    }
}

/// Explainable trust verdict: the score is an ordered additive accumulation
/// and `suspicious_reasons` keeps the matching human-readable justifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainValidation {
    pub is_valid: bool,
    pub is_suspicious: bool,
    pub suspicious_reasons: Vec<String>,
    pub trust_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReputationCategory {
    Trusted,
    Neutral,
    Suspicious,
    Malicious,
}

/// Reputation band plus certainty of that label (not raw trust).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainReputation {
    pub category: ReputationCategory,
    pub confidence: f64,
}

/// Result of comparing two domains for typosquatting.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainComparison {
    pub are_similar: bool,
    pub similarity: f64,
    pub suspicious_variation: bool,
}
