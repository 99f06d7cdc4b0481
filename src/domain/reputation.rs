use crate::domain::types::{DomainReputation, ReputationCategory};
use crate::domain::validate::validate_domain;

/// Map a trust score onto a reputation band. Confidence always expresses
/// certainty of the assigned label: raw trust for the positive bands, its
/// complement for the negative ones.
pub fn get_domain_reputation(input: &str) -> DomainReputation {
    let validation = validate_domain(input);
    let trust = validation.trust_score;

    let (category, confidence) = if trust >= 0.7 {
        (ReputationCategory::Trusted, trust)
    } else if trust >= 0.4 {
        (ReputationCategory::Neutral, trust)
    } else if trust >= 0.1 {
        (ReputationCategory::Suspicious, 1.0 - trust)
    } else {
        (ReputationCategory::Malicious, 1.0 - trust)
    };

    DomainReputation {
        category,
        confidence,
    }
}
