use crate::domain::tables::{
    CYRILLIC_HOMOGRAPHS, SUSPICIOUS_SUBDOMAIN_KEYWORDS, is_suspicious_tld, is_trusted_tld,
    phishing_patterns,
};
use crate::domain::types::DomainValidation;
use crate::domain::{DomainInfo, extract_domain};

const NEUTRAL_TRUST: f64 = 0.5;
const MAX_SUBDOMAIN_DEPTH: usize = 3;

/// Score a URL's trustworthiness with ordered additive adjustments starting
/// from a neutral 0.5, keeping a human-readable reason for every penalty.
/// Any string input yields a score in [0, 1]; nothing here panics.
pub fn validate_domain(input: &str) -> DomainValidation {
    let info = extract_domain(input);
    if !info.is_parsed() {
        return DomainValidation {
            is_valid: false,
            is_suspicious: true,
            suspicious_reasons: vec!["input is not a parseable URL or hostname".to_string()],
            trust_score: 0.0,
        };
    }

    let mut score = NEUTRAL_TRUST;
    let mut reasons = Vec::new();
    let host = info.full_domain.as_deref().unwrap_or_default().to_string();

    if info.is_ip {
        score -= 0.3;
        reasons.push("host is a raw IP literal".to_string());
    }

    if info.is_localhost {
        // Local hosts are never a credible public source.
        score = 0.1;
        reasons.push("host is localhost or a .local name".to_string());
    }

    if info.is_tor {
        score -= 0.2;
        reasons.push("host is a Tor .onion address".to_string());
    }

    if let Some(suffix) = info.public_suffix.as_deref() {
        if is_suspicious_tld(suffix) {
            score -= 0.2;
            reasons.push(format!("TLD .{suffix} is commonly abused"));
        } else if is_trusted_tld(suffix) {
            score += 0.2;
        }
    }

    let phishing_hits = phishing_patterns()
        .iter()
        .filter(|p| p.is_match(&host))
        .count();
    if phishing_hits > 0 {
        // -0.1 per match plus -0.1 for every match beyond the first.
        score -= 0.1 * phishing_hits as f64 + 0.1 * (phishing_hits as f64 - 1.0);
        reasons.push(format!(
            "host matches {phishing_hits} phishing naming pattern(s)"
        ));
    }

    // The url crate punycode-encodes IDN hosts, so confusable characters are
    // only visible in the raw input.
    if has_mixed_script(&raw_host(input)) {
        score -= 0.3;
        reasons.push("host mixes Latin with lookalike non-Latin characters".to_string());
    }

    if subdomain_depth(&info) > MAX_SUBDOMAIN_DEPTH {
        score -= 0.1;
        reasons.push("excessively deep subdomain nesting".to_string());
    }

    if let Some(keyword) = suspicious_subdomain_keyword(&info) {
        score -= 0.2;
        reasons.push(format!("subdomain uses bait keyword \"{keyword}\""));
    }

    DomainValidation {
        is_valid: true,
        is_suspicious: !reasons.is_empty(),
        suspicious_reasons: reasons,
        trust_score: score.clamp(0.0, 1.0),
    }
}

/// Host portion of the raw input, before any punycode normalization.
fn raw_host(input: &str) -> String {
    let rest = input
        .trim()
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or_else(|| input.trim());
    rest.split(['/', '?', '#', ':'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Latin mixed with confusable Cyrillic/Greek in one host is the classic
/// homograph attack; legitimate IDNs stay within a single script.
fn has_mixed_script(host: &str) -> bool {
    let has_latin = host.chars().any(|c| c.is_ascii_alphabetic());
    if !has_latin {
        return false;
    }
    host.chars().any(|c| {
        CYRILLIC_HOMOGRAPHS.contains(&c)
            || matches!(c, '\u{0370}'..='\u{03FF}') // Greek
            || (matches!(c, '\u{0400}'..='\u{04FF}'))
    })
}

fn subdomain_depth(info: &DomainInfo) -> usize {
    info.subdomain
        .as_deref()
        .map(|s| s.split('.').count())
        .unwrap_or(0)
}

fn suspicious_subdomain_keyword(info: &DomainInfo) -> Option<&'static str> {
    let subdomain = info.subdomain.as_deref()?;
    subdomain
        .split('.')
        .find_map(|label| SUSPICIOUS_SUBDOMAIN_KEYWORDS.iter().find(|&&k| k == label))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_domain() {
        let v = validate_domain("https://example.com");
        assert!(v.is_valid);
        assert!(!v.is_suspicious);
        assert!((v.trust_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_ip_literal_penalty() {
        let v = validate_domain("http://192.168.1.1");
        assert!(v.is_suspicious);
        assert!((v.trust_score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_localhost_forced_low() {
        let v = validate_domain("http://localhost:3000");
        assert!((v.trust_score - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_trusted_tld_bonus() {
        let v = validate_domain("https://www.usa.gov");
        assert!(v.trust_score > 0.5);
        assert!(!v.is_suspicious);
    }

    #[test]
    fn test_suspicious_tld_penalty() {
        let v = validate_domain("https://free-prizes.tk");
        assert!(v.is_suspicious);
        assert!(v.trust_score < 0.5);
    }

    #[test]
    fn test_phishing_pattern_penalty() {
        let v = validate_domain("https://secure-paypal.com/login");
        assert!(v.is_suspicious);
        assert!(v.trust_score < 0.5);
        assert!(
            v.suspicious_reasons
                .iter()
                .any(|r| r.contains("phishing"))
        );
    }

    #[test]
    fn test_mixed_script_penalty() {
        // Cyrillic 'а' inside an otherwise Latin host
        let v = validate_domain("https://pаypal.com");
        assert!(v.suspicious_reasons.iter().any(|r| r.contains("Latin")));
        assert!(v.trust_score <= 0.2);
    }

    #[test]
    fn test_deep_subdomain_penalty() {
        let v = validate_domain("https://a.b.c.d.example.com");
        assert!(
            v.suspicious_reasons
                .iter()
                .any(|r| r.contains("subdomain nesting"))
        );
    }

    #[test]
    fn test_bait_subdomain_keyword() {
        let v = validate_domain("https://secure.example.com");
        assert!(v.suspicious_reasons.iter().any(|r| r.contains("secure")));
        assert!((v.trust_score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_garbage_input_stays_in_range() {
        for input in ["", "   ", "not a url", "....", "\u{0}"] {
            let v = validate_domain(input);
            assert!(!v.is_valid);
            assert!((0.0..=1.0).contains(&v.trust_score));
        }
    }
}
