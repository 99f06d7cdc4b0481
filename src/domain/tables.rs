//! Static pattern tables backing the domain heuristics. These act as the
//! embedded "database": an external lexicon-update pipeline may regenerate
//! them, so all lookups go through the accessors at the bottom.

use once_cell::sync::Lazy;
use regex::Regex;

/// TLDs with heavily abused free/cheap registrations.
pub const SUSPICIOUS_TLDS: &[&str] = &[
    "tk", "ml", "ga", "cf", "gq", "xyz", "top", "club", "click", "link", "work", "loan", "win",
    "bid", "download", "racing", "stream", "zip", "mov", "rest", "cam",
];

/// TLDs with restricted registration policies.
pub const TRUSTED_TLDS: &[&str] = &["gov", "edu", "mil", "int", "museum"];

/// Subdomain labels that phishing pages use to look official.
pub const SUSPICIOUS_SUBDOMAIN_KEYWORDS: &[&str] = &[
    "secure", "verify", "account", "login", "signin", "update", "confirm", "banking", "wallet",
    "auth", "password",
];

/// Brand names whose lookalikes dominate credential phishing.
const PHISHING_PATTERNS: &[&str] = &[
    // action word glued to a brand: "secure-paypal", "verify.apple"
    r"(?:secure|verify|login|signin|account|update|confirm|support)[-.]?(?:paypal|apple|amazon|google|microsoft|facebook|netflix|bank)",
    // brand glued to an action word: "paypal-login"
    r"(?:paypal|apple|amazon|google|microsoft|facebook|netflix)[-.]?(?:secure|verify|login|signin|account|update|confirm|support)",
    // digit-substitution brand lookalikes
    r"payp[a4]l|g[o0]{2}gle|amaz[o0]n|micr[o0]s[o0]ft|faceb[o0]{2}k|app1e|netf1ix|tw[i1]tter",
    // absurdly long single label, typical of generated phishing hosts
    r"[a-z0-9]{28,}",
    // repeated hyphens used to pad lookalike names
    r"\w-{2,}\w",
];

static COMPILED_PHISHING: Lazy<Vec<Regex>> = Lazy::new(|| {
    PHISHING_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("phishing pattern must compile"))
        .collect()
});

/// Cyrillic letters visually identical to Latin ones; their presence next to
/// Latin text is the classic homograph attack.
pub const CYRILLIC_HOMOGRAPHS: &[char] = &[
    'а', 'е', 'о', 'р', 'с', 'х', 'у', 'ѕ', 'і', 'ј', 'һ', 'ԁ', 'ɡ',
];

pub fn phishing_patterns() -> &'static [Regex] {
    &COMPILED_PHISHING
}

pub fn is_suspicious_tld(tld: &str) -> bool {
    let last = tld.rsplit('.').next().unwrap_or(tld);
    SUSPICIOUS_TLDS.contains(&last)
}

pub fn is_trusted_tld(tld: &str) -> bool {
    let last = tld.rsplit('.').next().unwrap_or(tld);
    TRUSTED_TLDS.contains(&last) || tld.starts_with("gov.") || tld.ends_with(".gov")
}
