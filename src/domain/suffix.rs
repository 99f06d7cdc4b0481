//! Embedded subset of the public suffix list. A full PSL sync is an external
//! data-pipeline concern; this table covers the multi-label and private
//! suffixes the credibility heuristics actually distinguish, and every other
//! host falls back to its last label as the suffix.

/// Multi-label ICANN suffixes.
const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "me.uk", "net.uk",
    "com.au", "net.au", "org.au", "gov.au", "edu.au",
    "co.jp", "or.jp", "ne.jp", "ac.jp", "go.jp",
    "com.br", "net.br", "org.br", "gov.br",
    "co.in", "net.in", "org.in", "gov.in",
    "com.cn", "net.cn", "org.cn", "gov.cn",
    "com.mx", "com.ar", "com.tr", "com.sg", "com.hk", "com.tw",
    "co.kr", "or.kr", "co.za", "co.nz", "co.id", "co.th",
    "com.ua", "com.pl", "com.ru",
];

/// Private registrable suffixes: anything one label below these is its own
/// registrable domain (user-content hosting), which matters for trust.
const PRIVATE_SUFFIXES: &[&str] = &[
    "github.io",
    "gitlab.io",
    "netlify.app",
    "vercel.app",
    "herokuapp.com",
    "pages.dev",
    "workers.dev",
    "blogspot.com",
    "wordpress.com",
    "web.app",
    "firebaseapp.com",
    "appspot.com",
    "azurewebsites.net",
    "cloudfront.net",
    "s3.amazonaws.com",
    "repl.co",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixMatch {
    pub suffix: String,
    pub is_private: bool,
}

/// Longest-match public-suffix lookup over the embedded table. Returns `None`
/// for hosts with no dot at all.
pub fn public_suffix(host: &str) -> Option<SuffixMatch> {
    let host = host.to_lowercase();
    if !host.contains('.') {
        return None;
    }

    let mut best: Option<SuffixMatch> = None;
    for &candidate in PRIVATE_SUFFIXES {
        if matches_suffix(&host, candidate) {
            consider(&mut best, candidate, true);
        }
    }
    for &candidate in MULTI_LABEL_SUFFIXES {
        if matches_suffix(&host, candidate) {
            consider(&mut best, candidate, false);
        }
    }
    if let Some(found) = best {
        return Some(found);
    }

    // Fallback: the last label is the suffix.
    host.rsplit('.').next().map(|tld| SuffixMatch {
        suffix: tld.to_string(),
        is_private: false,
    })
}

/// A suffix only matches when at least one label sits above it, otherwise the
/// host *is* the suffix and has no registrable domain.
fn matches_suffix(host: &str, suffix: &str) -> bool {
    host.len() > suffix.len() + 1
        && host.ends_with(suffix)
        && host.as_bytes()[host.len() - suffix.len() - 1] == b'.'
}

fn consider(best: &mut Option<SuffixMatch>, candidate: &str, is_private: bool) {
    let longer = best
        .as_ref()
        .map(|b| candidate.len() > b.suffix.len())
        .unwrap_or(true);
    if longer {
        *best = Some(SuffixMatch {
            suffix: candidate.to_string(),
            is_private,
        });
    }
}

/// Split a host into (subdomain, registrable domain, suffix).
pub fn split_host(host: &str) -> Option<(Option<String>, String, SuffixMatch)> {
    let host = host.to_lowercase();
    if MULTI_LABEL_SUFFIXES.contains(&host.as_str()) || PRIVATE_SUFFIXES.contains(&host.as_str()) {
        return None;
    }
    let found = public_suffix(&host)?;

    let prefix = host
        .strip_suffix(found.suffix.as_str())
        .map(|p| p.trim_end_matches('.'))?;
    if prefix.is_empty() {
        // Host equals the suffix itself ("co.uk"): no registrable domain.
        return None;
    }

    let mut labels: Vec<&str> = prefix.split('.').collect();
    let registrable_label = labels.pop()?;
    if registrable_label.is_empty() {
        return None;
    }
    let registrable = format!("{}.{}", registrable_label, found.suffix);
    let subdomain = if labels.is_empty() {
        None
    } else {
        Some(labels.join("."))
    };

    Some((subdomain, registrable, found))
}
