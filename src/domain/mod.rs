pub mod compare;
pub mod reputation;
pub mod suffix;
pub mod tables;
pub mod types;
pub mod validate;

pub use compare::compare_domains;
pub use reputation::get_domain_reputation;
pub use types::{
    DomainComparison, DomainInfo, DomainReputation, DomainValidation, ReputationCategory,
};
pub use validate::validate_domain;

use url::{Host, Url};

/// Parse a URL or bare hostname into a [`DomainInfo`]. Malformed input
/// (whitespace, dotless non-localhost names, unparseable URLs) yields
/// [`DomainInfo::empty`] rather than an error; this data comes from pages
/// we do not control.
pub fn extract_domain(input: &str) -> DomainInfo {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return DomainInfo::empty();
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = match Url::parse(&with_scheme) {
        Ok(url) => url,
        Err(_) => return DomainInfo::empty(),
    };

    let protocol = Some(url.scheme().to_string());
    let port = url.port().map(|p| p.to_string());

    match url.host() {
        Some(Host::Ipv4(ip)) => DomainInfo {
            full_domain: Some(ip.to_string()),
            is_ip: true,
            is_localhost: ip.is_loopback(),
            protocol,
            port,
            ..DomainInfo::empty()
        },
        Some(Host::Ipv6(ip)) => DomainInfo {
            full_domain: Some(ip.to_string()),
            is_ip: true,
            is_localhost: ip.is_loopback(),
            protocol,
            port,
            ..DomainInfo::empty()
        },
        Some(Host::Domain(host)) => {
            let host = host.to_lowercase();
            if host.split('.').any(str::is_empty) {
                // Leading, trailing, or doubled dots leave empty labels.
                return DomainInfo::empty();
            }
            let is_localhost = host == "localhost" || host.ends_with(".local");
            let is_tor = host.ends_with(".onion");
            let is_idn = !host.is_ascii() || host.split('.').any(|l| l.starts_with("xn--"));

            if !host.contains('.') {
                if !is_localhost {
                    // Dotless hosts other than localhost are not real domains.
                    return DomainInfo::empty();
                }
                return DomainInfo {
                    full_domain: Some(host.clone()),
                    domain: Some(host),
                    is_localhost: true,
                    protocol,
                    port,
                    ..DomainInfo::empty()
                };
            }

            let (subdomain, domain, suffix) = match suffix::split_host(&host) {
                Some(parts) => parts,
                None => {
                    // Host *is* a public suffix; keep it whole, no split.
                    return DomainInfo {
                        full_domain: Some(host.clone()),
                        domain: Some(host),
                        is_idn,
                        is_tor,
                        is_localhost,
                        protocol,
                        port,
                        ..DomainInfo::empty()
                    };
                }
            };

            DomainInfo {
                full_domain: Some(host),
                domain: Some(domain),
                subdomain,
                public_suffix: Some(suffix.suffix),
                is_ip: false,
                is_private: suffix.is_private,
                is_idn,
                is_tor,
                is_localhost,
                protocol,
                port,
            }
        }
        None => DomainInfo::empty(),
    }
}
