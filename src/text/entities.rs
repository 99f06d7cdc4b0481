use linkify::{LinkFinder, LinkKind};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Weight assigned to every URL when computing platform-style text length,
/// matching how short-URL platforms count links regardless of actual length.
pub const URL_LENGTH_WEIGHT: usize = 23;

/// Default maximum platform-weighted length for a post.
pub const DEFAULT_MAX_LENGTH: usize = 280;

const MAX_USERNAME_LENGTH: usize = 30;

// Unicode property classes so hashtags/mentions work across scripts without
// per-language special casing.
static HASHTAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([\p{L}\p{M}\p{Nd}_]+)").unwrap());

static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([\p{L}\p{M}\p{Nd}_.]+)").unwrap());

static CASHTAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z]{1,6})(?:[^A-Za-z0-9]|$)").unwrap());

static USERNAME_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{M}\p{Nd}_.]+$").unwrap());

/// Entities extracted from a piece of social text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialTextEntities {
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub urls: Vec<String>,
    pub cashtags: Vec<String>,
}

/// Result of parsing a post: the original text, its entities, and the
/// platform-weighted length used for validity.
#[derive(Debug, Clone)]
pub struct SocialText {
    pub text: String,
    pub entities: SocialTextEntities,
    pub length: usize,
    pub is_valid: bool,
}

/// Parse a post into entities and a weighted length, with the default
/// 280-character limit.
pub fn parse_social_text(text: &str) -> SocialText {
    parse_social_text_with_limit(text, DEFAULT_MAX_LENGTH)
}

pub fn parse_social_text_with_limit(text: &str, max_length: usize) -> SocialText {
    if text.is_empty() {
        return SocialText {
            text: String::new(),
            entities: SocialTextEntities::default(),
            length: 0,
            is_valid: false,
        };
    }

    let urls = extract_urls(text);

    let hashtags: Vec<String> = HASHTAG_REGEX
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect();

    let mentions: Vec<String> = MENTION_REGEX
        .captures_iter(text)
        .filter_map(|c| {
            let cleaned = sanitize_username(&c[1]);
            if cleaned.is_empty() { None } else { Some(cleaned) }
        })
        .collect();

    let cashtags: Vec<String> = CASHTAG_REGEX
        .captures_iter(text)
        .map(|c| c[1].to_uppercase())
        .collect();

    let length = weighted_length(text, &urls);
    let is_valid = length > 0 && length <= max_length;

    SocialText {
        text: text.to_string(),
        entities: SocialTextEntities {
            hashtags,
            mentions,
            urls,
            cashtags,
        },
        length,
        is_valid,
    }
}

/// Validate and normalize a username. Returns an empty string for unusable
/// input (too long, consecutive dots, leading/trailing dots, bad charset)
/// rather than erroring: this data comes from untrusted page content.
pub fn sanitize_username(raw: &str) -> String {
    let trimmed = raw.trim_matches('.');
    if trimmed.is_empty()
        || trimmed.chars().count() > MAX_USERNAME_LENGTH
        || trimmed.contains("..")
        || !USERNAME_CHARSET.is_match(trimmed)
    {
        warn!(username = raw, "rejected malformed username");
        return String::new();
    }
    trimmed.to_string()
}

fn extract_urls(text: &str) -> Vec<String> {
    let mut finder = LinkFinder::new();
    finder.kinds(&[LinkKind::Url]);
    finder.links(text).map(|l| l.as_str().to_string()).collect()
}

/// Platform-weighted character count: every URL counts as a fixed
/// [`URL_LENGTH_WEIGHT`] regardless of its actual length.
fn weighted_length(text: &str, urls: &[String]) -> usize {
    let url_chars: usize = urls.iter().map(|u| u.chars().count()).sum();
    let total_chars = text.chars().count();
    total_chars.saturating_sub(url_chars) + urls.len() * URL_LENGTH_WEIGHT
}
