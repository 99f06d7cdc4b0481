use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NumberParseError {
    #[error("empty input")]
    Empty,

    #[error("no digits found in {0:?}")]
    NoDigits(String),

    #[error("malformed number: {0:?}")]
    Malformed(String),
}

// Magnitude suffixes, longest first so "млрд" wins over "млн" prefix scans.
const MULTIPLIERS: &[(&str, f64)] = &[
    ("млрд", 1e9),
    ("млн", 1e6),
    ("тыс", 1e3),
    ("億", 1e8),
    ("万", 1e4),
    ("千", 1e3),
    ("억", 1e8),
    ("만", 1e4),
    ("천", 1e3),
    ("B", 1e9),
    ("b", 1e9),
    ("M", 1e6),
    ("m", 1e6),
    ("K", 1e3),
    ("k", 1e3),
];

// Locales where ',' is the decimal separator and '.' groups thousands.
const COMMA_DECIMAL_LOCALES: &[&str] = &[
    "de", "fr", "es", "it", "pt", "nl", "pl", "tr", "ru", "uk", "sv", "da", "fi",
];

static NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9][0-9.,\s\u{00A0}\u{202F}]*").unwrap());

/// Parse an engagement count like "10K", "1.2万", "3 тыс" or "١٢٣" into an
/// integer, with no locale hint.
pub fn parse_engagement_number(text: &str) -> Result<u64, NumberParseError> {
    parse_engagement_number_with_locale(text, None)
}

/// Locale-aware variant. The hint only disambiguates `.`/`,` separators;
/// magnitude suffixes are matched regardless of locale.
pub fn parse_engagement_number_with_locale(
    text: &str,
    locale: Option<&str>,
) -> Result<u64, NumberParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(NumberParseError::Empty);
    }

    let normalized = normalize_digits(trimmed);

    let token_match = NUMBER_TOKEN
        .find(&normalized)
        .ok_or_else(|| NumberParseError::NoDigits(text.to_string()))?;

    let multiplier = find_multiplier(&normalized[token_match.end()..]);

    let token: String = token_match
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{00A0}' && *c != '\u{202F}')
        .collect();
    let token = token.trim_end_matches(['.', ',']);

    let value = parse_separated(token, locale)
        .ok_or_else(|| NumberParseError::Malformed(text.to_string()))?;

    Ok((value * multiplier).round() as u64)
}

/// Map Arabic-Indic, Extended Arabic, Devanagari and fullwidth digits to
/// ASCII so one numeric parser serves all scripts.
fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c as u32 {
            0x0660..=0x0669 => char::from(b'0' + (c as u32 - 0x0660) as u8),
            0x06F0..=0x06F9 => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            0x0966..=0x096F => char::from(b'0' + (c as u32 - 0x0966) as u8),
            0xFF10..=0xFF19 => char::from(b'0' + (c as u32 - 0xFF10) as u8),
            _ => c,
        })
        .collect()
}

fn find_multiplier(rest: &str) -> f64 {
    let rest = rest.trim_start();
    for &(suffix, factor) in MULTIPLIERS {
        if rest.starts_with(suffix) {
            return factor;
        }
    }
    1.0
}

/// Resolve thousands/decimal separators and parse to f64.
fn parse_separated(token: &str, locale: Option<&str>) -> Option<f64> {
    if token.is_empty() {
        return None;
    }

    let dots = token.matches('.').count();
    let commas = token.matches(',').count();
    let comma_decimal_locale = locale
        .map(|l| {
            let primary = l.split(['-', '_']).next().unwrap_or(l);
            COMMA_DECIMAL_LOCALES.contains(&primary)
        })
        .unwrap_or(false);

    let cleaned = match (dots, commas) {
        (0, 0) => token.to_string(),
        // Both present: whichever comes last is the decimal point.
        (d, c) if d > 0 && c > 0 => {
            let last_dot = token.rfind('.').unwrap();
            let last_comma = token.rfind(',').unwrap();
            if last_dot > last_comma {
                token.replace(',', "")
            } else {
                token.replace('.', "").replace(',', ".")
            }
        }
        // Repeated separator is always grouping.
        (d, 0) if d > 1 => token.replace('.', ""),
        (0, c) if c > 1 => token.replace(',', ""),
        (1, 0) => {
            if comma_decimal_locale && trailing_group_len(token, '.') == 3 {
                token.replace('.', "")
            } else {
                token.to_string()
            }
        }
        (0, 1) => {
            if comma_decimal_locale {
                token.replace(',', ".")
            } else if trailing_group_len(token, ',') == 3 {
                token.replace(',', "")
            } else {
                token.replace(',', ".")
            }
        }
        _ => unreachable!(),
    };

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

fn trailing_group_len(token: &str, sep: char) -> usize {
    token
        .rsplit(sep)
        .next()
        .map(|group| group.chars().count())
        .unwrap_or(0)
}
