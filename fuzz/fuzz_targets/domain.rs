#![no_main]

use libfuzzer_sys::fuzz_target;

use credo::domain::{extract_domain, validate_domain};
use credo::text::{analyze_emojis, parse_engagement_number, parse_social_text};

fuzz_target!(|data: &[u8]| {
    // Convert raw bytes to string, handling invalid UTF-8 gracefully
    let input = String::from_utf8_lossy(data).to_string();

    // All of these consume untrusted page content and must never panic
    let _ = extract_domain(&input);
    let _ = validate_domain(&input);
    let _ = parse_social_text(&input);
    let _ = analyze_emojis(&input);
    let _ = parse_engagement_number(&input);
});
