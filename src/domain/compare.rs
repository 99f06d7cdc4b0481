use crate::domain::extract_domain;
use crate::domain::types::DomainComparison;

const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Compare two domains for typosquatting. Similarity is normalized edit
/// distance over the registrable domains; `suspicious_variation` flags the
/// common single-substitution phishing tricks (0/o, 1/l/i, doubled letters,
/// hyphen games) that make two distinct names read identically.
pub fn compare_domains(a: &str, b: &str) -> DomainComparison {
    let left = registrable_or_raw(a);
    let right = registrable_or_raw(b);

    if left.is_empty() || right.is_empty() {
        return DomainComparison {
            are_similar: false,
            similarity: 0.0,
            suspicious_variation: false,
        };
    }

    let distance = levenshtein(&left, &right);
    let max_len = left.chars().count().max(right.chars().count());
    let similarity = if max_len == 0 {
        1.0
    } else {
        1.0 - distance as f64 / max_len as f64
    };

    let suspicious_variation = left != right && is_suspicious_variation(&left, &right);

    DomainComparison {
        are_similar: similarity >= SIMILARITY_THRESHOLD,
        similarity,
        suspicious_variation,
    }
}

fn registrable_or_raw(input: &str) -> String {
    let info = extract_domain(input);
    info.domain
        .or(info.full_domain)
        .unwrap_or_else(|| input.trim().to_lowercase())
}

fn is_suspicious_variation(a: &str, b: &str) -> bool {
    // Confusable-character substitution: 0/o, 1/l/i, 5/s, 3/e, 4/a.
    if confusable_fold(a) == confusable_fold(b) {
        return true;
    }
    // Letter doubling: "gooogle" vs "google".
    if dedup_runs(a) == dedup_runs(b) {
        return true;
    }
    // Hyphen insertion or removal: "pay-pal" vs "paypal".
    if a.replace('-', "") == b.replace('-', "") {
        return true;
    }
    false
}

fn confusable_fold(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '0' => 'o',
            '1' | 'i' => 'l',
            '5' => 's',
            '3' => 'e',
            '4' => 'a',
            c => c,
        })
        .collect()
}

fn dedup_runs(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last = None;
    for c in s.chars() {
        if Some(c) != last {
            out.push(c);
        }
        last = Some(c);
    }
    out
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_domains() {
        let cmp = compare_domains("example.com", "https://example.com");
        assert!(cmp.are_similar);
        assert_eq!(cmp.similarity, 1.0);
        assert!(!cmp.suspicious_variation);
    }

    #[test]
    fn test_digit_substitution_flagged() {
        let cmp = compare_domains("paypal.com", "paypa1.com");
        assert!(cmp.suspicious_variation);
        assert!(cmp.are_similar);
    }

    #[test]
    fn test_zero_for_o_flagged() {
        let cmp = compare_domains("google.com", "g00gle.com");
        assert!(cmp.suspicious_variation);
    }

    #[test]
    fn test_doubled_letter_flagged() {
        let cmp = compare_domains("google.com", "gooogle.com");
        assert!(cmp.suspicious_variation);
    }

    #[test]
    fn test_hyphen_insertion_flagged() {
        let cmp = compare_domains("paypal.com", "pay-pal.com");
        assert!(cmp.suspicious_variation);
    }

    #[test]
    fn test_unrelated_domains() {
        let cmp = compare_domains("nytimes.com", "example.org");
        assert!(!cmp.are_similar);
        assert!(!cmp.suspicious_variation);
        assert!(cmp.similarity < 0.5);
    }

    #[test]
    fn test_subdomains_ignored() {
        // Comparison runs on registrable domains only.
        let cmp = compare_domains("www.example.com", "mail.example.com");
        assert!(cmp.are_similar);
        assert!(!cmp.suspicious_variation);
    }
}
