use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Sentiment entry for a single emoji. Scores run roughly -2.0..=2.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmojiSentiment {
    pub score: f64,
    pub category: &'static str,
}

const UNKNOWN_SENTIMENT: EmojiSentiment = EmojiSentiment {
    score: 0.0,
    category: "unknown",
};

// Static lookup table acting as the sentiment "database". An external
// lexicon-update pipeline may regenerate this table; `sentiment_for` is the
// only lookup path, so an override source only has to swap the map.
static SENTIMENT_TABLE: Lazy<HashMap<&'static str, EmojiSentiment>> = Lazy::new(|| {
    let entries: &[(&str, f64, &'static str)] = &[
        // joy / laughter
        ("😀", 1.5, "joy"),
        ("😃", 1.5, "joy"),
        ("😄", 1.6, "joy"),
        ("😁", 1.4, "joy"),
        ("😊", 1.5, "joy"),
        ("🙂", 0.8, "joy"),
        ("😂", 1.8, "laughter"),
        ("🤣", 1.8, "laughter"),
        ("😆", 1.5, "laughter"),
        ("😹", 1.4, "laughter"),
        // love
        ("😍", 1.9, "love"),
        ("🥰", 1.9, "love"),
        ("😘", 1.6, "love"),
        ("❤️", 2.0, "love"),
        ("❤", 2.0, "love"),
        ("💕", 1.8, "love"),
        ("💖", 1.8, "love"),
        ("💗", 1.7, "love"),
        ("💙", 1.6, "love"),
        ("💜", 1.6, "love"),
        ("🧡", 1.6, "love"),
        ("💛", 1.6, "love"),
        ("💚", 1.6, "love"),
        ("🖤", 0.5, "love"),
        ("💔", -1.5, "sadness"),
        // celebration / approval
        ("🎉", 1.7, "celebration"),
        ("🎊", 1.6, "celebration"),
        ("🥳", 1.7, "celebration"),
        ("🏆", 1.5, "celebration"),
        ("👏", 1.3, "approval"),
        ("👍", 1.2, "approval"),
        ("🙌", 1.4, "approval"),
        ("💪", 1.2, "approval"),
        ("🔥", 1.3, "approval"),
        ("✨", 1.1, "approval"),
        ("💯", 1.4, "approval"),
        ("🚀", 1.3, "approval"),
        // sadness
        ("😢", -1.4, "sadness"),
        ("😭", -1.6, "sadness"),
        ("😞", -1.2, "sadness"),
        ("😔", -1.1, "sadness"),
        ("😟", -1.0, "sadness"),
        ("🥺", -0.6, "sadness"),
        ("😿", -1.3, "sadness"),
        // anger / disapproval
        ("😠", -1.5, "anger"),
        ("😡", -1.8, "anger"),
        ("🤬", -2.0, "anger"),
        ("👎", -1.2, "disapproval"),
        ("💢", -1.4, "anger"),
        // fear / worry
        ("😨", -1.3, "fear"),
        ("😰", -1.3, "fear"),
        ("😱", -1.4, "fear"),
        ("😳", -0.5, "fear"),
        ("🫣", -0.4, "fear"),
        // surprise
        ("😮", 0.2, "surprise"),
        ("😲", 0.1, "surprise"),
        ("🤯", 0.3, "surprise"),
        ("😯", 0.1, "surprise"),
        // disgust / skepticism
        ("🤢", -1.7, "disgust"),
        ("🤮", -1.9, "disgust"),
        ("🙄", -0.8, "skepticism"),
        ("🤔", -0.2, "skepticism"),
        ("🧐", -0.1, "skepticism"),
        ("😒", -0.9, "skepticism"),
        // neutral
        ("😐", 0.0, "neutral"),
        ("😑", -0.2, "neutral"),
        ("🤷", 0.0, "neutral"),
        ("🤷‍♀️", 0.0, "neutral"),
        ("🤷‍♂️", 0.0, "neutral"),
        // warning-ish signals often attached to misinformation posts
        ("⚠️", -0.5, "warning"),
        ("🚨", -0.6, "warning"),
        ("❗", -0.3, "warning"),
        ("‼️", -0.5, "warning"),
    ];
    entries
        .iter()
        .map(|&(e, score, category)| (e, EmojiSentiment { score, category }))
        .collect()
});

/// A single emoji cluster found in text.
#[derive(Debug, Clone, PartialEq)]
pub struct EmojiMatch {
    pub emoji: String,
    /// Byte offset of the cluster start.
    pub position: usize,
    /// Cluster length in chars.
    pub length: usize,
    pub score: f64,
    pub category: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmojiAnalysis {
    pub emojis: Vec<EmojiMatch>,
    pub overall_sentiment: f64,
    pub dominant_emotions: Vec<String>,
    pub emoji_density: f64,
    pub has_emojis: bool,
}

pub fn sentiment_for(emoji: &str) -> EmojiSentiment {
    SENTIMENT_TABLE
        .get(emoji)
        .copied()
        .unwrap_or(UNKNOWN_SENTIMENT)
}

/// Scan text for emoji grapheme clusters (ZWJ sequences, flag pairs, skin
/// tones, variation selectors, keycaps) and score each against the table.
pub fn analyze_emojis(text: &str) -> EmojiAnalysis {
    let clusters = extract_emoji_clusters(text);
    let total_chars = text.chars().count();

    if clusters.is_empty() {
        return EmojiAnalysis {
            emojis: Vec::new(),
            overall_sentiment: 0.0,
            dominant_emotions: Vec::new(),
            emoji_density: 0.0,
            has_emojis: false,
        };
    }

    let emojis: Vec<EmojiMatch> = clusters
        .into_iter()
        .map(|(position, cluster)| {
            let sentiment = sentiment_for(&cluster);
            EmojiMatch {
                length: cluster.chars().count(),
                position,
                emoji: cluster,
                score: sentiment.score,
                category: sentiment.category,
            }
        })
        .collect();

    let overall_sentiment =
        emojis.iter().map(|e| e.score).sum::<f64>() / emojis.len() as f64;

    // A category is dominant only when it appears at least twice and covers
    // 30% of all emoji, so a single outlier never reads as "dominant".
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for e in &emojis {
        *counts.entry(e.category).or_default() += 1;
    }
    let threshold = 2.max((emojis.len() as f64 * 0.3).ceil() as usize);
    let mut dominant_emotions: Vec<String> = counts
        .iter()
        .filter(|&(category, &count)| count >= threshold && *category != "unknown")
        .map(|(category, _)| category.to_string())
        .collect();
    dominant_emotions.sort();

    let emoji_chars: usize = emojis.iter().map(|e| e.length).sum();
    let emoji_density = if total_chars == 0 {
        0.0
    } else {
        emoji_chars as f64 / total_chars as f64
    };

    EmojiAnalysis {
        emojis,
        overall_sentiment,
        dominant_emotions,
        emoji_density,
        has_emojis: true,
    }
}

/// Extracted emoji clusters as strings, in order of appearance.
pub fn extract_emojis(text: &str) -> Vec<String> {
    extract_emoji_clusters(text)
        .into_iter()
        .map(|(_, c)| c)
        .collect()
}

/// Text with every emoji cluster removed.
pub fn remove_emojis(text: &str) -> String {
    let clusters = extract_emoji_clusters(text);
    if clusters.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for (start, cluster) in &clusters {
        out.push_str(&text[cursor..*start]);
        cursor = start + cluster.len();
    }
    out.push_str(&text[cursor..]);
    out
}

fn extract_emoji_clusters(text: &str) -> Vec<(usize, String)> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut clusters = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (start, c) = chars[i];

        // Flag: a pair of regional indicators.
        if is_regional_indicator(c) {
            if i + 1 < chars.len() && is_regional_indicator(chars[i + 1].1) {
                let mut cluster = String::new();
                cluster.push(c);
                cluster.push(chars[i + 1].1);
                clusters.push((start, cluster));
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        // Keycap: digit/#/* + optional VS-16 + U+20E3.
        if matches!(c, '0'..='9' | '#' | '*') {
            let mut j = i + 1;
            if j < chars.len() && chars[j].1 == '\u{FE0F}' {
                j += 1;
            }
            if j < chars.len() && chars[j].1 == '\u{20E3}' {
                let cluster: String = chars[i..=j].iter().map(|&(_, ch)| ch).collect();
                clusters.push((start, cluster));
                i = j + 1;
                continue;
            }
        }

        if !is_emoji_base(c) {
            i += 1;
            continue;
        }

        // Base emoji plus trailing modifiers and ZWJ-joined continuations.
        let mut cluster = String::new();
        cluster.push(c);
        let mut j = i + 1;
        loop {
            if j < chars.len() && is_emoji_modifier(chars[j].1) {
                cluster.push(chars[j].1);
                j += 1;
                continue;
            }
            if j + 1 < chars.len()
                && chars[j].1 == '\u{200D}'
                && (is_emoji_base(chars[j + 1].1) || is_gender_sign(chars[j + 1].1))
            {
                cluster.push('\u{200D}');
                cluster.push(chars[j + 1].1);
                j += 2;
                continue;
            }
            break;
        }
        clusters.push((start, cluster));
        i = j;
    }

    clusters
}

fn is_emoji_base(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1F5FF   // symbols & pictographs
        | 0x1F600..=0x1F64F // emoticons
        | 0x1F680..=0x1F6FF // transport & map
        | 0x1F900..=0x1F9FF // supplemental symbols
        | 0x1FA70..=0x1FAFF // extended-A
        | 0x2600..=0x26FF   // misc symbols
        | 0x2700..=0x27BF   // dingbats
        | 0x2B00..=0x2BFF   // misc symbols & arrows (stars)
        | 0x2049            // !?
        | 0x203C            // !!
    )
}

fn is_emoji_modifier(c: char) -> bool {
    matches!(
        c as u32,
        0xFE0F              // variation selector-16
        | 0x1F3FB..=0x1F3FF // skin tones
    )
}

fn is_gender_sign(c: char) -> bool {
    matches!(c, '\u{2640}' | '\u{2642}')
}

fn is_regional_indicator(c: char) -> bool {
    matches!(c as u32, 0x1F1E6..=0x1F1FF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_emojis() {
        let analysis = analyze_emojis("plain text only");
        assert!(!analysis.has_emojis);
        assert_eq!(analysis.overall_sentiment, 0.0);
        assert_eq!(analysis.emoji_density, 0.0);
    }

    #[test]
    fn test_positive_sentiment_average() {
        let analysis = analyze_emojis("great news 😀 😍");
        assert!(analysis.has_emojis);
        assert_eq!(analysis.emojis.len(), 2);
        let expected = (1.5 + 1.9) / 2.0;
        assert!((analysis.overall_sentiment - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_emoji_neutral() {
        // mushroom is not in the table
        let analysis = analyze_emojis("🍄");
        assert_eq!(analysis.emojis[0].category, "unknown");
        assert_eq!(analysis.emojis[0].score, 0.0);
    }

    #[test]
    fn test_heart_with_selector_is_one_cluster() {
        let emojis = extract_emojis("love ❤️ this");
        assert_eq!(emojis, vec!["❤️".to_string()]);
    }

    #[test]
    fn test_zwj_sequence_is_one_cluster() {
        let emojis = extract_emojis("🤷‍♀️ shrug");
        assert_eq!(emojis.len(), 1);
        assert_eq!(emojis[0], "🤷‍♀️");
    }

    #[test]
    fn test_flag_pair_is_one_cluster() {
        let emojis = extract_emojis("go 🇧🇷 team");
        assert_eq!(emojis, vec!["🇧🇷".to_string()]);
    }

    #[test]
    fn test_keycap_cluster() {
        let emojis = extract_emojis("press 1️⃣ now");
        assert_eq!(emojis, vec!["1️⃣".to_string()]);
    }

    #[test]
    fn test_remove_emojis_strips_all() {
        let text = "hot take 🔥🔥 wow 🤯";
        let cleaned = remove_emojis(text);
        assert!(extract_emojis(&cleaned).is_empty());
        assert!(cleaned.contains("hot take"));
        assert!(cleaned.contains("wow"));
    }

    #[test]
    fn test_has_emojis_matches_extraction() {
        for text in ["none here", "one 😀", "🔥", "mixed 🧐 text"] {
            let analysis = analyze_emojis(text);
            assert_eq!(analysis.has_emojis, !extract_emojis(text).is_empty());
        }
    }

    #[test]
    fn test_dominant_requires_two_and_thirty_percent() {
        // one emoji: never dominant
        let single = analyze_emojis("😀");
        assert!(single.dominant_emotions.is_empty());

        // two joy out of three: dominant
        let multi = analyze_emojis("😀 😄 😢");
        assert_eq!(multi.dominant_emotions, vec!["joy".to_string()]);
    }

    #[test]
    fn test_density() {
        // "ab" + one single-char emoji = 3 chars, 1 emoji char
        let analysis = analyze_emojis("ab😀");
        assert!((analysis.emoji_density - 1.0 / 3.0).abs() < 1e-9);
    }
}
