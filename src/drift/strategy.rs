use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Selector spec with the two extended matchers the raw CSS engine lacks:
/// text-content matching and a `:has()` fallback applied as a post-filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorSpec {
    pub css: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_contains: Option<String>,
    /// Candidate must contain a descendant matching this selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has: Option<String>,
}

/// Per-strategy validation requirements, checked after a candidate element
/// is located. Universal sanity checks (non-trivial text, not hidden) apply
/// on top of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyValidation {
    #[serde(default)]
    pub required_attributes: Vec<String>,
    /// Regex the element text must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_pattern: Option<String>,
    /// Tag-name chain (outer to inner, `>`-separated) the element's ancestry
    /// must end with, e.g. "article > div".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_path: Option<String>,
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,
}

// Manual impl so `..Default::default()` carries the same text-length floor
// as deserialized strategies.
impl Default for StrategyValidation {
    fn default() -> Self {
        Self {
            required_attributes: Vec::new(),
            text_pattern: None,
            structure_path: None,
            min_text_length: default_min_text_length(),
        }
    }
}

fn default_min_text_length() -> usize {
    8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorStrategy {
    pub name: String,
    pub spec: SelectorSpec,
    pub confidence: f64,
    #[serde(default)]
    pub validation: StrategyValidation,
}

pub type StrategyKey = (String, String);
pub type StrategyTable = HashMap<StrategyKey, Vec<SelectorStrategy>>;

fn strategy(
    name: &str,
    css: &str,
    confidence: f64,
    validation: StrategyValidation,
) -> SelectorStrategy {
    SelectorStrategy {
        name: name.to_string(),
        spec: SelectorSpec {
            css: css.to_string(),
            text_contains: None,
            has: None,
        },
        confidence,
        validation,
    }
}

/// Built-in strategy table. Per (platform, content type) the list is ordered
/// by descending confidence; that ordering is the tie-break rule and the
/// detector walks it top to bottom.
pub fn builtin_strategies() -> StrategyTable {
    let mut table = StrategyTable::new();

    table.insert(
        ("twitter".into(), "post".into()),
        vec![
            strategy(
                "data-testid-tweet-text",
                r#"[data-testid="tweetText"]"#,
                0.95,
                StrategyValidation {
                    required_attributes: vec!["data-testid".into()],
                    ..Default::default()
                },
            ),
            strategy(
                "article-lang-div",
                r#"article div[lang]"#,
                0.75,
                StrategyValidation {
                    required_attributes: vec!["lang".into()],
                    structure_path: Some("article > div".into()),
                    ..Default::default()
                },
            ),
            strategy(
                "article-fallback",
                "article",
                0.4,
                StrategyValidation {
                    min_text_length: 20,
                    ..Default::default()
                },
            ),
        ],
    );

    table.insert(
        ("twitter".into(), "engagement".into()),
        vec![
            strategy(
                "data-testid-like-count",
                r#"[data-testid="like"] span"#,
                0.9,
                StrategyValidation {
                    text_pattern: Some(r"^\s*[\d.,]+\s*[KkMm万億]?\s*$".into()),
                    min_text_length: 1,
                    ..Default::default()
                },
            ),
            strategy(
                "aria-label-count",
                r#"[aria-label*="Like"]"#,
                0.6,
                StrategyValidation {
                    required_attributes: vec!["aria-label".into()],
                    min_text_length: 1,
                    ..Default::default()
                },
            ),
        ],
    );

    table.insert(
        ("facebook".into(), "post".into()),
        vec![
            strategy(
                "data-ad-preview-message",
                r#"[data-ad-preview="message"]"#,
                0.9,
                StrategyValidation::default(),
            ),
            strategy(
                "role-article-dir-auto",
                r#"[role="article"] div[dir="auto"]"#,
                0.7,
                StrategyValidation::default(),
            ),
            strategy(
                "role-article-fallback",
                r#"[role="article"]"#,
                0.4,
                StrategyValidation {
                    min_text_length: 20,
                    ..Default::default()
                },
            ),
        ],
    );

    table.insert(
        ("instagram".into(), "caption".into()),
        vec![
            strategy(
                "h1-caption",
                "article h1",
                0.85,
                StrategyValidation::default(),
            ),
            strategy(
                "article-first-span",
                "article span",
                0.5,
                StrategyValidation {
                    min_text_length: 12,
                    ..Default::default()
                },
            ),
        ],
    );

    table.insert(
        ("reddit".into(), "post".into()),
        vec![
            strategy(
                "shreddit-post-body",
                r#"shreddit-post [slot="text-body"]"#,
                0.9,
                StrategyValidation::default(),
            ),
            strategy(
                "post-rtjson-content",
                r#"[data-post-click-location="text-body"]"#,
                0.7,
                StrategyValidation::default(),
            ),
            strategy(
                "generic-post-container",
                r#"div[data-testid="post-container"]"#,
                0.5,
                StrategyValidation {
                    min_text_length: 20,
                    ..Default::default()
                },
            ),
        ],
    );

    table.insert(
        ("generic".into(), "article".into()),
        vec![
            strategy(
                "semantic-article",
                "article",
                0.8,
                StrategyValidation {
                    min_text_length: 80,
                    ..Default::default()
                },
            ),
            strategy(
                "main-content",
                r#"main, [role="main"]"#,
                0.6,
                StrategyValidation {
                    min_text_length: 80,
                    ..Default::default()
                },
            ),
            strategy(
                "content-class",
                ".content, .post, .entry-content, #content",
                0.4,
                StrategyValidation {
                    min_text_length: 80,
                    ..Default::default()
                },
            ),
        ],
    );

    for strategies in table.values_mut() {
        strategies.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_confidence_ordered() {
        for (key, strategies) in builtin_strategies() {
            assert!(!strategies.is_empty(), "empty table for {key:?}");
            for pair in strategies.windows(2) {
                assert!(
                    pair[0].confidence >= pair[1].confidence,
                    "unordered strategies for {key:?}"
                );
            }
        }
    }

    #[test]
    fn test_default_validation_carries_the_text_floor() {
        let programmatic = StrategyValidation::default();
        let deserialized: StrategyValidation = serde_json::from_str("{}").unwrap();
        assert_eq!(
            programmatic.min_text_length,
            deserialized.min_text_length
        );
        assert!(programmatic.min_text_length > 0);
    }

    #[test]
    fn test_builtin_post_strategies_require_nontrivial_text() {
        let table = builtin_strategies();
        let posts = &table[&("twitter".to_string(), "post".to_string())];
        for strategy in posts {
            assert!(
                strategy.validation.min_text_length > 1,
                "{} accepts trivial text",
                strategy.name
            );
        }
    }

    #[test]
    fn test_strategy_roundtrips_through_json() {
        let table = builtin_strategies();
        let json = serde_json::to_string(&table.values().next().unwrap()).unwrap();
        let back: Vec<SelectorStrategy> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), table.values().next().unwrap().len());
    }
}
