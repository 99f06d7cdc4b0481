use crate::drift::strategy::{
    SelectorStrategy, StrategyTable, StrategyValidation, builtin_strategies,
};
use crate::drift::telemetry::{DriftEvent, DriftTelemetry};
use crate::storage::{KeyValueStore, Namespace};
use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Storage key holding persisted strategy-table overrides.
pub const OVERRIDES_KEY: &str = "drift/strategy_overrides";

/// Outcome of one detection attempt, including the telemetry the caller
/// needs to understand how degraded the match was.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub element_html: Option<String>,
    pub element_text: Option<String>,
    pub strategy: Option<String>,
    pub confidence: f64,
    /// True whenever anything but the top-ranked strategy produced the match,
    /// including total failure.
    pub fallback_used: bool,
    pub attempted_strategies: Vec<String>,
    pub detection_time_ms: u64,
}

impl DetectionResult {
    pub fn found(&self) -> bool {
        self.strategy.is_some()
    }
}

/// Locates content elements in arbitrary, changing page structures by walking
/// an ordered, confidence-ranked strategy chain. Page structures shift
/// without notice; a single selector breaks silently, while this chain
/// degrades gracefully and measures every degradation.
pub struct SelectorDriftDetector {
    strategies: StrategyTable,
    telemetry: Arc<DriftTelemetry>,
}

impl SelectorDriftDetector {
    pub fn new(telemetry: Arc<DriftTelemetry>) -> Self {
        Self {
            strategies: builtin_strategies(),
            telemetry,
        }
    }

    /// Build a detector whose built-in table is overlaid with any persisted
    /// strategy updates, so selectors can be refreshed without a code change.
    pub async fn with_overrides(
        telemetry: Arc<DriftTelemetry>,
        store: &dyn KeyValueStore,
    ) -> Self {
        // Overrides are stored as a JSON object keyed "platform/content_type".
        type Overrides = std::collections::HashMap<String, Vec<SelectorStrategy>>;

        let mut detector = Self::new(telemetry);
        match store.get(Namespace::Local, OVERRIDES_KEY).await {
            Ok(Some(value)) => match serde_json::from_value::<Overrides>(value) {
                Ok(overrides) => {
                    for (key, mut strategies) in overrides {
                        let Some((platform, content_type)) = key.split_once('/') else {
                            warn!(key, "skipping override with malformed key");
                            continue;
                        };
                        strategies.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
                        detector
                            .strategies
                            .insert((platform.to_string(), content_type.to_string()), strategies);
                    }
                }
                Err(e) => warn!(error = %e, "ignoring malformed strategy overrides"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not load strategy overrides"),
        }
        detector
    }

    /// Try each strategy for (platform, content type) in descending-confidence
    /// order against the given document; first validated match wins. Total
    /// failure yields an empty result with zero confidence and records a
    /// drift event either way when degradation occurred.
    #[instrument(skip(self, html))]
    pub fn detect_content(
        &self,
        platform: &str,
        content_type: &str,
        html: &str,
    ) -> DetectionResult {
        let started = Instant::now();
        let key = (platform.to_string(), content_type.to_string());
        let strategies = self.strategies.get(&key).map(Vec::as_slice).unwrap_or(&[]);

        let document = Html::parse_document(html);
        let mut attempted = Vec::new();

        for (rank, strategy) in strategies.iter().enumerate() {
            attempted.push(strategy.name.clone());
            if let Some(element) = locate(&document, strategy) {
                let fallback_used = rank > 0;
                let result = DetectionResult {
                    element_html: Some(element.html()),
                    element_text: Some(element_text(&element)),
                    strategy: Some(strategy.name.clone()),
                    confidence: strategy.confidence,
                    fallback_used,
                    attempted_strategies: attempted.clone(),
                    detection_time_ms: started.elapsed().as_millis() as u64,
                };
                debug!(
                    strategy = %strategy.name,
                    confidence = strategy.confidence,
                    fallback_used,
                    "content element located"
                );
                if fallback_used {
                    self.record_drift(platform, content_type, &result);
                }
                return result;
            }
        }

        let result = DetectionResult {
            element_html: None,
            element_text: None,
            strategy: None,
            confidence: 0.0,
            fallback_used: true,
            attempted_strategies: attempted,
            detection_time_ms: started.elapsed().as_millis() as u64,
        };
        warn!(platform, content_type, "all selector strategies failed");
        self.record_drift(platform, content_type, &result);
        result
    }

    fn record_drift(&self, platform: &str, content_type: &str, result: &DetectionResult) {
        self.telemetry.record(DriftEvent {
            platform: platform.to_string(),
            content_type: content_type.to_string(),
            attempted_strategies: result.attempted_strategies.clone(),
            successful_strategy: result.strategy.clone(),
            fallback_used: result.fallback_used,
            detection_time_ms: result.detection_time_ms,
            at: Utc::now(),
        });
    }
}

/// Find the first candidate for a strategy that passes its filters and
/// validation requirements.
fn locate<'a>(document: &'a Html, strategy: &SelectorStrategy) -> Option<ElementRef<'a>> {
    let selector = match Selector::parse(&strategy.spec.css) {
        Ok(s) => s,
        Err(_) => {
            warn!(strategy = %strategy.name, css = %strategy.spec.css, "unparseable selector");
            return None;
        }
    };

    let has_selector = strategy
        .spec
        .has
        .as_deref()
        .and_then(|css| Selector::parse(css).ok());

    document
        .select(&selector)
        .filter(|el| {
            if let Some(needle) = strategy.spec.text_contains.as_deref() {
                if !element_text(el).contains(needle) {
                    return false;
                }
            }
            if let Some(has) = &has_selector {
                if el.select(has).next().is_none() {
                    return false;
                }
            }
            true
        })
        .find(|el| validate(el, &strategy.validation))
}

fn validate(element: &ElementRef, validation: &StrategyValidation) -> bool {
    for attr in &validation.required_attributes {
        if element.value().attr(attr).is_none() {
            return false;
        }
    }

    let text = element_text(element);

    if text.chars().count() < validation.min_text_length {
        return false;
    }

    if let Some(pattern) = validation.text_pattern.as_deref() {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(&text) => {}
            Ok(_) => return false,
            Err(_) => return false,
        }
    }

    if let Some(path) = validation.structure_path.as_deref() {
        if !ancestry_matches(element, path) {
            return false;
        }
    }

    // A parsed document has no layout; "rendered" means not explicitly hidden.
    !is_hidden(element)
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Check that the element's ancestor tag names end with the given
/// `>`-separated chain, innermost last (e.g. "article > div").
fn ancestry_matches(element: &ElementRef, path: &str) -> bool {
    let wanted: Vec<&str> = path.split('>').map(str::trim).collect();
    if wanted.is_empty() {
        return true;
    }

    let mut chain: Vec<String> = vec![element.value().name().to_lowercase()];
    let mut node = element.parent();
    while let Some(parent) = node {
        if let Some(el) = ElementRef::wrap(parent) {
            chain.push(el.value().name().to_lowercase());
        }
        node = parent.parent();
    }
    chain.reverse();

    if wanted.len() > chain.len() {
        return false;
    }
    chain[chain.len() - wanted.len()..]
        .iter()
        .zip(wanted.iter())
        .all(|(actual, want)| actual == want)
}

/// Hidden-ness is inherited, so walk the element and all its ancestors.
fn is_hidden(element: &ElementRef) -> bool {
    if element_is_hidden(element) {
        return true;
    }
    let mut node = element.parent();
    while let Some(parent) = node {
        if let Some(el) = ElementRef::wrap(parent) {
            if element_is_hidden(&el) {
                return true;
            }
        }
        node = parent.parent();
    }
    false
}

fn element_is_hidden(element: &ElementRef) -> bool {
    let value = element.value();
    if value.attr("hidden").is_some() {
        return true;
    }
    if value.attr("aria-hidden") == Some("true") {
        return true;
    }
    if let Some(style) = value.attr("style") {
        let style = style.replace(' ', "").to_lowercase();
        if style.contains("display:none") || style.contains("visibility:hidden") {
            return true;
        }
    }
    false
}
