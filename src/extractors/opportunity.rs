// src/extractors/opportunity.rs

// --- Imports ---
use std::collections::HashSet;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use url::Url;

use crate::extractors::categorize::{categorize, OTHER_CATEGORY};
use crate::extractors::deadline::{extract_deadline, is_passed};
use crate::extractors::record::OpportunityRecord;
use crate::utils::error::ExtractError;

// --- Constants ---
const CONTAINER_SCAN_LIMIT: usize = 8;
const LINK_SCAN_LIMIT: usize = 10;
const FALLBACK_THRESHOLD: usize = 5;
const MAX_RESULTS: usize = 12;
const MIN_LINK_TEXT_LEN: usize = 5;

/// Semantic containers scanned in phase one, in priority order.
pub const DEFAULT_CONTAINER_SELECTORS: &[&str] = &[
    ".job-listing", ".opportunity", ".vacancy", ".position",
    ".scholarship", ".grant", ".fellowship", ".training",
    ".course", ".program", ".competition", ".challenge",
    ".job-item", ".career-item", ".listing", ".post",
    "article", ".entry", ".content-item",
];

/// Anchors scanned in the link fallback, keyed by href substring.
pub const DEFAULT_LINK_SELECTORS: &[&str] = &[
    r#"a[href*="job"]"#, r#"a[href*="career"]"#, r#"a[href*="vacancy"]"#,
    r#"a[href*="scholarship"]"#, r#"a[href*="grant"]"#, r#"a[href*="funding"]"#,
    r#"a[href*="training"]"#, r#"a[href*="course"]"#, r#"a[href*="program"]"#,
    r#"a[href*="competition"]"#, r#"a[href*="challenge"]"#, r#"a[href*="hackathon"]"#,
    r#"a[href*="apply"]"#, r#"a[href*="opportunity"]"#,
];

// --- CSS Selectors (Lazy Static) ---
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, a")
        .expect("Failed to compile TITLE_SELECTOR")
});

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").expect("Failed to compile LINK_SELECTOR")
});

static CONTAINER_DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p, .description, .summary, .excerpt")
        .expect("Failed to compile CONTAINER_DESCRIPTION_SELECTOR")
});

static PARENT_DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p, .description, .summary")
        .expect("Failed to compile PARENT_DESCRIPTION_SELECTOR")
});

// --- Configuration ---
/// Tuning knobs for the extractor. Defaults reproduce the stock heuristics;
/// any key missing from a config file keeps its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub container_selectors: Vec<String>,
    pub link_selectors: Vec<String>,
    pub container_scan_limit: usize,
    pub link_scan_limit: usize,
    pub fallback_threshold: usize,
    pub max_results: usize,
    pub min_link_text_len: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            container_selectors: DEFAULT_CONTAINER_SELECTORS.iter().map(|s| s.to_string()).collect(),
            link_selectors: DEFAULT_LINK_SELECTORS.iter().map(|s| s.to_string()).collect(),
            container_scan_limit: CONTAINER_SCAN_LIMIT,
            link_scan_limit: LINK_SCAN_LIMIT,
            fallback_threshold: FALLBACK_THRESHOLD,
            max_results: MAX_RESULTS,
            min_link_text_len: MIN_LINK_TEXT_LEN,
        }
    }
}

// A selector compiled up front. A bad selector is kept as an error so it
// fails on its own scan attempt without affecting the others.
struct CompiledSelector {
    source: String,
    compiled: Result<Selector, ExtractError>,
}

impl CompiledSelector {
    fn new(source: &str) -> Self {
        let compiled = Selector::parse(source).map_err(|e| ExtractError::InvalidSelector {
            selector: source.to_string(),
            reason: format!("{:?}", e),
        });
        if let Err(e) = &compiled {
            tracing::warn!("{}", e);
        }
        Self { source: source.to_string(), compiled }
    }

    fn get(&self) -> Result<&Selector, ExtractError> {
        self.compiled.as_ref().map_err(Clone::clone)
    }
}

/// Resolves candidate hrefs for one page.
struct PageBase {
    origin: String,
}

impl PageBase {
    fn new(base_url: &str) -> Self {
        let origin = match Url::parse(base_url) {
            Ok(url) if url.has_host() => url.origin().ascii_serialization(),
            _ => base_url.trim_end_matches('/').to_string(),
        };
        Self { origin }
    }

    /// Anything starting with `/` is joined onto the page origin, so a link
    /// never leaves the page's host unless it is spelled out in full.
    /// Absolute http(s) links pass through; anything else is rejected.
    fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.starts_with('/') {
            Some(format!("{}{}", self.origin, href))
        } else if href.starts_with("http") {
            Some(href.to_string())
        } else {
            None
        }
    }
}

// --- Main Extractor Structure ---
pub struct OpportunityExtractor {
    config: ExtractorConfig,
    containers: Vec<CompiledSelector>,
    links: Vec<CompiledSelector>,
}

impl Default for OpportunityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl OpportunityExtractor {
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        let containers = config.container_selectors.iter().map(|s| CompiledSelector::new(s)).collect();
        let links = config.link_selectors.iter().map(|s| CompiledSelector::new(s)).collect();
        Self { config, containers, links }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts opportunities from a parsed page, judging deadlines against `now`.
    ///
    /// Container scan first; the link scan only runs when the containers yield
    /// fewer than `fallback_threshold` records. Output keeps discovery order,
    /// has unique URLs and at most `max_results` entries.
    pub fn extract(&self, document: &Html, base_url: &str, now: NaiveDateTime) -> Vec<OpportunityRecord> {
        let base = PageBase::new(base_url);
        let mut kept: Vec<OpportunityRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for selector in &self.containers {
            match self.scan_containers(document, selector, &base, &seen, now) {
                Ok(found) => absorb(&mut kept, &mut seen, found),
                Err(e) => tracing::debug!("Skipping container selector '{}': {}", selector.source, e),
            }
        }
        tracing::debug!("Container scan kept {} candidates for {}", kept.len(), base_url);

        if kept.len() < self.config.fallback_threshold {
            for selector in &self.links {
                match self.scan_links(document, selector, &base, &seen, now) {
                    Ok(found) => absorb(&mut kept, &mut seen, found),
                    Err(e) => tracing::debug!("Skipping link selector '{}': {}", selector.source, e),
                }
            }
            tracing::debug!("After link fallback {} candidates for {}", kept.len(), base_url);
        }

        finalize(kept, self.config.max_results)
    }

    /// Phase one: heading-or-link titled containers.
    fn scan_containers(
        &self,
        document: &Html,
        selector: &CompiledSelector,
        base: &PageBase,
        seen: &HashSet<String>,
        now: NaiveDateTime,
    ) -> Result<Vec<OpportunityRecord>, ExtractError> {
        let css = selector.get()?;
        let mut found = Vec::new();
        let mut local_seen: HashSet<String> = HashSet::new();

        for element in document.select(css).take(self.config.container_scan_limit) {
            let Some(title_element) = element.select(&TITLE_SELECTOR).next() else {
                continue;
            };
            let title = clean_text(title_element);
            if title.is_empty() {
                continue;
            }

            let href = if title_element.value().name() == "a" {
                title_element.value().attr("href")
            } else {
                element
                    .select(&LINK_SELECTOR)
                    .next()
                    .and_then(|a| a.value().attr("href"))
            };
            let Some(url) = href.and_then(|h| base.resolve(h)) else {
                tracing::trace!("No resolvable link for '{}'", title);
                continue;
            };
            if seen.contains(&url) || local_seen.contains(&url) {
                continue;
            }

            let description = element
                .select(&CONTAINER_DESCRIPTION_SELECTOR)
                .next()
                .map(clean_text)
                .unwrap_or_default();

            let full_text: String = element.text().collect();
            let deadline = extract_deadline(&full_text);
            if is_passed(deadline.as_deref(), now) {
                tracing::trace!("Dropping '{}': deadline {:?} has passed", title, deadline);
                continue;
            }

            let category = categorize(&format!("{} {}", title, description));
            if category == OTHER_CATEGORY {
                continue;
            }

            local_seen.insert(url.clone());
            found.push(OpportunityRecord::new(&title, &description, deadline.as_deref(), url, category));
        }

        Ok(found)
    }

    /// Phase two: anchors whose href mentions an opportunity keyword.
    fn scan_links(
        &self,
        document: &Html,
        selector: &CompiledSelector,
        base: &PageBase,
        seen: &HashSet<String>,
        now: NaiveDateTime,
    ) -> Result<Vec<OpportunityRecord>, ExtractError> {
        let css = selector.get()?;
        let mut found = Vec::new();
        let mut local_seen: HashSet<String> = HashSet::new();

        for anchor in document.select(css).take(self.config.link_scan_limit) {
            let href = anchor.value().attr("href").unwrap_or_default();
            if href.trim().is_empty() {
                continue;
            }

            let link_text = clean_text(anchor);
            if link_text.chars().count() < self.config.min_link_text_len {
                continue;
            }

            let Some(url) = base.resolve(href) else {
                continue;
            };
            if seen.contains(&url) || local_seen.contains(&url) {
                continue;
            }

            let parent = anchor.parent().and_then(ElementRef::wrap);
            let description = parent
                .and_then(|p| p.select(&PARENT_DESCRIPTION_SELECTOR).next())
                .map(clean_text)
                .unwrap_or_default();
            let surrounding_text: String = parent.map(|p| p.text().collect()).unwrap_or_default();

            let deadline = extract_deadline(&surrounding_text);
            if is_passed(deadline.as_deref(), now) {
                tracing::trace!("Dropping link '{}': deadline {:?} has passed", link_text, deadline);
                continue;
            }

            let category = categorize(&link_text);
            if category == OTHER_CATEGORY {
                continue;
            }

            local_seen.insert(url.clone());
            found.push(OpportunityRecord::new(&link_text, &description, deadline.as_deref(), url, category));
        }

        Ok(found)
    }
}

fn absorb(kept: &mut Vec<OpportunityRecord>, seen: &mut HashSet<String>, found: Vec<OpportunityRecord>) {
    for record in found {
        seen.insert(record.url.clone());
        kept.push(record);
    }
}

/// First occurrence of a URL wins; the rest is cut at `max_results`.
fn finalize(records: Vec<OpportunityRecord>, max_results: usize) -> Vec<OpportunityRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.url.clone()))
        .take(max_results)
        .collect()
}

/// Element text with whitespace runs collapsed.
fn clean_text(element: ElementRef) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}
