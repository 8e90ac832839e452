// src/crawler/mod.rs
pub mod client;
pub mod models;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::extractors::record::NO_DEADLINE;
use crate::extractors::{categorize, OpportunityExtractor, OpportunityRecord, OTHER_CATEGORY};
use crate::utils::error::FetchError;
use crate::utils::html_debug;
use models::CrawlRow;

static PAGE_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to compile PAGE_TITLE_SELECTOR")
});

static META_DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="description"]"#).expect("Failed to compile META_DESCRIPTION_SELECTOR")
});

/// Anything that can hand back the HTML body for a URL.
pub trait PageSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// Drives fetching and extraction over a list of URLs, one page at a time.
pub struct Crawler<S> {
    source: S,
    extractor: OpportunityExtractor,
    delay: Duration,
    debug_dir: Option<PathBuf>,
}

impl<S: PageSource> Crawler<S> {
    pub fn new(source: S, extractor: OpportunityExtractor, delay: Duration) -> Self {
        Self { source, extractor, delay, debug_dir: None }
    }

    /// Save every fetched page (raw and annotated) under `dir`.
    pub fn with_debug_dir(mut self, dir: PathBuf) -> Self {
        self.debug_dir = Some(dir);
        self
    }

    /// Crawls `urls` in order. Pages that fail to load become error rows;
    /// they never abort the run.
    pub async fn crawl(&self, urls: &[String]) -> Vec<CrawlRow> {
        let total = urls.len();
        let mut rows = Vec::new();

        for (i, url) in urls.iter().enumerate() {
            tracing::info!("Crawling {}/{}: {}", i + 1, total, url);

            match self.source.fetch(url).await {
                Ok(html) => {
                    if let Some(dir) = &self.debug_dir {
                        match html_debug::save_page_debug(dir, i, url, &html) {
                            Ok(path) => tracing::info!("Created annotated debug HTML: {}", path.display()),
                            Err(e) => tracing::warn!("Failed to create debug HTML: {}", e),
                        }
                    }
                    let page_rows = self.process_page(&html, url, Local::now().naive_local());
                    tracing::info!("Found {} opportunities on {}", page_rows.len(), url);
                    rows.extend(page_rows);
                }
                Err(e) => {
                    tracing::error!("Error crawling {}: {}", url, e);
                    rows.push(CrawlRow::fetch_error(url, &e.to_string(), &Utc::now().to_rfc3339()));
                }
            }

            if !self.delay.is_zero() && i + 1 < total {
                tokio::time::sleep(self.delay).await;
            }
        }

        rows
    }

    /// Extracts rows from one fetched page. Falls back to classifying the page
    /// itself when the extractor finds nothing.
    pub fn process_page(&self, html: &str, url: &str, now: NaiveDateTime) -> Vec<CrawlRow> {
        let document = Html::parse_document(html);

        let mut records = self.extractor.extract(&document, url, now);
        if records.is_empty() {
            tracing::debug!("No listings extracted from {}, classifying the page itself", url);
            records.extend(page_fallback(&document, url));
        }

        let crawled_at = Utc::now().to_rfc3339();
        records
            .into_iter()
            .map(|record| CrawlRow::from_record(record, &crawled_at))
            .collect()
    }
}

/// Treats the page as a single opportunity using its title and meta description.
/// Both are written as found on the page, with no truncation.
pub fn page_fallback(document: &Html, url: &str) -> Option<OpportunityRecord> {
    let title = document
        .select(&PAGE_TITLE_SELECTOR)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "No title".to_string());

    let description = document
        .select(&META_DESCRIPTION_SELECTOR)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_else(|| "No description".to_string());

    let category = categorize(&format!("{} {} {}", title, description, url));
    if category == OTHER_CATEGORY {
        return None;
    }

    Some(OpportunityRecord {
        title,
        description,
        deadline: NO_DEADLINE.to_string(),
        url: url.to_string(),
        category,
    })
}
