// src/report.rs
use std::fmt::Write;

use serde::Serialize;

use crate::crawler::models::CrawlRow;
use crate::extractors::categorize::Category;

const UPCOMING_LIMIT: usize = 10;
const SHORT_TITLE_CHARS: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// End-of-crawl statistics, logged and saved as run metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlSummary {
    pub urls_crawled: usize,
    pub total_rows: usize,
    pub with_deadlines: usize,
    pub categories: Vec<CategoryCount>,
}

impl CrawlSummary {
    pub fn from_rows(rows: &[CrawlRow], urls_crawled: usize) -> Self {
        Self {
            urls_crawled,
            total_rows: rows.len(),
            with_deadlines: rows.iter().filter(|r| r.has_deadline()).count(),
            categories: count_categories(rows),
        }
    }

    pub fn log(&self) {
        tracing::info!("Opportunity categories found:");
        for entry in &self.categories {
            tracing::info!("  {}: {}", entry.category, entry.count);
        }
        tracing::info!("Opportunities with specified deadlines: {}", self.with_deadlines);
        tracing::info!("Total websites crawled: {}", self.urls_crawled);
        tracing::info!("Total opportunities extracted: {}", self.total_rows);
    }
}

/// Offline analysis of a saved results file.
#[derive(Debug, Clone)]
pub struct AnalysisReport<'a> {
    rows: &'a [CrawlRow],
    source: String,
    generated_at: String,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(rows: &'a [CrawlRow], source: &str, generated_at: &str) -> Self {
        Self {
            rows,
            source: source.to_string(),
            generated_at: generated_at.to_string(),
        }
    }

    /// First rows carrying a deadline, in file order.
    pub fn upcoming_deadlines(&self) -> Vec<&'a CrawlRow> {
        self.rows
            .iter()
            .filter(|r| r.has_deadline())
            .take(UPCOMING_LIMIT)
            .collect()
    }

    pub fn count_containing(&self, category: Category) -> usize {
        self.rows
            .iter()
            .filter(|r| r.category.contains(category.label()))
            .count()
    }

    pub fn render(&self) -> String {
        let total = self.rows.len();
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(out, "OPPORTUNITY SCRAPER ANALYSIS REPORT");
        let _ = writeln!(out, "{}", "=".repeat(50));
        let _ = writeln!(out, "Total Opportunities Found: {}", total);
        let _ = writeln!(out, "Data Source: {}", self.source);
        let _ = writeln!(out, "Analysis Time: {}", self.generated_at);

        let _ = writeln!(out, "\nCATEGORY BREAKDOWN:");
        for entry in count_categories(self.rows) {
            let percentage = entry.count as f64 / total as f64 * 100.0;
            let _ = writeln!(out, "  {:<25} {:>3} ({:5.1}%)", entry.category, entry.count, percentage);
        }

        let with_deadlines = self.rows.iter().filter(|r| r.has_deadline()).count();
        let _ = writeln!(out, "\nDEADLINE ANALYSIS:");
        let _ = writeln!(out, "  Opportunities with specific deadlines: {}", with_deadlines);
        let _ = writeln!(out, "  Opportunities without deadlines: {}", total - with_deadlines);

        let upcoming = self.upcoming_deadlines();
        if !upcoming.is_empty() {
            let _ = writeln!(out, "\nUPCOMING DEADLINES:");
            for row in upcoming {
                let _ = writeln!(out, "  {:<12} | {:<15} | {}", row.deadline, row.category, shorten(&row.opportunity_title));
            }
        }

        let errors = self.rows.iter().filter(|r| r.is_error()).count();
        if errors > 0 {
            let _ = writeln!(out, "\nCRAWLING ISSUES:");
            let _ = writeln!(out, "  {} websites had access issues (blocked, SSL errors, etc.)", errors);
        }

        let _ = writeln!(out, "\nQUICK FILTERS:");
        let _ = writeln!(out, "  Jobs & Careers: {} opportunities", self.count_containing(Category::Job));
        let _ = writeln!(out, "  Scholarships & Grants: {} opportunities", self.count_containing(Category::Scholarship));
        let _ = writeln!(out, "  Training & Education: {} opportunities", self.count_containing(Category::Training));
        let _ = writeln!(out, "  Competitions & Challenges: {} opportunities", self.count_containing(Category::Competition));

        out
    }
}

/// Counts per category string, highest first; ties keep first-seen order.
fn count_categories(rows: &[CrawlRow]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for row in rows {
        match counts.iter_mut().find(|c| c.category == row.category) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount { category: row.category.clone(), count: 1 }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

fn shorten(title: &str) -> String {
    if title.chars().count() > SHORT_TITLE_CHARS {
        format!("{}...", title.chars().take(SHORT_TITLE_CHARS).collect::<String>())
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, category: &str, deadline: &str) -> CrawlRow {
        CrawlRow {
            opportunity_title: title.to_string(),
            description: "desc".to_string(),
            deadline: deadline.to_string(),
            link: format!("https://example.org/{}", title.replace(' ', "-")),
            category: category.to_string(),
            crawled_at: "2026-10-19T09:00:00+00:00".to_string(),
        }
    }

    fn sample() -> Vec<CrawlRow> {
        vec![
            row("Backend Engineer", "Job", "Not specified"),
            row("STEM Scholarship", "Scholarship", "15/01/2027"),
            row("Rust Bootcamp", "Training", "sometime soon"),
            row("Hiring Fair Grant", "Job, Scholarship", "01/12/2026"),
            row("ERROR", "Error", "N/A"),
            row("Platform Engineer", "Job", "Not specified"),
        ]
    }

    #[test]
    fn test_summary_counts() {
        let rows = sample();
        let summary = CrawlSummary::from_rows(&rows, 4);
        assert_eq!(summary.total_rows, 6);
        assert_eq!(summary.urls_crawled, 4);
        assert_eq!(summary.with_deadlines, 3);
        assert_eq!(summary.categories[0], CategoryCount { category: "Job".to_string(), count: 2 });
        // ties keep first-seen order
        assert_eq!(summary.categories[1].category, "Scholarship");
    }

    #[test]
    fn test_upcoming_deadlines_keep_file_order() {
        let rows = sample();
        let report = AnalysisReport::new(&rows, "x.csv", "now");
        let titles: Vec<&str> = report
            .upcoming_deadlines()
            .into_iter()
            .map(|r| r.opportunity_title.as_str())
            .collect();
        assert_eq!(titles, vec!["STEM Scholarship", "Rust Bootcamp", "Hiring Fair Grant"]);
    }

    #[test]
    fn test_upcoming_deadlines_limited_to_ten() {
        let rows: Vec<CrawlRow> = (0..15)
            .map(|i| row(&format!("Grant {}", i), "Scholarship", &format!("{:02}/01/2099", i + 1)))
            .collect();
        let report = AnalysisReport::new(&rows, "x.csv", "now");
        let upcoming = report.upcoming_deadlines();
        assert_eq!(upcoming.len(), 10);
        assert_eq!(upcoming[0].opportunity_title, "Grant 0");
        assert_eq!(upcoming[9].opportunity_title, "Grant 9");
    }

    #[test]
    fn test_render_sections() {
        let rows = sample();
        let report = AnalysisReport::new(&rows, "output/opportunities_1.csv", "2026-10-19 09:00:00");
        let text = report.render();

        assert!(text.contains("Total Opportunities Found: 6"));
        assert!(text.contains("Data Source: output/opportunities_1.csv"));
        assert!(text.contains(&format!("  {:<25} {:>3} ({:5.1}%)", "Job", 2, 2.0 / 6.0 * 100.0)));
        assert!(text.contains("Opportunities with specific deadlines: 3"));
        assert!(text.contains("1 websites had access issues"));
        assert!(text.contains("Jobs & Careers: 3 opportunities"));
        assert!(text.contains("Scholarships & Grants: 2 opportunities"));
    }

    #[test]
    fn test_long_titles_are_shortened() {
        let long = "A".repeat(45);
        assert_eq!(shorten(&long), format!("{}...", "A".repeat(40)));
        assert_eq!(shorten("Short"), "Short");
    }
}
