// src/crawler/models.rs
use crate::extractors::record::{OpportunityRecord, NO_DEADLINE};
use crate::utils::error::StorageError;

/// Column order shared by the CSV sink and any spreadsheet import.
pub const CSV_HEADERS: [&str; 6] = [
    "opportunity_title",
    "description",
    "deadline",
    "link",
    "category",
    "crawled_at",
];

pub const ERROR_TITLE: &str = "ERROR";
pub const ERROR_CATEGORY: &str = "Error";
pub const ERROR_DEADLINE: &str = "N/A";

/// One output row: an opportunity, or the error marker for a page that failed to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRow {
    pub opportunity_title: String,
    pub description: String,
    pub deadline: String,
    pub link: String,
    pub category: String,
    pub crawled_at: String,
}

impl CrawlRow {
    pub fn from_record(record: OpportunityRecord, crawled_at: &str) -> Self {
        Self {
            opportunity_title: record.title,
            description: record.description,
            deadline: record.deadline,
            link: record.url,
            category: record.category,
            crawled_at: crawled_at.to_string(),
        }
    }

    pub fn fetch_error(url: &str, message: &str, crawled_at: &str) -> Self {
        Self {
            opportunity_title: ERROR_TITLE.to_string(),
            description: message.to_string(),
            deadline: ERROR_DEADLINE.to_string(),
            link: url.to_string(),
            category: ERROR_CATEGORY.to_string(),
            crawled_at: crawled_at.to_string(),
        }
    }

    /// Fields in `CSV_HEADERS` order.
    pub fn fields(&self) -> [&str; 6] {
        [
            self.opportunity_title.as_str(),
            self.description.as_str(),
            self.deadline.as_str(),
            self.link.as_str(),
            self.category.as_str(),
            self.crawled_at.as_str(),
        ]
    }

    pub fn from_fields(fields: Vec<String>) -> Result<Self, StorageError> {
        let count = fields.len();
        let [opportunity_title, description, deadline, link, category, crawled_at]: [String; 6] =
            fields.try_into().map_err(|_| {
                StorageError::CsvFormat(format!("expected {} columns, found {}", CSV_HEADERS.len(), count))
            })?;

        Ok(Self { opportunity_title, description, deadline, link, category, crawled_at })
    }

    pub fn is_error(&self) -> bool {
        self.category == ERROR_CATEGORY
    }

    pub fn has_deadline(&self) -> bool {
        !self.deadline.is_empty() && self.deadline != NO_DEADLINE && self.deadline != ERROR_DEADLINE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_row_shape() {
        let row = CrawlRow::fetch_error("https://down.example.org", "HTTP error: 500", "2026-01-01T00:00:00+00:00");
        assert_eq!(row.opportunity_title, "ERROR");
        assert_eq!(row.deadline, "N/A");
        assert!(row.is_error());
        assert!(!row.has_deadline());
    }

    #[test]
    fn test_from_fields_checks_column_count() {
        let short = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(CrawlRow::from_fields(short), Err(StorageError::CsvFormat(_))));

        let full: Vec<String> = ["t", "d", "01/02/2030", "https://x.org", "Job", "now"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row = CrawlRow::from_fields(full).unwrap();
        assert_eq!(row.fields()[3], "https://x.org");
        assert!(row.has_deadline());
    }
}
