// src/extractors/record.rs

pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_DEADLINE: &str = "Not specified";

const TITLE_MAX_CHARS: usize = 200;
const DESCRIPTION_MAX_CHARS: usize = 500;

/// One opportunity found on a page. Built once per kept candidate, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpportunityRecord {
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub url: String,
    pub category: String,
}

impl OpportunityRecord {
    /// Applies truncation and the sentinel values for missing fields.
    pub fn new(
        title: &str,
        description: &str,
        deadline: Option<&str>,
        url: String,
        category: String,
    ) -> Self {
        let description = if description.is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            truncate_chars(description, DESCRIPTION_MAX_CHARS)
        };

        Self {
            title: truncate_chars(title, TITLE_MAX_CHARS),
            description,
            deadline: deadline.unwrap_or(NO_DEADLINE).to_string(),
            url,
            category,
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_for_missing_fields() {
        let record = OpportunityRecord::new(
            "Data Intern",
            "",
            None,
            "https://example.org/jobs/7".to_string(),
            "Job".to_string(),
        );
        assert_eq!(record.description, NO_DESCRIPTION);
        assert_eq!(record.deadline, NO_DEADLINE);
    }

    #[test]
    fn test_truncation_counts_characters() {
        let title = "é".repeat(250);
        let description = "x".repeat(600);
        let record = OpportunityRecord::new(
            &title,
            &description,
            Some("01/02/2030"),
            "https://example.org/a".to_string(),
            "Job".to_string(),
        );
        assert_eq!(record.title.chars().count(), 200);
        assert_eq!(record.description.len(), 500);
        assert_eq!(record.deadline, "01/02/2030");
    }
}
