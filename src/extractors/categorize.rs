// src/extractors/categorize.rs

/// Label returned when no keyword set matches.
pub const OTHER_CATEGORY: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Job,
    Scholarship,
    Training,
    Competition,
    Entrepreneurship,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Job => "Job",
            Category::Scholarship => "Scholarship",
            Category::Training => "Training",
            Category::Competition => "Competition",
            Category::Entrepreneurship => "Entrepreneurship",
        }
    }
}

// Table order is the output order.
const CATEGORY_KEYWORDS: [(Category, &[&str]); 5] = [
    (
        Category::Job,
        &["job", "career", "employment", "hiring", "vacancy", "position", "recruit", "work", "intern"],
    ),
    (
        Category::Scholarship,
        &["scholarship", "financial aid", "grant", "funding", "bursary", "fellowship"],
    ),
    (
        Category::Training,
        &["training", "course", "education", "learn", "bootcamp", "workshop", "skill", "certification"],
    ),
    (
        Category::Competition,
        &["competition", "challenge", "hackathon", "contest", "prize"],
    ),
    (
        Category::Entrepreneurship,
        &["entrepreneur", "startup", "business", "innovation", "venture"],
    ),
];

/// Returns every category whose keyword set has a substring hit in `text`.
pub fn categories(text: &str) -> Vec<Category> {
    let text_lower = text.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| text_lower.contains(kw)))
        .map(|(category, _)| *category)
        .collect()
}

/// Comma-joined category labels for `text`, or "Other" when nothing matches.
pub fn categorize(text: &str) -> String {
    let matched = categories(text);
    if matched.is_empty() {
        return OTHER_CATEGORY.to_string();
    }
    matched
        .iter()
        .map(Category::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_categories_keep_table_order() {
        assert_eq!(categorize("Apply for this Job Scholarship"), "Job, Scholarship");
        assert_eq!(categorize("Startup hackathon with prize and bootcamp"), "Training, Competition, Entrepreneurship");
    }

    #[test]
    fn test_unmatched_text_is_other() {
        assert_eq!(categorize("lorem ipsum"), OTHER_CATEGORY);
        assert_eq!(categorize(""), OTHER_CATEGORY);
    }

    #[test]
    fn test_substring_match_is_not_tokenized() {
        // "network" contains "work"
        assert_eq!(categorize("Networking evening"), "Job");
        assert_eq!(categories("FINANCIAL AID office"), vec![Category::Scholarship]);
    }
}
