// src/utils/html_debug.rs
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use regex::Regex;
use url::Url;

use crate::utils::error::AppError;

/// Patterns highlighted in annotated debug pages: (regex, highlight type).
pub const DEBUG_PATTERNS: &[(&str, &str)] = &[
    (r"(?i)(?:deadline|due|closes?|expires?|apply by)[:\s]*\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}", "deadline"),
    (r"(?i)(?:deadline|due)[:\s]*\d{1,2}\s+[a-z]+\s+\d{2,4}", "deadline"),
    (r#"(?i)<(?:div|li|section|article)[^>]*class=["'][^"']*(?:job-listing|opportunity|vacancy|scholarship|grant|fellowship|training|course|program|competition|challenge|listing|post|entry)[^"']*["'][^>]*>"#, "container"),
    (r#"(?i)<article[^>]*>"#, "container"),
    (r#"(?i)<a[^>]*href=["'][^"']*(?:job|career|scholarship|grant|funding|training|course|program|competition|challenge|hackathon|apply|opportunity)[^"']*["'][^>]*>"#, "link"),
];

/// Saves a HTML document to a file with debug highlights.
/// Overlapping highlights after the first are skipped.
pub fn save_debug_html(html: &str, filename: &Path, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let mut file = File::create(filename)?;

    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".highlight-deadline { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-container { outline: 2px solid #90EE90; }\n");
    debug_html.push_str(".highlight-link { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0);

    for (start, end, highlight_type) in sorted_highlights {
        if start < last_pos || end > html.len() {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);

        let css_class = match highlight_type {
            "deadline" => "highlight-deadline",
            "container" => "highlight-container",
            "link" => "highlight-link",
            _ => "highlight-custom",
        };

        debug_html.push_str(&format!("<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, start, end, highlight_type));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");

        last_pos = end;
    }

    if last_pos < html.len() {
        debug_html.push_str(&html[last_pos..]);
    }
    debug_html.push_str("\n</body>\n</html>");

    file.write_all(debug_html.as_bytes())?;

    tracing::debug!("Saved debug HTML to {}", filename.display());
    Ok(())
}

/// Creates a debug version of an HTML document with the matches of `patterns` highlighted.
pub fn create_debug_html(html: &str, filename: &Path, patterns: &[(&str, &str)]) -> Result<(), AppError> {
    let mut highlights = Vec::new();

    for (pattern, highlight_type) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
    }

    save_debug_html(html, filename, &highlights)
}

/// Writes the raw page and its annotated copy into `debug_dir`, returning the annotated path.
pub fn save_page_debug(debug_dir: &Path, index: usize, url: &str, html: &str) -> Result<PathBuf, AppError> {
    fs::create_dir_all(debug_dir)?;

    let stem = debug_file_stem(index, url);
    fs::write(debug_dir.join(format!("{}.html", stem)), html)?;

    let annotated = debug_dir.join(format!("{}_annotated.html", stem));
    create_debug_html(html, &annotated, DEBUG_PATTERNS)?;
    Ok(annotated)
}

fn debug_file_stem(index: usize, url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "page".to_string());
    let host: String = host
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{:03}_{}", index + 1, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("opportunity_crawler_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_annotated_page_wraps_matches() {
        let dir = temp_dir("html_debug");
        let html = r#"<div class="job-listing"><a href="/jobs/1">Engineer</a><p>Deadline: 01/02/2030</p></div>"#;

        let annotated = save_page_debug(&dir, 0, "https://jobs.example.org/list", html).unwrap();
        assert!(annotated.ends_with("001_jobs.example.org_annotated.html"));
        assert!(dir.join("001_jobs.example.org.html").exists());

        let content = fs::read_to_string(&annotated).unwrap();
        assert!(content.contains(r#"<span class="highlight-deadline""#));
        assert!(content.contains(r#"<span class="highlight-container""#));
        assert!(content.contains(r#"<span class="highlight-link""#));
        assert!(content.contains("Engineer"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let dir = temp_dir("html_debug_bad");
        fs::create_dir_all(&dir).unwrap();
        let result = create_debug_html("<p>x</p>", &dir.join("x.html"), &[("(", "custom")]);
        assert!(matches!(result, Err(AppError::Config(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_debug_file_stem_without_host() {
        assert_eq!(debug_file_stem(4, "not a url"), "005_page");
    }
}
