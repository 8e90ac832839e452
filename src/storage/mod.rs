// src/storage/mod.rs
pub mod csv;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::crawler::models::{CrawlRow, CSV_HEADERS};
use crate::report::CrawlSummary;
use crate::utils::error::StorageError;

const RESULTS_PREFIX: &str = "opportunities_";

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes the results table to `opportunities_<timestamp>.csv`.
    /// If that file is locked, falls back to `opportunities_backup_<timestamp>.csv`.
    pub fn save_results(&self, rows: &[CrawlRow], timestamp: &str) -> Result<PathBuf, StorageError> {
        let content = render_csv(rows);
        let primary = self.base_dir.join(format!("{}{}.csv", RESULTS_PREFIX, timestamp));

        match fs::write(&primary, &content) {
            Ok(()) => {
                tracing::info!("Saved {} rows to {}", rows.len(), primary.display());
                Ok(primary)
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                let backup = self.base_dir.join(format!("{}backup_{}.csv", RESULTS_PREFIX, timestamp));
                tracing::warn!("{} is locked ({}), writing {} instead", primary.display(), e, backup.display());
                fs::write(&backup, &content).map_err(StorageError::IoError)?;
                tracing::info!("Saved {} rows to {}", rows.len(), backup.display());
                Ok(backup)
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    /// Saves the crawl summary next to the results as JSON.
    pub fn save_run_metadata(&self, summary: &CrawlSummary, timestamp: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}{}_meta.json", RESULTS_PREFIX, timestamp));

        let metadata = serde_json::json!({
            "summary": summary,
            "csv_columns": CSV_HEADERS,
            "generated_at": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved run metadata to {}", file_path.display());
        Ok(file_path)
    }

    /// Most recent results file by name (timestamps sort lexicographically).
    pub fn latest_results_file(&self) -> Result<PathBuf, StorageError> {
        let mut candidates: Vec<PathBuf> = fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with(RESULTS_PREFIX) && name.ends_with(".csv"))
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort();

        candidates
            .pop()
            .ok_or_else(|| StorageError::NoResultsFile(self.base_dir.display().to_string()))
    }
}

/// Reads the crawl list: one URL per line, blank lines ignored.
pub fn load_urls<P: AsRef<Path>>(path: P) -> Result<Vec<String>, StorageError> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Loads a results file written by `save_results`.
pub fn load_results<P: AsRef<Path>>(path: P) -> Result<Vec<CrawlRow>, StorageError> {
    let content = fs::read_to_string(path.as_ref())?;
    let mut records = csv::parse(&content)?.into_iter();

    let header = records
        .next()
        .ok_or_else(|| StorageError::CsvFormat("empty file".to_string()))?;
    if header != CSV_HEADERS {
        return Err(StorageError::CsvFormat(format!("unexpected header: {}", header.join(","))));
    }

    records
        .filter(|record| !(record.len() == 1 && record[0].is_empty()))
        .map(CrawlRow::from_fields)
        .collect()
}

fn render_csv(rows: &[CrawlRow]) -> String {
    let mut out = String::new();
    csv::write_line(&mut out, &CSV_HEADERS);
    for row in rows {
        csv::write_line(&mut out, &row.fields());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("opportunity_crawler_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn row(title: &str, category: &str, deadline: &str) -> CrawlRow {
        CrawlRow {
            opportunity_title: title.to_string(),
            description: "Line one, with comma\nline \"two\"".to_string(),
            deadline: deadline.to_string(),
            link: format!("https://example.org/{}", title.len()),
            category: category.to_string(),
            crawled_at: "2026-10-19T09:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_results_written_and_read_back() {
        let dir = temp_dir("storage_results");
        let storage = StorageManager::new(&dir).unwrap();
        let rows = vec![
            row("Data Fellowship", "Scholarship", "01/03/2030"),
            row("Hackathon", "Competition", "Not specified"),
        ];

        let path = storage.save_results(&rows, "20261019_090000").unwrap();
        assert_eq!(path.file_name().unwrap(), "opportunities_20261019_090000.csv");

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("opportunity_title,description,deadline,link,category,crawled_at\r\n"));

        assert_eq!(load_results(&path).unwrap(), rows);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_latest_results_file_picks_newest() {
        let dir = temp_dir("storage_latest");
        let storage = StorageManager::new(&dir).unwrap();
        assert!(matches!(storage.latest_results_file(), Err(StorageError::NoResultsFile(_))));

        storage.save_results(&[], "20250101_000000").unwrap();
        storage.save_results(&[], "20260101_000000").unwrap();
        storage.save_run_metadata(&CrawlSummary::from_rows(&[], 0), "20270101_000000").unwrap();

        let latest = storage.latest_results_file().unwrap();
        assert_eq!(latest.file_name().unwrap(), "opportunities_20260101_000000.csv");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_urls_skips_blank_lines() {
        let dir = temp_dir("storage_urls");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("urls.txt");
        fs::write(&path, "https://a.example.org\n\n   \n  https://b.example.org/jobs  \n").unwrap();

        let urls = load_urls(&path).unwrap();
        assert_eq!(urls, vec!["https://a.example.org", "https://b.example.org/jobs"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_results_rejects_foreign_header() {
        let dir = temp_dir("storage_header");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("opportunities_x.csv");
        fs::write(&path, "name,url\r\nfoo,bar\r\n").unwrap();

        assert!(matches!(load_results(&path), Err(StorageError::CsvFormat(_))));
        let _ = fs::remove_dir_all(&dir);
    }
}
