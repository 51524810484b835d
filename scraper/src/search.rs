//! Scrape links from a few pages of web search results.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::browser::{settle, Browser, BrowserError};
use crate::extract::{Extractor, MonthStyle};
use crate::io::write_artifact;
use crate::operator::{await_operator, Checkpoint, Operator};
use crate::page;
use crate::table::{ResultTable, Row};

pub const SEARCH_URL: &str = "https://www.google.com/search";
const RESULTS_PER_PAGE: usize = 10;

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub pages: usize,
    pub settle: Duration,
    pub output_path: PathBuf,
    /// Screenshots and raw markup of pages that produced nothing
    pub artifact_dir: PathBuf,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            pages: 4,
            settle: Duration::from_secs(3),
            output_path: PathBuf::from("search_results.csv"),
            artifact_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRow {
    pub title: String,
    pub link: String,
    pub page: usize,
    pub month: String,
    pub year: String,
}

impl Row for SearchRow {
    const HEADERS: &'static [&'static str] = &["title", "link", "page", "month", "year"];

    fn link(&self) -> &str {
        &self.link
    }
}

/// Results page `page` (1-based) for `query`.
pub fn search_page_url(query: &str, page: usize) -> String {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    let start = page.saturating_sub(1) * RESULTS_PER_PAGE;
    if start > 0 {
        format!("{}?q={}&start={}", SEARCH_URL, encoded, start)
    } else {
        format!("{}?q={}", SEARCH_URL, encoded)
    }
}

/// Rows for every result on one results page, dated from the link alone.
pub fn page_rows(html: &str, page_num: usize, today: NaiveDate) -> Vec<SearchRow> {
    let extractor = Extractor::default();
    page::search_results(html)
        .into_iter()
        .map(|hit| {
            let date = extractor.extract_at(&hit.link, today);
            SearchRow {
                month: date
                    .month_label(MonthStyle::Abbrev)
                    .unwrap_or_default()
                    .to_string(),
                year: date.year_label().unwrap_or_default(),
                title: hit.title,
                link: hit.link,
                page: page_num,
            }
        })
        .collect()
}

/// One line per row: "1. [Page 1] Title (Mar 2021) - https://..."
pub fn preview(rows: &[SearchRow], count: usize) -> Vec<String> {
    rows.iter()
        .take(count)
        .enumerate()
        .map(|(i, row)| {
            let date_info = if row.month.is_empty() && row.year.is_empty() {
                String::new()
            } else {
                format!(" ({} {})", row.month, row.year)
            };
            format!(
                "{}. [Page {}] {}{} - {}",
                i + 1,
                row.page,
                row.title,
                date_info,
                row.link
            )
        })
        .collect()
}

fn capture(browser: &mut dyn Browser, config: &SearchConfig, name: &str) {
    let path = config.artifact_dir.join(name);
    match browser.screenshot(&path) {
        Ok(()) => log::info!("Saved screenshot {}", path.display()),
        Err(BrowserError::Unsupported(_)) => log::debug!("Screenshots unavailable, skipping {}", name),
        Err(err) => log::warn!("Failed to save screenshot {}: {}", path.display(), err),
    }
}

/// Run `query`, let the operator clear any verification challenge, then
/// collect results from each page into `table`, saving after every page.
///
/// Returns `false` if the operator stopped the run at the checkpoint.
pub fn run(
    browser: &mut dyn Browser,
    operator: &mut dyn Operator,
    query: &str,
    table: &mut ResultTable<SearchRow>,
    config: &SearchConfig,
    today: NaiveDate,
) -> Result<bool> {
    let first_page = search_page_url(query, 1);
    log::info!("Searching for: {}", query);
    if let Err(err) = browser.navigate(&first_page) {
        log::warn!("Failed to load {}: {}", first_page, err);
    }
    settle(config.settle);

    let checkpoint = await_operator(
        operator,
        "If you see a CAPTCHA or verification prompt, please complete it now.",
    )?;
    if checkpoint == Checkpoint::Abort {
        log::info!("Stopped by operator before extraction");
        return Ok(false);
    }

    for page_num in 1..=config.pages {
        if page_num > 1 {
            let url = search_page_url(query, page_num);
            log::info!("Navigating to page {} with URL: {}", page_num, url);
            if let Err(err) = browser.navigate(&url) {
                log::warn!("Failed to load page {}: {}", page_num, err);
                continue;
            }
            settle(config.settle);

            match browser.current_url() {
                Ok(current) if !current.contains("start=") => {
                    log::warn!("URL doesn't contain 'start=' parameter: {}", current);
                    capture(browser, config, &format!("page{}_debug.png", page_num));
                }
                Ok(_) => {}
                Err(err) => log::warn!("Could not read current URL: {}", err),
            }
        }

        capture(browser, config, &format!("page{}_results.png", page_num));

        let html = match browser.page_source() {
            Ok(html) => html,
            Err(err) => {
                log::warn!("Failed to read results page {}: {}", page_num, err);
                continue;
            }
        };

        let rows = page_rows(&html, page_num, today);
        if rows.is_empty() {
            let name = format!("debug_web_page_{}.html", page_num);
            match write_artifact(&config.artifact_dir, &name, html.as_bytes()) {
                Ok(path) => log::info!(
                    "No results found for web search, page {}. Page source saved to {}",
                    page_num,
                    path.display()
                ),
                Err(err) => log::warn!("Failed to save page source: {:#}", err),
            }
        }
        log::info!("Found {} results on web search page {}.", rows.len(), page_num);

        for row in rows {
            table.push(row);
        }
        if !table.is_empty() {
            if let Err(err) = table.flush() {
                log::error!("Failed to save results: {:#}", err);
            }
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_page_url() {
        assert_eq!(
            search_page_url("commercial truck guidelines", 1),
            "https://www.google.com/search?q=commercial+truck+guidelines"
        );
        assert_eq!(
            search_page_url("a&b", 3),
            "https://www.google.com/search?q=a%26b&start=20"
        );
    }

    #[test]
    fn test_preview_formats_dates() {
        let rows = vec![
            SearchRow {
                title: "Guide".into(),
                link: "https://a.example/03.2021.pdf".into(),
                page: 1,
                month: "Mar".into(),
                year: "2021".into(),
            },
            SearchRow {
                title: "Other".into(),
                link: "https://a.example/x".into(),
                page: 2,
                month: String::new(),
                year: String::new(),
            },
        ];
        assert_eq!(
            preview(&rows, 5),
            vec![
                "1. [Page 1] Guide (Mar 2021) - https://a.example/03.2021.pdf".to_string(),
                "2. [Page 2] Other - https://a.example/x".to_string(),
            ]
        );
        assert_eq!(preview(&rows, 1).len(), 1);
    }
}
