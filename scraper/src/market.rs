//! Crawl the commercial truck market listing and date every article on it.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::browser::{settle, Browser};
use crate::extract::{Extraction, Extractor, MonthStyle, Strategy};
use crate::page;
use crate::table::{ResultTable, Row};

pub const MARKET_URL: &str = "https://www.jdpowervalues.com/commercial-truck-market";

#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub base_url: String,
    /// Pagination stops here even if pages keep producing new links
    pub max_pages: usize,
    pub page_settle: Duration,
    pub article_settle: Duration,
    pub progress_path: PathBuf,
    pub output_path: PathBuf,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            base_url: MARKET_URL.to_string(),
            max_pages: 10,
            page_settle: Duration::from_secs(5),
            article_settle: Duration::from_secs(3),
            progress_path: PathBuf::from("truck_market_dates_progress.csv"),
            output_path: PathBuf::from("truck_market_dates.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRow {
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Year")]
    pub year: String,
}

impl Row for ArticleRow {
    const HEADERS: &'static [&'static str] = &["Link", "Month", "Year"];

    fn link(&self) -> &str {
        &self.link
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages: usize,
    pub added: usize,
    pub undated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Page 0 is the listing itself, later pages use `?page=N`.
pub fn page_url(base_url: &str, page_num: usize) -> String {
    if page_num == 0 {
        base_url.to_string()
    } else {
        format!("{}?page={}", base_url, page_num)
    }
}

/// Publication date of an article page: a written-out date anywhere in the
/// markup, otherwise the first date element holding a month name and a year.
pub fn article_date(html: &str, today: NaiveDate) -> Option<Extraction> {
    let in_markup = Extractor::new(&[Strategy::WrittenDate]);
    if let Some(found) = in_markup.detect_at(html, today) {
        return Some(found);
    }

    let in_elements = Extractor::new(&[Strategy::MonthWithYear]);
    page::date_element_texts(html).iter().find_map(|text| {
        log::debug!("Found potential date element: '{}'", text);
        in_elements.detect_at(text, today)
    })
}

fn visit_article(
    browser: &mut dyn Browser,
    url: &str,
    config: &MarketConfig,
    today: NaiveDate,
) -> Result<ArticleRow> {
    browser
        .navigate(url)
        .with_context(|| format!("Failed to load {}", url))?;
    log::info!("Processing: {}", url);
    settle(config.article_settle);

    let html = browser
        .page_source()
        .with_context(|| format!("Failed to read page source of {}", url))?;

    let row = match article_date(&html, today) {
        Some(found) => {
            let month = found.date.month_label(MonthStyle::Full).unwrap_or_default();
            let year = found.date.year_label().unwrap_or_default();
            log::info!("Found date: {} {} on {} ({})", month, year, url, found.strategy);
            ArticleRow {
                link: url.to_string(),
                month: month.to_string(),
                year,
            }
        }
        None => {
            log::info!("No date found on {}", url);
            ArticleRow {
                link: url.to_string(),
                month: String::new(),
                year: String::new(),
            }
        }
    };
    Ok(row)
}

/// Walk listing pages until one yields no unseen article links or the page
/// ceiling is hit, adding a row per article to `table`.
///
/// Links already in `table` (from an earlier run) are not visited again.
/// Progress is flushed after every listing page.
pub fn crawl(
    browser: &mut dyn Browser,
    table: &mut ResultTable<ArticleRow>,
    config: &MarketConfig,
    today: NaiveDate,
) -> Result<CrawlSummary> {
    let mut summary = CrawlSummary::default();
    let mut seen: HashSet<String> = HashSet::new();

    for page_num in 0..config.max_pages {
        let url = page_url(&config.base_url, page_num);
        if let Err(err) = browser.navigate(&url) {
            log::warn!("Failed to load page {} ({}): {}", page_num, url, err);
            continue;
        }
        log::info!("Loaded page {}: {}", page_num, url);
        settle(config.page_settle);

        match browser.title() {
            Ok(title) => log::debug!("Page title: {}", title),
            Err(err) => log::debug!("No page title: {}", err),
        }

        let anchors = match browser.anchors() {
            Ok(anchors) => anchors,
            Err(err) => {
                log::warn!("Failed to read links on page {}: {}", page_num, err);
                continue;
            }
        };
        log::info!("Found {} total links on page {}", anchors.len(), page_num);

        let links = page::article_links(&anchors, &config.base_url);
        let new_links: Vec<String> = links
            .iter()
            .filter(|link| !seen.contains(*link))
            .cloned()
            .collect();

        if new_links.is_empty() {
            log::info!("No new links found on page {}. Stopping pagination.", page_num);
            break;
        }
        log::info!(
            "Found {} article links on page {} ({} new)",
            links.len(),
            page_num,
            new_links.len()
        );
        seen.extend(links);

        for link in &new_links {
            if table.contains_link(link) {
                log::info!("Skipping already processed URL: {}", link);
                summary.skipped += 1;
                continue;
            }
            match visit_article(browser, link, config, today) {
                Ok(row) => {
                    if row.month.is_empty() && row.year.is_empty() {
                        summary.undated += 1;
                    }
                    table.push(row);
                    summary.added += 1;
                }
                Err(err) => {
                    log::warn!("Error processing {}: {:#}", link, err);
                    summary.failed += 1;
                }
            }
        }

        summary.pages += 1;
        match table.flush() {
            Ok(()) => log::info!("Progress saved after page {}", page_num),
            Err(err) => log::error!("Failed to save progress after page {}: {:#}", page_num, err),
        }
    }

    table
        .flush_to(&config.output_path)
        .with_context(|| format!("Failed to save {}", config.output_path.display()))?;
    log::info!("Results saved to {}", config.output_path.display());

    Ok(summary)
}
