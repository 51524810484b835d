//! Find the monthly "Commercial Truck Guidelines" downloads on the industry
//! guidelines page.

use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::{Datelike, Month, NaiveDate};
use regex::Regex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::browser::fetch_html;
use crate::extract::{month_from_name, month_from_number, ExtractedDate, MonthStyle, Strategy};
use crate::page::{self, Anchor};
use crate::table::Row;

pub const GUIDELINES_BASE_URL: &str = "https://www.jdpowervalues.com";
pub const GUIDELINES_PATH: &str = "/industry-guidelines";

static GUIDELINE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d{2})\.(\d{4})_Commercial\s*Truck").unwrap());

static GUIDELINE_URL_LOOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{2})\.(\d{4}).*(?:Commercial.*Truck|Truck.*Guidelines)").unwrap()
});

static ARTICLE_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)/article/.*(?:january|february|march|april|may|june|july|august|september|october|november|december).*(?:truck|auction)",
    )
    .unwrap()
});

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

#[derive(Debug, Clone)]
pub struct GuidelinesConfig {
    pub base_url: String,
    pub page_path: String,
    pub output_path: PathBuf,
}

impl Default for GuidelinesConfig {
    fn default() -> Self {
        GuidelinesConfig {
            base_url: GUIDELINES_BASE_URL.to_string(),
            page_path: GUIDELINES_PATH.to_string(),
            output_path: PathBuf::from("commercial_truck_guidelines.csv"),
        }
    }
}

impl GuidelinesConfig {
    pub fn page_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.page_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelineRow {
    pub date_str: String,
    pub month: String,
    pub year: String,
    pub link: String,
}

impl Row for GuidelineRow {
    const HEADERS: &'static [&'static str] = &["date_str", "month", "year", "link"];

    fn link(&self) -> &str {
        &self.link
    }
}

/// Which rule recognised a link as a guideline download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    DatedFile,
    Phrase,
    ArticleUrl,
    MonthlyReport,
}

fn dated_file(href: &str) -> Option<ExtractedDate> {
    [&*GUIDELINE_URL_RE, &*GUIDELINE_URL_LOOSE_RE]
        .into_iter()
        .find_map(|re| {
            let caps = re.captures(href)?;
            let month = month_from_number(&caps[1])?;
            Some(ExtractedDate::new(month, caps[2].parse().ok()?))
        })
}

// Months are checked in calendar order, not by where they appear
fn article_month(href: &str) -> Option<Month> {
    if !ARTICLE_MONTH_RE.is_match(href) {
        return None;
    }
    let lower = href.to_lowercase();
    MONTH_NAMES
        .iter()
        .find(|name| lower.contains(*name))
        .and_then(|name| month_from_name(name))
}

/// Decide whether `anchor` is a guideline download and, if so, what month it
/// covers. Rules are tried in priority order; a year that can't be found is
/// taken to be the current one.
pub fn classify(anchor: &Anchor, today: NaiveDate) -> Option<(ExtractedDate, Match)> {
    if let Some(date) = dated_file(&anchor.href) {
        return Some((date, Match::DatedFile));
    }
    if let Some(date) = Strategy::GuidelinePhrase.apply(&anchor.text, today) {
        return Some((date.or_current_year(today), Match::Phrase));
    }
    if let Some(month) = article_month(&anchor.href) {
        return Some((ExtractedDate::new(month, today.year()), Match::ArticleUrl));
    }
    Strategy::MonthlyReport
        .apply(&anchor.text, today)
        .map(|date| (date, Match::MonthlyReport))
}

pub fn guideline_row(anchor: &Anchor, date: ExtractedDate, today: NaiveDate) -> GuidelineRow {
    let year = date
        .year_label()
        .unwrap_or_else(|| format!("{:04}", today.year()));
    let (month, date_str) = match date.month_label(MonthStyle::Full) {
        Some(month) => (month.to_string(), format!("{} {}", month, year)),
        None => ("Unknown".to_string(), format!("Unknown {}", year)),
    };
    GuidelineRow {
        date_str,
        month,
        year,
        link: anchor.href.clone(),
    }
}

/// Guideline rows for every matching link in `html`, in page order.
pub fn guideline_rows(html: &str, page_url: &str, today: NaiveDate) -> Vec<GuidelineRow> {
    let base = Url::parse(page_url).ok();
    page::anchors(html, base.as_ref())
        .iter()
        .filter(|anchor| !anchor.text.is_empty())
        .filter_map(|anchor| {
            let (date, rule) = classify(anchor, today)?;
            log::debug!("{:?} match: {} -> {:?}", rule, anchor.href, date);
            Some(guideline_row(anchor, date, today))
        })
        .collect()
}

/// Fetch the guidelines page and classify its links. A failed fetch is
/// logged and produces no rows.
pub fn scrape(client: &Client, config: &GuidelinesConfig, today: NaiveDate) -> Vec<GuidelineRow> {
    let url = config.page_url();
    log::info!("Fetching {}", url);
    match fetch_html(client, &url) {
        Ok(html) => guideline_rows(&html, &url, today),
        Err(err) => {
            log::error!("Error fetching the website: {}", err);
            Vec::new()
        }
    }
}
