//! Month/year detection for URLs, link text and page markup.
//!
//! An [`Extractor`] holds an ordered list of [`Strategy`] matchers. Each one is
//! a pure function from text (plus today's date) to an optional
//! [`ExtractedDate`]; the first strategy that matches wins. A miss is not an
//! error, it is [`ExtractedDate::UNKNOWN`].

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, Local, Month, NaiveDate};
use regex::Regex;

const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";

const CALENDAR: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

// "March 15, 2023"
static WRITTEN_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"({MONTHS})\s+\d{{1,2}},\s+(\d{{4}})")).unwrap());

// Separators are tried in this order, not by position in the text
static NUMERIC_TOKEN_RES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"(\d{1,2})\.(\d{4})",
        r"(\d{1,2})/(\d{4})",
        r"(\d{1,2})-(\d{4})",
        r"(\d{1,2})_(\d{4})",
    ]
    .map(|pattern| Regex::new(pattern).unwrap())
});

// Matched against lowercased text
static NAMED_TOKEN_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        r"(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[^a-z].*?(\d{4})",
        r"(january|february|march|april|may|june|july|august|september|october|november|december)[^a-z].*?(\d{4})",
    ]
    .map(|pattern| Regex::new(pattern).unwrap())
});

static GUIDELINE_PHRASE_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        format!(
            r"(?i)(?:Download the|Read the)(?: free)?(?: monthly)? (?:({MONTHS})(?: (\d{{4}}))?) Commercial Truck Guidelines"
        ),
        format!(r"(?i)({MONTHS}) (\d{{4}}) Commercial Truck Guidelines"),
    ]
    .map(|pattern| Regex::new(&pattern).unwrap())
});

static MONTH_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"({MONTHS})")).unwrap());

static CENTURY_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(20\d{2})\b").unwrap());

static MONTHLY_REPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)free monthly (?:commercial truck )?report").unwrap());

/// How a caller wants months written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthStyle {
    /// "March"
    #[default]
    Full,
    /// "Mar"
    Abbrev,
}

impl MonthStyle {
    pub fn render(self, month: Month) -> &'static str {
        match self {
            MonthStyle::Full => month.name(),
            MonthStyle::Abbrev => &month.name()[..3],
        }
    }
}

/// A month and year pulled out of some text. Either half may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractedDate {
    pub month: Option<Month>,
    pub year: Option<i32>,
}

impl ExtractedDate {
    pub const UNKNOWN: ExtractedDate = ExtractedDate {
        month: None,
        year: None,
    };

    pub fn new(month: Month, year: i32) -> Self {
        ExtractedDate {
            month: Some(month),
            year: Some(year),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.month.is_none() && self.year.is_none()
    }

    /// Fill in the year from `today` when a month was found without one.
    pub fn or_current_year(self, today: NaiveDate) -> Self {
        match (self.month, self.year) {
            (Some(month), None) => ExtractedDate::new(month, today.year()),
            _ => self,
        }
    }

    pub fn month_label(&self, style: MonthStyle) -> Option<&'static str> {
        self.month.map(|month| style.render(month))
    }

    /// Four digits, so a token like "0999" comes back the way it was written.
    pub fn year_label(&self) -> Option<String> {
        self.year.map(|year| format!("{:04}", year))
    }
}

/// One matcher in the extraction chain. Declaration order is priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// "March 15, 2023" anywhere in a blob of text
    WrittenDate,
    /// `MM.YYYY`, `MM/YYYY`, `MM-YYYY` or `MM_YYYY`
    NumericToken,
    /// "mar_2021", "december-report-2020"
    NamedToken,
    /// "Download the free monthly March 2023 Commercial Truck Guidelines"
    GuidelinePhrase,
    /// "free monthly report", dated today
    MonthlyReport,
    /// A month name and a 20xx year anywhere, in either order: "2023 · March".
    /// Meant for short date elements, so it is not in the default chain.
    MonthWithYear,
}

impl Strategy {
    /// What [`Extractor::default`] runs, in order.
    pub const DEFAULT_CHAIN: [Strategy; 5] = [
        Strategy::WrittenDate,
        Strategy::NumericToken,
        Strategy::NamedToken,
        Strategy::GuidelinePhrase,
        Strategy::MonthlyReport,
    ];

    pub fn apply(self, text: &str, today: NaiveDate) -> Option<ExtractedDate> {
        match self {
            Strategy::WrittenDate => written_date(text),
            Strategy::NumericToken => numeric_token(text),
            Strategy::NamedToken => named_token(text),
            Strategy::GuidelinePhrase => guideline_phrase(text),
            Strategy::MonthlyReport => monthly_report(text, today),
            Strategy::MonthWithYear => month_with_year(text),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::WrittenDate => "written date",
            Strategy::NumericToken => "numeric month token",
            Strategy::NamedToken => "named month token",
            Strategy::GuidelinePhrase => "guideline phrase",
            Strategy::MonthlyReport => "monthly report phrase",
            Strategy::MonthWithYear => "month and year",
        };
        f.write_str(name)
    }
}

/// A successful match and the strategy that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction {
    pub date: ExtractedDate,
    pub strategy: Strategy,
}

/// Ordered, first-match-wins chain of strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extractor {
    strategies: Vec<Strategy>,
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor::new(&Strategy::DEFAULT_CHAIN)
    }
}

impl Extractor {
    pub fn new(strategies: &[Strategy]) -> Self {
        Extractor {
            strategies: strategies.to_vec(),
        }
    }

    pub fn detect_at(&self, text: &str, today: NaiveDate) -> Option<Extraction> {
        self.strategies.iter().find_map(|&strategy| {
            strategy.apply(text, today).map(|date| Extraction {
                date: date.or_current_year(today),
                strategy,
            })
        })
    }

    pub fn extract_at(&self, text: &str, today: NaiveDate) -> ExtractedDate {
        self.detect_at(text, today)
            .map(|extraction| extraction.date)
            .unwrap_or(ExtractedDate::UNKNOWN)
    }
}

/// Run the full strategy chain against `text` using the local date.
pub fn extract(text: &str) -> ExtractedDate {
    extract_at(text, Local::now().date_naive())
}

pub fn extract_at(text: &str, today: NaiveDate) -> ExtractedDate {
    Extractor::default().extract_at(text, today)
}

/// "3" or "03" to March; anything outside 1-12 is `None`.
pub fn month_from_number(number: &str) -> Option<Month> {
    let n: usize = number.parse().ok()?;
    n.checked_sub(1).and_then(|idx| CALENDAR.get(idx)).copied()
}

/// Full month name or its three letter abbreviation, any case.
pub fn month_from_name(name: &str) -> Option<Month> {
    let lower = name.to_ascii_lowercase();
    CALENDAR.iter().copied().find(|month| {
        let full = month.name().to_ascii_lowercase();
        lower == full || (lower.len() == 3 && full.starts_with(&lower))
    })
}

pub fn current_month(today: NaiveDate) -> Month {
    CALENDAR[today.month0() as usize]
}

fn parse_year(digits: &str) -> Option<i32> {
    digits.parse().ok()
}

fn written_date(text: &str) -> Option<ExtractedDate> {
    let caps = WRITTEN_DATE_RE.captures(text)?;
    Some(ExtractedDate {
        month: month_from_name(&caps[1]),
        year: parse_year(&caps[2]),
    })
}

// Only the first token per separator counts; a bad month there moves on to
// the next separator, never to a later token
fn numeric_token(text: &str) -> Option<ExtractedDate> {
    NUMERIC_TOKEN_RES.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let month = month_from_number(&caps[1])?;
        Some(ExtractedDate::new(month, parse_year(&caps[2])?))
    })
}

fn named_token(text: &str) -> Option<ExtractedDate> {
    let lower = text.to_lowercase();
    NAMED_TOKEN_RES.iter().find_map(|re| {
        let caps = re.captures(&lower)?;
        let month = month_from_name(&caps[1])?;
        Some(ExtractedDate::new(month, parse_year(&caps[2])?))
    })
}

fn guideline_phrase(text: &str) -> Option<ExtractedDate> {
    GUIDELINE_PHRASE_RES.iter().find_map(|re| {
        let caps = re.captures(text)?;
        Some(ExtractedDate {
            month: month_from_name(&caps[1]),
            year: caps.get(2).and_then(|m| parse_year(m.as_str())),
        })
    })
}

fn month_with_year(text: &str) -> Option<ExtractedDate> {
    let month = MONTH_NAME_RE.captures(text)?;
    let year = CENTURY_YEAR_RE.captures(text)?;
    Some(ExtractedDate::new(
        month_from_name(&month[1])?,
        parse_year(&year[1])?,
    ))
}

fn monthly_report(text: &str, today: NaiveDate) -> Option<ExtractedDate> {
    if MONTHLY_REPORT_RE.is_match(text) {
        Some(ExtractedDate::new(current_month(today), today.year()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 9).unwrap()
    }

    #[test]
    fn test_numeric_token_in_pdf_url() {
        let date = extract_at(
            "https://example.com/files/03.2021_Commercial_Truck_Guidelines.pdf",
            today(),
        );
        assert_eq!(date, ExtractedDate::new(Month::March, 2021));
        assert_eq!(date.month_label(MonthStyle::Full), Some("March"));
        assert_eq!(date.year_label().as_deref(), Some("2021"));
    }

    #[test]
    fn test_numeric_token_separators() {
        assert_eq!(
            extract_at("/reports/11/2019/summary", today()),
            ExtractedDate::new(Month::November, 2019)
        );
        assert_eq!(
            extract_at("report-7-2020.pdf", today()),
            ExtractedDate::new(Month::July, 2020)
        );
        assert_eq!(
            extract_at("guide_12_2022.pdf", today()),
            ExtractedDate::new(Month::December, 2022)
        );
    }

    #[test]
    fn test_numeric_token_rejects_bad_month() {
        assert_eq!(numeric_token("/files/13.2021_guide.pdf"), None);
        assert_eq!(numeric_token("/files/00.2021_guide.pdf"), None);
        assert_eq!(extract_at("/files/13.2021_guide.pdf", today()), ExtractedDate::UNKNOWN);
    }

    #[test]
    fn test_numeric_token_only_first_token_per_separator() {
        assert_eq!(numeric_token("/files/13.2021/05.2020.pdf"), None);
        assert_eq!(
            extract_at("/files/13.2021/05.2020.pdf", today()),
            ExtractedDate::UNKNOWN
        );
        // A later separator still gets its own first token
        assert_eq!(
            numeric_token("/files/13.2021/report-06-2019"),
            Some(ExtractedDate::new(Month::June, 2019))
        );
    }

    #[test]
    fn test_numeric_token_bad_month_falls_through_to_named() {
        let found = Extractor::default()
            .detect_at("/files/13.2021/april-edition-2020", today())
            .unwrap();
        assert_eq!(found.strategy, Strategy::NamedToken);
        assert_eq!(found.date, ExtractedDate::new(Month::April, 2020));
    }

    #[test]
    fn test_named_token_abbreviation() {
        let date = extract_at("https://example.com/uploads/guide-sep_2018.pdf", today());
        assert_eq!(date, ExtractedDate::new(Month::September, 2018));
        assert_eq!(date.month_label(MonthStyle::Abbrev), Some("Sep"));
    }

    #[test]
    fn test_named_token_full_name_any_case() {
        assert_eq!(
            extract_at("https://example.com/news/DECEMBER-market-update-2020", today()),
            ExtractedDate::new(Month::December, 2020)
        );
    }

    #[test]
    fn test_named_token_needs_separator_after_month() {
        // "mar" inside "summary" is not a month
        assert_eq!(named_token("/summary_2021"), None);
    }

    #[test]
    fn test_written_date_wins_over_later_tokens() {
        let found = Extractor::default()
            .detect_at("<p>Published March 15, 2023</p><a href='/04.2020'>old</a>", today())
            .unwrap();
        assert_eq!(found.strategy, Strategy::WrittenDate);
        assert_eq!(found.date, ExtractedDate::new(Month::March, 2023));
    }

    #[test]
    fn test_written_date_first_occurrence() {
        assert_eq!(
            written_date("June 1, 2021 ... August 30, 2022"),
            Some(ExtractedDate::new(Month::June, 2021))
        );
    }

    #[test]
    fn test_guideline_phrase_with_year() {
        let date = extract_at(
            "Download the free monthly February 2023 Commercial Truck Guidelines",
            today(),
        );
        assert_eq!(date, ExtractedDate::new(Month::February, 2023));
    }

    #[test]
    fn test_guideline_phrase_without_year_uses_current_year() {
        let found = Extractor::default()
            .detect_at("Read the free October Commercial Truck Guidelines", today())
            .unwrap();
        assert_eq!(found.strategy, Strategy::GuidelinePhrase);
        assert_eq!(found.date, ExtractedDate::new(Month::October, 2024));
    }

    #[test]
    fn test_guideline_phrase_is_case_insensitive() {
        assert_eq!(
            guideline_phrase("download the MAY commercial truck guidelines"),
            Some(ExtractedDate {
                month: Some(Month::May),
                year: None
            })
        );
    }

    #[test]
    fn test_monthly_report_uses_today() {
        let found = Extractor::default()
            .detect_at("Get our free monthly report", today())
            .unwrap();
        assert_eq!(found.strategy, Strategy::MonthlyReport);
        assert_eq!(found.date, ExtractedDate::new(Month::July, 2024));
    }

    #[test]
    fn test_month_with_year_any_order() {
        assert_eq!(
            month_with_year("2023 · March"),
            Some(ExtractedDate::new(Month::March, 2023))
        );
        assert_eq!(
            month_with_year("Updated in October 2022"),
            Some(ExtractedDate::new(Month::October, 2022))
        );
        // Needs both halves, a capitalised month and a whole 20xx year
        assert_eq!(month_with_year("March 1999"), None);
        assert_eq!(month_with_year("march 2023"), None);
        assert_eq!(month_with_year("March 20231"), None);
        assert!(!Strategy::DEFAULT_CHAIN.contains(&Strategy::MonthWithYear));
    }

    #[test]
    fn test_no_signal_is_unknown() {
        let date = extract_at("https://example.com/about-us", today());
        assert!(date.is_unknown());
        assert_eq!(date.month_label(MonthStyle::Full), None);
        assert_eq!(date.year_label(), None);
    }

    #[test]
    fn test_restricted_extractor_skips_other_strategies() {
        let extractor = Extractor::new(&[Strategy::WrittenDate]);
        assert_eq!(extractor.detect_at("/files/03.2021.pdf", today()), None);
    }

    #[test]
    fn test_month_lookup() {
        assert_eq!(month_from_number("03"), Some(Month::March));
        assert_eq!(month_from_number("12"), Some(Month::December));
        assert_eq!(month_from_number("0"), None);
        assert_eq!(month_from_number("13"), None);
        assert_eq!(month_from_name("FEB"), Some(Month::February));
        assert_eq!(month_from_name("february"), Some(Month::February));
        assert_eq!(month_from_name("febr"), None);
    }

    #[test]
    fn test_year_label_keeps_four_digits() {
        let date = ExtractedDate::new(Month::January, 999);
        assert_eq!(date.year_label().as_deref(), Some("0999"));
    }
}
