pub mod browser;
pub mod extract;
pub mod guidelines;
pub mod io;
pub mod market;
pub mod operator;
pub mod page;
pub mod search;
pub mod table;
#[cfg(feature = "webdriver")]
pub mod webdriver;

#[cfg(test)]
pub mod tests;

// Re-export key types and functions for easier access
pub use crate::browser::{fetch_html, Browser, BrowserArgs, BrowserError, HttpBrowser};
pub use crate::extract::{
    extract, extract_at, ExtractedDate, Extraction, Extractor, MonthStyle, Strategy,
};
pub use crate::operator::{Checkpoint, ConsoleOperator, Operator};
pub use crate::table::{ResultTable, Row};

/// Log to stderr at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
}
