use std::path::Path;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use url::Url;

use crate::page::{self, Anchor};

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("no page has been loaded yet")]
    NoPage,
    #[error("{0} is not supported by this browser")]
    Unsupported(&'static str),
    #[error("webdriver: {0}")]
    Driver(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// What the scrapers need from a browser. Every call blocks until done.
pub trait Browser {
    fn navigate(&mut self, url: &str) -> BrowserResult<()>;

    /// Fully rendered markup of the current page.
    fn page_source(&mut self) -> BrowserResult<String>;

    fn current_url(&mut self) -> BrowserResult<String>;

    fn title(&mut self) -> BrowserResult<String> {
        let html = self.page_source()?;
        Ok(page::title(&html).unwrap_or_default())
    }

    /// Anchors with their hrefs resolved to absolute URLs.
    fn anchors(&mut self) -> BrowserResult<Vec<Anchor>> {
        let html = self.page_source()?;
        let current = self.current_url()?;
        let base = Url::parse(&current).ok();
        Ok(page::anchors(&html, base.as_ref()))
    }

    fn screenshot(&mut self, path: &Path) -> BrowserResult<()>;

    fn close(&mut self) -> BrowserResult<()> {
        Ok(())
    }
}

/// Wait for the page to finish rendering.
pub fn settle(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

pub fn http_client() -> BrowserResult<Client> {
    Client::builder()
        .user_agent(concat!(
            "Mozilla/5.0 (compatible; ",
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION"),
            ")"
        ))
        .build()
        .map_err(|source| BrowserError::Http {
            url: String::new(),
            source,
        })
}

/// GET `url` and return the body. Non-2xx responses are errors.
pub fn fetch_html(client: &Client, url: &str) -> BrowserResult<String> {
    let http_err = |source| BrowserError::Http {
        url: url.to_string(),
        source,
    };
    let response = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(http_err)?;
    response.text().map_err(http_err)
}

/// A browser that only speaks HTTP: no scripts run, and there is nothing to
/// take a screenshot of.
pub struct HttpBrowser {
    client: Client,
    current: Option<(String, String)>,
}

impl HttpBrowser {
    pub fn new() -> BrowserResult<Self> {
        Ok(HttpBrowser {
            client: http_client()?,
            current: None,
        })
    }
}

impl Browser for HttpBrowser {
    fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        Url::parse(url).map_err(|source| BrowserError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let http_err = |source| BrowserError::Http {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(http_err)?;
        let final_url = response.url().to_string();
        let html = response.text().map_err(http_err)?;
        self.current = Some((final_url, html));
        Ok(())
    }

    fn page_source(&mut self) -> BrowserResult<String> {
        self.current
            .as_ref()
            .map(|(_, html)| html.clone())
            .ok_or(BrowserError::NoPage)
    }

    fn current_url(&mut self) -> BrowserResult<String> {
        self.current
            .as_ref()
            .map(|(url, _)| url.clone())
            .ok_or(BrowserError::NoPage)
    }

    fn screenshot(&mut self, _path: &Path) -> BrowserResult<()> {
        Err(BrowserError::Unsupported("screenshot"))
    }
}

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Browser selection shared by the crawling binaries.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct BrowserArgs {
    /// Drive Chrome through the chromedriver at this endpoint (needs the
    /// `webdriver` feature). Without it pages are fetched over plain HTTP.
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_WEBDRIVER_URL)]
    pub webdriver: Option<String>,

    /// Run Chrome without a window
    #[arg(long)]
    pub headless: bool,
}

impl BrowserArgs {
    pub fn launch(&self) -> anyhow::Result<Box<dyn Browser>> {
        match &self.webdriver {
            Some(endpoint) => launch_webdriver(endpoint, self.headless),
            None => {
                log::info!("Using plain HTTP fetches; pages will not run scripts");
                Ok(Box::new(HttpBrowser::new()?))
            }
        }
    }
}

#[cfg(feature = "webdriver")]
fn launch_webdriver(endpoint: &str, headless: bool) -> anyhow::Result<Box<dyn Browser>> {
    log::info!("Connecting to webdriver at {}", endpoint);
    let browser = crate::webdriver::WebDriverBrowser::connect(endpoint, headless)?;
    Ok(Box::new(browser))
}

#[cfg(not(feature = "webdriver"))]
fn launch_webdriver(endpoint: &str, _headless: bool) -> anyhow::Result<Box<dyn Browser>> {
    Err(anyhow::anyhow!(
        "cannot connect to {}: built without the `webdriver` feature",
        endpoint
    ))
}
