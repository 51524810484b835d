//! [`Browser`] backed by a real Chrome through a running chromedriver.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::runtime::{Builder, Runtime};

use crate::browser::{Browser, BrowserError, BrowserResult};
use crate::page::Anchor;

fn driver_err<E: std::fmt::Display>(err: E) -> BrowserError {
    BrowserError::Driver(err.to_string())
}

pub struct WebDriverBrowser {
    runtime: Runtime,
    client: Option<Client>,
}

impl WebDriverBrowser {
    /// Connect to the chromedriver at `webdriver_url`. Headless is off by
    /// default so an operator can see and solve challenges.
    pub fn connect(webdriver_url: &str, headless: bool) -> BrowserResult<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;

        let mut args = vec![
            json!("--no-sandbox"),
            json!("--disable-dev-shm-usage"),
            json!("--disable-notifications"),
            json!("--disable-popup-blocking"),
            json!("--log-level=3"),
        ];
        if headless {
            args.push(json!("--headless"));
            args.push(json!("--disable-gpu"));
        }
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(args));
        chrome_opts.insert("excludeSwitches".to_string(), json!(["enable-logging"]));

        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = runtime
            .block_on(
                ClientBuilder::native()
                    .capabilities(caps)
                    .connect(webdriver_url),
            )
            .map_err(driver_err)?;

        Ok(WebDriverBrowser {
            runtime,
            client: Some(client),
        })
    }

    fn client(&self) -> BrowserResult<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| BrowserError::Driver("session already closed".to_string()))
    }
}

impl Browser for WebDriverBrowser {
    fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        let client = self.client()?;
        self.runtime.block_on(client.goto(url)).map_err(driver_err)
    }

    fn page_source(&mut self) -> BrowserResult<String> {
        let client = self.client()?;
        self.runtime.block_on(client.source()).map_err(driver_err)
    }

    fn current_url(&mut self) -> BrowserResult<String> {
        let client = self.client()?;
        let url = self
            .runtime
            .block_on(client.current_url())
            .map_err(driver_err)?;
        Ok(url.to_string())
    }

    fn title(&mut self) -> BrowserResult<String> {
        let client = self.client()?;
        self.runtime.block_on(client.title()).map_err(driver_err)
    }

    // The DOM `href` property is already absolute, so no base URL is needed
    fn anchors(&mut self) -> BrowserResult<Vec<Anchor>> {
        let client = self.client()?;
        self.runtime.block_on(async {
            let elements = client
                .find_all(Locator::Css("a"))
                .await
                .map_err(driver_err)?;
            let mut anchors = Vec::with_capacity(elements.len());
            for element in elements {
                let href = match element.prop("href").await {
                    Ok(Some(href)) if !href.is_empty() => href,
                    Ok(_) => continue,
                    // Elements can go stale while we walk them
                    Err(err) => {
                        log::debug!("Skipping anchor: {}", err);
                        continue;
                    }
                };
                let text = element.text().await.unwrap_or_default();
                anchors.push(Anchor {
                    text: text.trim().to_string(),
                    href,
                });
            }
            Ok::<_, BrowserError>(anchors)
        })
    }

    fn screenshot(&mut self, path: &Path) -> BrowserResult<()> {
        let client = self.client()?;
        let png = self
            .runtime
            .block_on(client.screenshot())
            .map_err(driver_err)?;
        fs::write(path, png)?;
        Ok(())
    }

    fn close(&mut self) -> BrowserResult<()> {
        match self.client.take() {
            Some(client) => self.runtime.block_on(client.close()).map_err(driver_err),
            None => Ok(()),
        }
    }
}

impl Drop for WebDriverBrowser {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("Failed to close browser session: {}", err);
        }
    }
}
