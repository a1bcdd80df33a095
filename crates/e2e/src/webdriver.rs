//! WebDriver-backed browser

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::prelude::*;
use tracing::{debug, info};

use crate::browser::Browser;
use crate::config::{BrowserKind, WebDriverConfig};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

/// Live browser session
pub struct WebDriverBrowser {
    driver: WebDriver,

    /// Base URL of the application under test
    base_url: String,

    wait_poll: Duration,
}

impl WebDriverBrowser {
    /// Open a new browser session on the WebDriver server
    pub async fn connect(
        config: &WebDriverConfig,
        base_url: &str,
        wait_poll: Duration,
    ) -> E2eResult<Self> {
        info!(
            "Opening {} session on {} (headless: {})",
            config.browser.as_str(),
            config.url,
            config.headless
        );

        let driver = match config.browser {
            BrowserKind::Chrome => {
                let mut caps = DesiredCapabilities::chrome();
                if config.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(&config.url, caps).await?
            }
            BrowserKind::Firefox => {
                let mut caps = DesiredCapabilities::firefox();
                if config.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(&config.url, caps).await?
            }
        };

        Ok(Self {
            driver,
            base_url: base_url.trim_end_matches('/').to_string(),
            wait_poll,
        })
    }

    fn resolve_url(&self, path: &str) -> String {
        resolve_url(&self.base_url, path)
    }

    /// All elements matching the locator, in document order
    async fn find(&self, locator: &Locator) -> E2eResult<Vec<WebElement>> {
        let candidates = self
            .driver
            .find_all(By::Css(locator.selector().to_string()))
            .await?;

        if let Locator::Css(_) = locator {
            return Ok(candidates);
        }

        let mut matched = Vec::new();
        for element in candidates {
            // Detached since find_all: no longer on the page
            let Some(text) = unless_stale(element.text().await)? else {
                continue;
            };
            if locator.matches_text(&text) {
                matched.push(element);
            }
        }
        Ok(matched)
    }

    async fn nth(&self, locator: &Locator, index: usize) -> E2eResult<WebElement> {
        let mut elements = self.find(locator).await?;
        if index >= elements.len() {
            return Err(E2eError::AssertionFailed(format!(
                "expected at least {} element(s) for {}, found {}",
                index + 1,
                locator,
                elements.len()
            )));
        }
        Ok(elements.swap_remove(index))
    }
}

/// `None` when the element went stale, the error otherwise
fn unless_stale<T>(result: WebDriverResult<T>) -> E2eResult<Option<T>> {
    match result.map_err(E2eError::from) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_stale() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Join a path or route fragment onto the app root
pub fn resolve_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn goto(&self, path: &str) -> E2eResult<()> {
        let url = self.resolve_url(path);
        debug!("goto {}", url);
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        self.click_nth(locator, 0).await
    }

    async fn click_nth(&self, locator: &Locator, index: usize) -> E2eResult<()> {
        debug!("click {} [{}]", locator, index);
        self.nth(locator, index).await?.click().await?;
        Ok(())
    }

    async fn set_value(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        debug!("set {} = {:?}", locator, value);
        let element = self.nth(locator, 0).await?;
        element.clear().await?;
        element.send_keys(value).await?;
        Ok(())
    }

    async fn submit_value(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.set_value(locator, value).await?;
        self.nth(locator, 0).await?.send_keys(Key::Enter).await?;
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        Ok(self.find(locator).await?.len())
    }

    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        for element in self.find(locator).await? {
            if unless_stale(element.is_displayed().await)? == Some(true) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn text(&self, locator: &Locator) -> E2eResult<String> {
        Ok(self.nth(locator, 0).await?.text().await?)
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> E2eResult<Option<String>> {
        Ok(self.nth(locator, 0).await?.attr(name).await?)
    }

    async fn refresh(&self) -> E2eResult<()> {
        self.driver.refresh().await?;
        Ok(())
    }

    async fn choose_file(&self, locator: &Locator, path: &Path) -> E2eResult<()> {
        let absolute = std::fs::canonicalize(path)?;
        debug!("choose file {} for {}", absolute.display(), locator);
        self.nth(locator, 0)
            .await?
            .send_keys(absolute.display().to_string())
            .await?;
        Ok(())
    }

    async fn quit(&self) -> E2eResult<()> {
        self.driver.clone().quit().await?;
        Ok(())
    }

    fn wait_poll(&self) -> Duration {
        self.wait_poll
    }
}
