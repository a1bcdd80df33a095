//! Browser automation seam
//!
//! Scenario helpers only talk to the browser through [`Browser`], so they
//! can run against a live WebDriver session or an in-memory fake.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

#[async_trait]
pub trait Browser: Send + Sync {
    /// Navigate to an absolute URL, a path (`/`) or a route fragment (`#/upload`)
    async fn goto(&self, path: &str) -> E2eResult<()>;

    async fn current_url(&self) -> E2eResult<String>;

    /// Click the first element matching `locator`
    async fn click(&self, locator: &Locator) -> E2eResult<()>;

    /// Click the `index`-th element matching `locator`
    async fn click_nth(&self, locator: &Locator, index: usize) -> E2eResult<()>;

    /// Replace the value of an input
    async fn set_value(&self, locator: &Locator, value: &str) -> E2eResult<()>;

    /// Replace the value of an input and press Enter
    async fn submit_value(&self, locator: &Locator, value: &str) -> E2eResult<()>;

    async fn count(&self, locator: &Locator) -> E2eResult<usize>;

    async fn exists(&self, locator: &Locator) -> E2eResult<bool> {
        Ok(self.count(locator).await? > 0)
    }

    /// Whether any matching element is displayed
    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool>;

    async fn text(&self, locator: &Locator) -> E2eResult<String>;

    async fn attribute(&self, locator: &Locator, name: &str) -> E2eResult<Option<String>>;

    async fn refresh(&self) -> E2eResult<()>;

    /// Hand a local file to a file input
    async fn choose_file(&self, locator: &Locator, path: &Path) -> E2eResult<()>;

    async fn pause(&self, duration: Duration) {
        sleep(duration).await;
    }

    async fn quit(&self) -> E2eResult<()>;

    /// Re-check interval for the bounded waits below
    fn wait_poll(&self) -> Duration {
        Duration::from_millis(250)
    }

    async fn wait_visible(&self, locator: &Locator, timeout: Duration) -> E2eResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            // A stale element is one about to be re-rendered: keep waiting
            if settle(self.is_visible(locator).await)? == Some(true) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(E2eError::Timeout(format!("{} to become visible", locator)));
            }
            sleep(self.wait_poll()).await;
        }
    }

    async fn wait_gone(&self, locator: &Locator, timeout: Duration) -> E2eResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            // Detached mid-check counts as gone
            if settle(self.is_visible(locator).await)? != Some(true) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(E2eError::Timeout(format!("{} to disappear", locator)));
            }
            debug!("Still visible: {}", locator);
            sleep(self.wait_poll()).await;
        }
    }

    async fn wait_exists(&self, locator: &Locator, timeout: Duration) -> E2eResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if settle(self.exists(locator).await)? == Some(true) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(E2eError::Timeout(format!("{} to exist", locator)));
            }
            sleep(self.wait_poll()).await;
        }
    }
}

/// `None` for a stale element, otherwise the check's own result
fn settle(result: E2eResult<bool>) -> E2eResult<Option<bool>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_stale() => Ok(None),
        Err(e) => Err(e),
    }
}
