//! Imagery processing status polling
//!
//! Processing happens server side with no push notification, so the status
//! page is re-read on a fixed interval, refreshing between reads, until the
//! status leaves `pending`/`processing` or the attempt budget runs out.

use std::time::Duration;

use tracing::{debug, info};

use crate::browser::Browser;
use crate::config::PollingConfig;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

/// Result of polling the upload status page
#[must_use = "a timed-out poll must be handled, see `into_status`"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Status left `pending`/`processing`; holds the lower-cased status
    Resolved(String),
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    /// Terminal status, or `ProcessingTimedOut` if the budget ran out
    pub fn into_status(self) -> E2eResult<String> {
        match self {
            PollOutcome::Resolved(status) => Ok(status),
            PollOutcome::TimedOut { attempts } => Err(E2eError::ProcessingTimedOut { attempts }),
        }
    }
}

fn is_in_progress(status: &str) -> bool {
    status == "pending" || status == "processing"
}

/// Open the status page for the upload just submitted and wait for a
/// terminal status.
pub async fn wait_for_imagery_processing(
    browser: &dyn Browser,
    polling: &PollingConfig,
    visible_timeout: Duration,
) -> E2eResult<PollOutcome> {
    let status_link = Locator::link("Check upload status.");
    browser.wait_visible(&status_link, visible_timeout).await?;
    browser.click(&status_link).await?;
    browser
        .wait_visible(&Locator::with_text("h2", "Status upload"), visible_timeout)
        .await?;

    poll_status(browser, polling, visible_timeout).await
}

/// Poll `p.status` on the current page
pub async fn poll_status(
    browser: &dyn Browser,
    polling: &PollingConfig,
    visible_timeout: Duration,
) -> E2eResult<PollOutcome> {
    let status_paragraph = Locator::css("p.status");

    for attempt in 1..=polling.max_attempts {
        browser.wait_visible(&status_paragraph, visible_timeout).await?;
        let status = browser.text(&status_paragraph).await?.trim().to_lowercase();
        if !is_in_progress(&status) {
            info!("Imagery processing finished: {} (attempt {})", status, attempt);
            return Ok(PollOutcome::Resolved(status));
        }

        debug!("Imagery {} (attempt {}/{})", status, attempt, polling.max_attempts);
        browser.pause(polling.interval()).await;
        browser.refresh().await?;
    }

    Ok(PollOutcome::TimedOut {
        attempts: polling.max_attempts,
    })
}
