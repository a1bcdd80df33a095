//! Scenario context and the multi-step journeys scenarios are built from

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::info;

use crate::browser::Browser;
use crate::config::HarnessConfig;
use crate::error::{E2eError, E2eResult};
use crate::forms::{fill_upload_form, input_remote_imagery_uri, submit_form, UploadForm};
use crate::locator::Locator;
use crate::polling::wait_for_imagery_processing;
use crate::session::SessionController;

pub const RESULTS_LIST: &str = ".pane-body-inner .results-list li";

/// Everything a scenario body needs
pub struct ScenarioContext {
    pub browser: Arc<dyn Browser>,
    pub config: Arc<HarnessConfig>,
    pub session: SessionController,
}

impl ScenarioContext {
    pub fn new(browser: Arc<dyn Browser>, config: Arc<HarnessConfig>) -> E2eResult<Self> {
        let session =
            SessionController::new(config.identity.clone(), config.waits.visible_timeout())?;
        Ok(Self {
            browser,
            config,
            session,
        })
    }

    pub fn browser(&self) -> &dyn Browser {
        self.browser.as_ref()
    }

    pub async fn log_in(&self) -> E2eResult<()> {
        self.session.log_in(self.browser()).await.map(|_| ())
    }

    pub async fn log_out(&self) -> E2eResult<bool> {
        self.session.log_out(self.browser()).await
    }

    pub async fn wait_until_gone(&self, locator: &Locator) -> E2eResult<()> {
        self.browser()
            .wait_gone(locator, self.config.waits.loading_timeout())
            .await
    }

    /// Wait for the app's loading overlay to clear
    pub async fn finish_loading(&self) -> E2eResult<()> {
        self.wait_until_gone(&Locator::css(".loading")).await
    }

    pub async fn wait_visible(&self, locator: &Locator) -> E2eResult<()> {
        self.browser()
            .wait_visible(locator, self.config.waits.visible_timeout())
            .await
    }

    pub async fn expect_present(&self, locator: &Locator) -> E2eResult<()> {
        if self.browser().exists(locator).await? {
            Ok(())
        } else {
            Err(E2eError::AssertionFailed(format!("expected {} to be there", locator)))
        }
    }

    pub async fn expect_absent(&self, locator: &Locator) -> E2eResult<()> {
        if self.browser().exists(locator).await? {
            Err(E2eError::AssertionFailed(format!("expected {} not to be there", locator)))
        } else {
            Ok(())
        }
    }

    /// Log in, upload imagery from `imagery_uri` and wait for processing.
    ///
    /// Returns the terminal status; a processing timeout is an error.
    pub async fn submit_imagery(&self, imagery_uri: &str, title: &str) -> E2eResult<String> {
        self.log_in().await?;
        self.browser().goto("#/upload").await?;
        fill_upload_form(self.browser(), &UploadForm::titled(title)).await?;
        input_remote_imagery_uri(self.browser(), imagery_uri).await?;
        submit_form(self.browser()).await?;
        let status = self.await_processing().await?;
        info!("Submitted {:?}: {}", title, status);
        Ok(status)
    }

    /// Follow the post-submit status link until processing settles
    pub async fn await_processing(&self) -> E2eResult<String> {
        wait_for_imagery_processing(
            self.browser(),
            &self.config.polling,
            self.config.waits.visible_timeout(),
        )
        .await?
        .into_status()
    }

    /// Submit the remote fixture
    pub async fn submit_fixture(&self, title: &str) -> E2eResult<String> {
        let uri = self.config.fixtures.remote_imagery_uri.clone();
        self.submit_imagery(&uri, title).await
    }

    /// Wait for the results pane and count its entries
    pub async fn imagery_results(&self) -> E2eResult<usize> {
        let results = Locator::css(RESULTS_LIST);
        self.browser()
            .wait_exists(&results, self.config.waits.visible_timeout())
            .await?;
        self.browser().count(&results).await
    }

    /// Search a place name and open the map over the top suggestion
    pub async fn search_map(&self, query: &str) -> E2eResult<()> {
        self.browser().goto("/").await?;
        self.browser()
            .submit_value(&Locator::css("#global-search__input"), query)
            .await?;
        self.wait_until_gone(&Locator::containing(".autocomplete__menu-item", "Loading..."))
            .await?;
        self.browser()
            .click(&Locator::css(".autocomplete__menu-item.is-highlighted"))
            .await?;
        self.finish_loading().await?;
        self.browser().click(&Locator::css("#map")).await?;
        self.finish_loading().await
    }

    /// Open the account page and wait for it to load
    pub async fn open_account(&self) -> E2eResult<()> {
        self.browser().goto("#/account").await?;
        self.finish_loading().await
    }
}

/// Random lower-case title so concurrent CI runs cannot collide
pub fn random_title() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(11)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}
