//! Upload form helpers

use std::path::Path;

use tracing::{debug, warn};

use crate::browser::Browser;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

pub const TITLE_FIELD: &str = "#scene-0-title";
pub const SENSOR_FIELD: &str = "#scene-0-sensor";
pub const PROVIDER_FIELD: &str = "#scene-0-provider";
pub const IMAGERY_LOCATION_FIELD: &str = "#scene-0-img-loc-0-url";
pub const REMOVE_IMAGERY_BUTTON: &str = ".bttn-remove-imagery";

/// Scene metadata typed into the upload form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub title: String,
    pub sensor: String,
    pub provider: String,
}

impl UploadForm {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sensor: "Automated Test Sensor".to_string(),
            provider: "Automated Test Provider".to_string(),
        }
    }
}

/// Imagery row count before and after de-duplication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCorrection {
    pub before: usize,
    pub after: usize,
}

impl RowCorrection {
    pub fn corrected(&self) -> bool {
        self.before != self.after
    }
}

pub async fn fill_upload_form(browser: &dyn Browser, form: &UploadForm) -> E2eResult<()> {
    browser.set_value(&Locator::css(TITLE_FIELD), &form.title).await?;
    browser.set_value(&Locator::css(SENSOR_FIELD), &form.sensor).await?;
    browser.set_value(&Locator::css(PROVIDER_FIELD), &form.provider).await?;
    Ok(())
}

/// Switch the first scene to URL input and enter `uri`.
///
/// The Url toggle sometimes renders two input rows; the extra one is removed
/// so the form always submits exactly one imagery source.
pub async fn input_remote_imagery_uri(browser: &dyn Browser, uri: &str) -> E2eResult<RowCorrection> {
    browser.click(&Locator::button("Url")).await?;
    browser
        .set_value(&Locator::css(IMAGERY_LOCATION_FIELD), uri)
        .await?;
    ensure_single_imagery_row(browser).await
}

/// Remove surplus imagery rows until exactly one remains
pub async fn ensure_single_imagery_row(browser: &dyn Browser) -> E2eResult<RowCorrection> {
    let rows = Locator::css(REMOVE_IMAGERY_BUTTON);
    let before = browser.count(&rows).await?;

    let mut remaining = before;
    while remaining > 1 {
        warn!("Upload form shows {} imagery rows, removing one", remaining);
        browser.click_nth(&rows, 1).await?;
        let now = browser.count(&rows).await?;
        if now >= remaining {
            break;
        }
        remaining = now;
    }

    let after = browser.count(&rows).await?;
    if after != 1 {
        return Err(E2eError::AssertionFailed(format!(
            "expected exactly one imagery row, found {} (started with {})",
            after, before
        )));
    }

    debug!("Imagery rows: {} -> {}", before, after);
    Ok(RowCorrection { before, after })
}

pub async fn input_local_imagery_file(browser: &dyn Browser, path: &Path) -> E2eResult<()> {
    browser.click(&Locator::button("Local File")).await?;
    browser
        .choose_file(&Locator::css(IMAGERY_LOCATION_FIELD), path)
        .await
}

pub async fn submit_form(browser: &dyn Browser) -> E2eResult<()> {
    browser.click(&Locator::button("Submit")).await
}
