//! Imagery submission, editing and deletion

use super::{Scenario, ScenarioFuture};
use crate::error::E2eError;
use crate::forms::{fill_upload_form, input_local_imagery_file, submit_form, UploadForm, TITLE_FIELD};
use crate::journeys::{random_title, ScenarioContext, RESULTS_LIST};
use crate::locator::Locator;

const SUBMISSION: &str = "Imagery > Basic imagery submission";
const SELECTED_LAYERS: &str = "Imagery > Selected Layers";
const UPDATING: &str = "Imagery > Updating images";

/// Known high resolution imagery over San Francisco
const SAN_FRANCISCO: &str = "#/-122.409,37.735,18/0230102033332/58d7f0e7b0eae7f3b143c108?_k=ju8si1";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(SUBMISSION, "should submit imagery", submit_remote_imagery),
        Scenario::new(SUBMISSION, "should submit a local file", submit_local_file),
        // Max zoom comes from the TMS manifest served by the dynamic tiler.
        // The staging tiler ignores the bucket prefix test runs upload to.
        Scenario::new(
            SELECTED_LAYERS,
            "should allow zooming beyond 18 for high res tiles",
            zoom_beyond_18,
        )
        .skipped("needs a local dynamic tiler that honours the test bucket prefix"),
        Scenario::new(UPDATING, "should update an images title", update_title),
        Scenario::new(UPDATING, "should delete an image", delete_image),
    ]
}

fn submit_remote_imagery(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let title = random_title();
        ctx.submit_fixture(&title).await?;
        ctx.browser().click(&Locator::link("View image")).await?;
        ctx.imagery_results().await?;
        ctx.browser()
            .click(&Locator::css(format!("{}:first-child", RESULTS_LIST)))
            .await?;
        ctx.expect_present(&Locator::with_text("h1", title.as_str())).await?;

        let src = ctx
            .browser()
            .attribute(&Locator::css(".single-media img"), "src")
            .await?
            .unwrap_or_default();
        if src.contains("_thumb") {
            Ok(())
        } else {
            Err(E2eError::AssertionFailed(format!(
                "expected a thumbnail image, got src {:?}",
                src
            )))
        }
    })
}

fn submit_local_file(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let browser = ctx.browser();
        ctx.log_in().await?;
        browser.goto("#/upload").await?;
        fill_upload_form(browser, &UploadForm::titled(random_title())).await?;
        input_local_imagery_file(browser, &ctx.config.fixtures.local_imagery_path).await?;
        submit_form(browser).await?;
        ctx.await_processing().await?;
        ctx.expect_present(&Locator::link("View image")).await
    })
}

fn zoom_beyond_18(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let zoom_in_disabled = Locator::css(".button-zoom--in.disabled");
        ctx.browser().goto(SAN_FRANCISCO).await?;
        ctx.finish_loading().await?;
        ctx.expect_present(&zoom_in_disabled).await?;

        let tms = Locator::button("TMS");
        ctx.wait_visible(&tms).await?;
        ctx.browser().click(&tms).await?;
        ctx.wait_until_gone(&zoom_in_disabled).await?;

        let classes = ctx
            .browser()
            .attribute(&Locator::css(".button-zoom--in"), "class")
            .await?
            .unwrap_or_default();
        if classes.split_whitespace().any(|c| c == "disabled") {
            return Err(E2eError::AssertionFailed(
                "zoom in is still disabled at level 18".to_string(),
            ));
        }
        Ok(())
    })
}

fn update_title(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ctx.submit_fixture("Test imagery").await?;
        ctx.open_account().await?;
        ctx.browser().click(&Locator::link("Edit")).await?;
        ctx.finish_loading().await?;
        ctx.browser()
            .set_value(&Locator::css(TITLE_FIELD), "A different title")
            .await?;
        submit_form(ctx.browser()).await?;
        ctx.finish_loading().await?;
        ctx.open_account().await?;
        ctx.expect_present(&Locator::with_text("strong", "A different title"))
            .await
    })
}

fn delete_image(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let title = Locator::with_text("strong", "Delete me :(");
        ctx.submit_fixture("Delete me :(").await?;
        ctx.open_account().await?;
        ctx.expect_present(&title).await?;
        ctx.browser().click(&Locator::link("Delete")).await?;
        ctx.finish_loading().await?;
        ctx.open_account().await?;
        ctx.expect_absent(&title).await
    })
}
