//! Logging in and out, and access control on the upload page

use super::{Scenario, ScenarioFuture};
use crate::journeys::ScenarioContext;
use crate::locator::Locator;
use crate::session::logout_link;

const LOGGING_IN_AND_OUT: &str = "User authentication > Logging in and out";
const PREVENTING_ACCESS: &str = "User authentication > Preventing access";
const ALLOWING_ACCESS: &str = "User authentication > Allowing access";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(LOGGING_IN_AND_OUT, "should log a user in with Facebook", log_in),
        Scenario::new(LOGGING_IN_AND_OUT, "should log a user out", log_out),
        Scenario::new(
            PREVENTING_ACCESS,
            "should not let you access the upload page",
            upload_requires_login,
        ),
        Scenario::new(
            ALLOWING_ACCESS,
            "should let you access the upload page",
            upload_allowed_when_logged_in,
        ),
    ]
}

fn profile_picture() -> Locator {
    Locator::css("img.profile_pic")
}

fn login_required() -> Locator {
    Locator::containing("p", "You must be logged in")
}

fn submission_consent() -> Locator {
    Locator::containing("p", "By submitting imagery to OpenAerialMap")
}

fn log_in(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ctx.log_in().await?;
        ctx.expect_present(&profile_picture()).await
    })
}

fn log_out(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ctx.log_in().await?;
        ctx.expect_present(&profile_picture()).await?;
        ctx.browser().click(&logout_link()).await?;
        ctx.expect_absent(&profile_picture()).await
    })
}

fn upload_requires_login(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ctx.browser().goto("#/upload").await?;
        ctx.expect_present(&login_required()).await?;
        ctx.expect_absent(&submission_consent()).await
    })
}

fn upload_allowed_when_logged_in(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ctx.log_in().await?;
        ctx.browser().goto("#/upload").await?;
        ctx.expect_absent(&login_required()).await?;
        ctx.expect_present(&submission_consent()).await
    })
}
