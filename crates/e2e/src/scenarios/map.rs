//! Map search

use super::{Scenario, ScenarioFuture};
use crate::error::{E2eError, E2eResult};
use crate::journeys::ScenarioContext;

const GROUP: &str = "Map > Basic";

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![Scenario::new(
        GROUP,
        "should find imagery over the Himalayas",
        find_imagery_over_himalayas,
    )]
}

fn find_imagery_over_himalayas(ctx: &ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ctx.submit_fixture("Test imagery").await?;
        ctx.search_map("Mount Everest").await?;
        expect_results(ctx.imagery_results().await?)
    })
}

fn expect_results(count: usize) -> E2eResult<()> {
    if count >= 1 {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(
            "expected at least 1 imagery result over Mount Everest".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{context, FakeBrowser};

    #[tokio::test(start_paused = true)]
    async fn everest_search_lists_the_uploaded_imagery() {
        let browser = FakeBrowser::new();

        find_imagery_over_himalayas(&context(&browser)).await.unwrap();

        let clicks = browser.clicks();
        assert!(clicks.contains(&".autocomplete__menu-item.is-highlighted".to_string()));
        assert_eq!(clicks.last().map(String::as_str), Some("#map"));
        assert_eq!(browser.state().fields["#global-search__input"], "Mount Everest");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_results_pane_fails_the_search() {
        let browser = FakeBrowser::new();
        browser.state().search_finds_nothing = true;

        let err = find_imagery_over_himalayas(&context(&browser))
            .await
            .unwrap_err();

        assert!(matches!(err, E2eError::Timeout(ref what) if what.contains("results-list")));
    }

    #[test]
    fn zero_results_is_an_assertion_failure() {
        assert!(expect_results(1).is_ok());
        assert!(matches!(expect_results(0), Err(E2eError::AssertionFailed(_))));
    }
}
