//! Login and logout through the third-party identity provider
//!
//! The provider may remember a previous session and bounce straight back to
//! the app, or stop on its own credential page. Which one happened is decided
//! from the current location after the login link is followed.

use std::time::Duration;

use regex::Regex;
use tracing::{debug, info};

use crate::browser::Browser;
use crate::config::IdentityConfig;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

/// Where the login flow stands after the provider link was followed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    /// Provider is showing its credential form
    AwaitingCredentials,
    /// Provider already redirected back to the app
    Redirected,
}

/// How a successful `log_in` got there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPath {
    AlreadySignedIn,
    ProviderRemembered,
    CredentialsSubmitted,
}

pub fn logout_link() -> Locator {
    Locator::link("Logout")
}

pub struct SessionController {
    identity: IdentityConfig,
    provider: Regex,
    visible_timeout: Duration,
}

impl SessionController {
    pub fn new(identity: IdentityConfig, visible_timeout: Duration) -> E2eResult<Self> {
        let provider = Regex::new(&identity.provider_domain).map_err(|e| {
            E2eError::Config(format!(
                "invalid provider domain pattern {:?}: {}",
                identity.provider_domain, e
            ))
        })?;
        Ok(Self {
            identity,
            provider,
            visible_timeout,
        })
    }

    pub fn login_stage(&self, url: &str) -> LoginStage {
        if self.provider.is_match(url) {
            LoginStage::AwaitingCredentials
        } else {
            LoginStage::Redirected
        }
    }

    pub async fn log_in(&self, browser: &dyn Browser) -> E2eResult<LoginPath> {
        browser.goto("/").await?;
        if browser.exists(&logout_link()).await? {
            debug!("Already signed in");
            return Ok(LoginPath::AlreadySignedIn);
        }

        browser.click(&Locator::link("Facebook")).await?;

        let path = match self.login_stage(&browser.current_url().await?) {
            LoginStage::AwaitingCredentials => {
                browser
                    .set_value(&Locator::css("#email"), &self.identity.email)
                    .await?;
                browser
                    .set_value(&Locator::css("#pass"), &self.identity.password)
                    .await?;
                browser.click(&Locator::css("#loginbutton")).await?;
                LoginPath::CredentialsSubmitted
            }
            LoginStage::Redirected => LoginPath::ProviderRemembered,
        };

        browser
            .wait_visible(&logout_link(), self.visible_timeout)
            .await
            .map_err(|e| {
                E2eError::AssertionFailed(format!("login did not complete ({:?}): {}", path, e))
            })?;

        info!("Signed in ({:?})", path);
        Ok(path)
    }

    /// Returns whether there was a session to end
    pub async fn log_out(&self, browser: &dyn Browser) -> E2eResult<bool> {
        browser.goto("/").await?;
        if browser.exists(&logout_link()).await? {
            browser.click(&logout_link()).await?;
            debug!("Signed out");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeBrowser, PROVIDER_LOGIN_URL};
    use test_case::test_case;

    fn controller() -> SessionController {
        SessionController::new(IdentityConfig::default(), Duration::from_secs(1)).unwrap()
    }

    #[test_case(PROVIDER_LOGIN_URL, LoginStage::AwaitingCredentials ; "provider page")]
    #[test_case("https://m.facebook.com/v2.8/dialog/oauth", LoginStage::AwaitingCredentials ; "mobile dialog")]
    #[test_case("http://oam.test/#/", LoginStage::Redirected ; "back on app")]
    fn classifies_location(url: &str, expected: LoginStage) {
        assert_eq!(controller().login_stage(url), expected);
    }

    #[tokio::test]
    async fn submits_credentials_when_provider_asks() {
        let browser = FakeBrowser::new();
        let path = controller().log_in(&browser).await.unwrap();

        assert_eq!(path, LoginPath::CredentialsSubmitted);
        let state = browser.state();
        assert!(state.signed_in);
        assert_eq!(state.credential_submissions, 1);
        assert_eq!(state.fields["#email"], "open_dtqgedz_user@tfbnw.net");
    }

    #[tokio::test]
    async fn skips_credentials_when_provider_remembers() {
        let browser = FakeBrowser::new();
        browser.state().provider_remembers = true;

        let path = controller().log_in(&browser).await.unwrap();

        assert_eq!(path, LoginPath::ProviderRemembered);
        assert_eq!(browser.state().credential_submissions, 0);
        assert!(!browser.state().fields.contains_key("#email"));
    }

    #[tokio::test]
    async fn second_login_is_a_no_op() {
        let browser = FakeBrowser::new();
        let session = controller();

        session.log_in(&browser).await.unwrap();
        let again = session.log_in(&browser).await.unwrap();

        assert_eq!(again, LoginPath::AlreadySignedIn);
        assert_eq!(browser.state().credential_submissions, 1);
        assert_eq!(
            browser.clicks().iter().filter(|c| c.as_str() == "a=Facebook").count(),
            1
        );
    }

    #[tokio::test]
    async fn logout_without_session_clicks_nothing() {
        let browser = FakeBrowser::new();
        let ended = controller().log_out(&browser).await.unwrap();

        assert!(!ended);
        assert!(browser.clicks().is_empty());
    }

    #[tokio::test]
    async fn logout_ends_an_active_session() {
        let browser = FakeBrowser::new();
        let session = controller();
        session.log_in(&browser).await.unwrap();

        assert!(session.log_out(&browser).await.unwrap());
        assert!(!browser.state().signed_in);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_login_is_an_assertion_failure() {
        let browser = FakeBrowser::new();
        browser.state().reject_credentials = true;

        let err = controller().log_in(&browser).await.unwrap_err();

        assert!(matches!(err, E2eError::AssertionFailed(_)));
        assert_eq!(browser.state().credential_submissions, 1);
    }
}
