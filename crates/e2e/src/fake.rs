//! In-memory stand-in for the imagery browser and the identity provider

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::browser::Browser;
use crate::config::HarnessConfig;
use crate::db::IsolationReset;
use crate::error::{E2eError, E2eResult};
use crate::forms::TITLE_FIELD;
use crate::journeys::{ScenarioContext, RESULTS_LIST};
use crate::locator::Locator;

pub const BASE_URL: &str = "http://oam.test";
pub const PROVIDER_LOGIN_URL: &str = "https://www.facebook.com/login.php";

#[derive(Debug, Default)]
pub struct FakeState {
    pub url: String,
    pub signed_in: bool,

    /// Provider skips the credential page and redirects straight back
    pub provider_remembers: bool,

    pub credential_submissions: usize,

    /// Provider refuses the submitted credentials
    pub reject_credentials: bool,

    /// Ordered log of interactions (`goto:`, `click:`, `set:`, `reset`)
    pub events: Vec<String>,

    pub fields: HashMap<String, String>,

    pub imagery_rows: usize,

    /// Clicking `button=Url` yields two rows instead of one
    pub duplicate_rows: bool,

    /// Status reads answered with a non-terminal status before flipping
    pub pending_reads: usize,
    pub status_reads: usize,
    pub refreshes: usize,

    /// Imagery titles stored server side
    pub documents: Vec<String>,

    /// Upload page renders the form for signed-out visitors
    pub upload_open_to_guests: bool,

    /// Upload page turns everyone away, signed in or not
    pub upload_locked: bool,

    /// `a=Edit` was clicked; the next submit rewrites the first title
    pub editing: bool,

    /// Edits are accepted but never saved
    pub ignore_edits: bool,

    /// `a=Delete` does nothing
    pub ignore_deletes: bool,

    /// Map was clicked since the last navigation
    pub map_opened: bool,

    /// Place search lands somewhere without imagery
    pub search_finds_nothing: bool,
}

impl FakeState {
    /// Notice paragraph shown on the upload page, if that is the current page
    fn upload_notice(&self) -> Option<&'static str> {
        if !self.url.ends_with("#/upload") {
            return None;
        }
        let allowed = !self.upload_locked && (self.signed_in || self.upload_open_to_guests);
        Some(if allowed {
            "By submitting imagery to OpenAerialMap, you agree to place it under the CC-BY 4.0 licence."
        } else {
            "You must be logged in to upload imagery."
        })
    }

    fn results_shown(&self) -> usize {
        if self.map_opened && !self.search_finds_nothing {
            self.documents.len()
        } else {
            0
        }
    }
}

#[derive(Clone)]
pub struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        let state = FakeState {
            url: format!("{}/", BASE_URL),
            ..FakeState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state()
            .events
            .iter()
            .filter_map(|e| e.strip_prefix("click:").map(str::to_string))
            .collect()
    }
}

/// Scenario context over `browser` with default configuration
pub fn context(browser: &FakeBrowser) -> ScenarioContext {
    let config = Arc::new(HarnessConfig::default());
    ScenarioContext::new(Arc::new(browser.clone()), config).unwrap()
}

/// Reset hook that empties the fake's document store
pub struct FakeReset {
    browser: FakeBrowser,
    pub fail_with: Option<String>,
}

impl FakeReset {
    pub fn new(browser: &FakeBrowser) -> Self {
        Self {
            browser: browser.clone(),
            fail_with: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.browser
            .state()
            .events
            .iter()
            .filter(|e| e.as_str() == "reset")
            .count()
    }
}

#[async_trait]
impl IsolationReset for FakeReset {
    async fn reset(&self) -> E2eResult<()> {
        if let Some(message) = &self.fail_with {
            return Err(E2eError::ResetFailed(message.clone()));
        }
        let mut state = self.browser.state();
        state.events.push("reset".to_string());
        state.documents.clear();
        Ok(())
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn goto(&self, path: &str) -> E2eResult<()> {
        let mut state = self.state();
        state.events.push(format!("goto:{}", path));
        state.url = crate::webdriver::resolve_url(BASE_URL, path);
        state.map_opened = false;
        state.editing = false;
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.state().url.clone())
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        self.click_nth(locator, 0).await
    }

    async fn click_nth(&self, locator: &Locator, index: usize) -> E2eResult<()> {
        let mut state = self.state();
        state.events.push(format!("click:{}", locator));
        match locator.to_string().as_str() {
            "a=Facebook" => {
                if state.provider_remembers {
                    state.signed_in = true;
                } else {
                    state.url = PROVIDER_LOGIN_URL.to_string();
                }
            }
            "#loginbutton" => {
                state.credential_submissions += 1;
                state.signed_in = !state.reject_credentials
                    && state.fields.contains_key("#email")
                    && state.fields.contains_key("#pass");
                state.url = format!("{}/", BASE_URL);
            }
            "a=Logout" => state.signed_in = false,
            "button=Url" => state.imagery_rows = if state.duplicate_rows { 2 } else { 1 },
            "button=Local File" => state.imagery_rows = 1,
            ".bttn-remove-imagery" if index < state.imagery_rows => state.imagery_rows -= 1,
            "button=Submit" => {
                let title = state.fields.get(TITLE_FIELD).cloned().unwrap_or_default();
                if !state.editing {
                    state.documents.push(title);
                } else if !state.ignore_edits && !state.documents.is_empty() {
                    state.documents[0] = title;
                }
                state.editing = false;
            }
            "a=Edit" => state.editing = !state.documents.is_empty(),
            "a=Delete" if !state.ignore_deletes && !state.documents.is_empty() => {
                state.documents.remove(0);
            }
            "#map" => state.map_opened = true,
            _ => {}
        }
        Ok(())
    }

    async fn set_value(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        let mut state = self.state();
        state.events.push(format!("set:{}", locator));
        state.fields.insert(locator.to_string(), value.to_string());
        Ok(())
    }

    async fn submit_value(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.set_value(locator, value).await
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        let state = self.state();
        let count = match locator.to_string().as_str() {
            "a=Logout" | "img.profile_pic" => usize::from(state.signed_in),
            "a=Facebook" => usize::from(!state.signed_in),
            ".bttn-remove-imagery" => state.imagery_rows,
            "a=Check upload status." | "h2=Status upload" | "p.status" => 1,
            RESULTS_LIST => state.results_shown(),
            _ => match locator.selector() {
                "strong" => state
                    .documents
                    .iter()
                    .filter(|title| locator.matches_text(title))
                    .count(),
                "p" => usize::from(
                    state
                        .upload_notice()
                        .is_some_and(|notice| locator.matches_text(notice)),
                ),
                _ => 0,
            },
        };
        Ok(count)
    }

    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        self.exists(locator).await
    }

    async fn text(&self, locator: &Locator) -> E2eResult<String> {
        let mut state = self.state();
        if locator.selector() != "p.status" {
            return Ok(String::new());
        }
        state.status_reads += 1;
        let status = if state.status_reads <= state.pending_reads {
            if state.status_reads == 1 {
                "Pending"
            } else {
                "Processing"
            }
        } else {
            "Success"
        };
        Ok(status.to_string())
    }

    async fn attribute(&self, _locator: &Locator, _name: &str) -> E2eResult<Option<String>> {
        Ok(None)
    }

    async fn refresh(&self) -> E2eResult<()> {
        self.state().refreshes += 1;
        Ok(())
    }

    async fn choose_file(&self, locator: &Locator, path: &Path) -> E2eResult<()> {
        let mut state = self.state();
        state
            .fields
            .insert(locator.to_string(), path.display().to_string());
        Ok(())
    }

    async fn quit(&self) -> E2eResult<()> {
        Ok(())
    }
}
