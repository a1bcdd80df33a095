//! Error types for E2E scenarios

use thirtyfour::error::WebDriverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Database reset failed: {0}")]
    ResetFailed(String),

    #[error("WebDriver failed to start: {0}")]
    DriverStartup(String),

    #[error("WebDriver health check failed after {0} attempts")]
    DriverHealthCheck(usize),

    #[error("Application at {url} not reachable after {attempts} attempts")]
    AppUnreachable { url: String, attempts: usize },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Imagery still processing after {attempts} status checks")]
    ProcessingTimedOut { attempts: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    /// Element was detached from the DOM after it was looked up
    #[error("Stale element: {0}")]
    StaleElement(String),

    #[error("Browser error: {0}")]
    Browser(WebDriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// Errors after which no further scenario may run.
    ///
    /// A failed reset means isolation can no longer be trusted, and a dead
    /// driver takes every later scenario down with it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            E2eError::ResetFailed(_)
                | E2eError::DriverStartup(_)
                | E2eError::DriverHealthCheck(_)
                | E2eError::AppUnreachable { .. }
                | E2eError::Config(_)
        )
    }

    /// The element went away between lookup and use
    pub fn is_stale(&self) -> bool {
        matches!(self, E2eError::StaleElement(_))
    }
}

impl From<WebDriverError> for E2eError {
    fn from(err: WebDriverError) -> Self {
        if matches!(err, WebDriverError::StaleElementReference(..)) {
            E2eError::StaleElement(err.to_string())
        } else {
            E2eError::Browser(err)
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
