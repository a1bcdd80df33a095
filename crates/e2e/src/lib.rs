//! OpenAerialMap browser E2E suite
//!
//! This crate drives the deployed imagery browser through a real browser
//! over WebDriver:
//! - Drops the test database before every scenario attempt
//! - Logs in through the Facebook identity provider (or its remembered session)
//! - Fills the upload form and polls the upload status page
//! - Asserts on rendered DOM state
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  ScenarioRunner (sequential)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  for each Scenario (retries = 3, optional skip)             │
//! │    ├── IsolationReset::reset()   -> mongo dropDatabase      │
//! │    ├── SessionController::log_out()                         │
//! │    └── body(&ScenarioContext)                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioContext                                            │
//! │    ├── SessionController   log_in / log_out                 │
//! │    ├── forms               upload form, imagery row fix     │
//! │    ├── polling             status page -> PollOutcome       │
//! │    └── dyn Browser         WebDriverBrowser | fake          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod cli;
pub mod config;
pub mod db;
pub mod driver;
pub mod error;
pub mod forms;
pub mod journeys;
pub mod locator;
pub mod polling;
pub mod runner;
pub mod scenarios;
pub mod session;
pub mod webdriver;

#[cfg(test)]
mod fake;

pub use browser::Browser;
pub use config::HarnessConfig;
pub use error::{E2eError, E2eResult};
pub use journeys::ScenarioContext;
pub use locator::Locator;
pub use polling::PollOutcome;
pub use runner::{ScenarioRunner, TestSuiteResult};
pub use scenarios::Scenario;
