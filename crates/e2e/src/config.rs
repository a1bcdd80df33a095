//! Harness configuration
//!
//! Everything here has a default that matches the CI deployment, so an
//! empty (or missing) TOML file is a valid configuration.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::E2eResult;

/// Top-level harness configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Application under test
    pub app: AppConfig,

    /// WebDriver server and browser
    pub webdriver: WebDriverConfig,

    /// Test database reset command
    pub database: DatabaseConfig,

    /// Third-party identity provider
    pub identity: IdentityConfig,

    /// Imagery processing status polling
    pub polling: PollingConfig,

    /// Bounded UI waits
    pub waits: WaitConfig,

    /// Scenario runner
    pub runner: RunnerSettings,

    /// Imagery fixtures
    pub fixtures: FixtureConfig,
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root URL of the deployed imagery browser
    pub base_url: String,

    /// How long to wait for the app to answer HTTP before giving up
    pub startup_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            startup_timeout_ms: 30_000,
        }
    }
}

impl AppConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
        }
    }

    /// Driver binary conventionally paired with this browser
    pub fn default_driver(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chromedriver",
            BrowserKind::Firefox => "geckodriver",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    /// WebDriver endpoint
    pub url: String,

    pub browser: BrowserKind,

    pub headless: bool,

    /// Spawn the driver binary instead of attaching to a running one
    pub spawn: bool,

    /// Driver binary (None = chromedriver/geckodriver from PATH)
    pub binary_path: Option<PathBuf>,

    pub startup_timeout_ms: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:4444".to_string(),
            browser: BrowserKind::Chrome,
            headless: true,
            spawn: false,
            binary_path: None,
            startup_timeout_ms: 30_000,
        }
    }
}

impl WebDriverConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    pub fn driver_binary(&self) -> PathBuf {
        self.binary_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.browser.default_driver()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database dropped before every scenario
    pub name: String,

    /// Administration client
    pub program: String,

    /// Arguments; `{db}` is replaced with `name`
    pub args: Vec<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "oam-api-test".to_string(),
            program: "mongo".to_string(),
            args: vec![
                "{db}".to_string(),
                "--eval".to_string(),
                "db.dropDatabase()".to_string(),
            ],
        }
    }
}

impl DatabaseConfig {
    pub fn resolved_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace("{db}", &self.name))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Regex matched against the current URL to detect the provider login page
    pub provider_domain: String,

    pub email: String,

    pub password: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        // Facebook test user. Switching users needs one manual run to accept
        // the app's permission prompt.
        Self {
            provider_domain: r"facebook\.com".to_string(),
            email: "open_dtqgedz_user@tfbnw.net".to_string(),
            password: "oamtestpassword".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            max_attempts: 100,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Default bound for an element to become visible
    pub visible_timeout_ms: u64,

    /// Bound for `.loading` overlays to disappear
    pub loading_timeout_ms: u64,

    /// Re-check interval inside bounded waits
    pub poll_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            visible_timeout_ms: 10_000,
            loading_timeout_ms: 300_000,
            poll_ms: 250,
        }
    }
}

impl WaitConfig {
    pub fn visible_timeout(&self) -> Duration {
        Duration::from_millis(self.visible_timeout_ms)
    }

    pub fn loading_timeout(&self) -> Duration {
        Duration::from_millis(self.loading_timeout_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Overrides every group's retry count when set
    pub retries: Option<u32>,

    /// Output directory for results
    pub output_dir: Option<PathBuf>,
}

impl RunnerSettings {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("test-results"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// GeoTIFF over Mount Everest served from GitHub
    pub remote_imagery_uri: String,

    /// Same GeoTIFF on local disk, for the file upload path
    pub local_imagery_path: PathBuf,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            remote_imagery_uri: "https://github.com/openimagerynetwork/oin-meta-generator/blob/master/\
                                 test/fixtures/everest-utm.gtiff?raw=true"
                .to_string(),
            local_imagery_path: PathBuf::from("fixtures/everest-utm.gtiff"),
        }
    }
}
