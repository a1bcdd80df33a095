//! Command line for the live scenario binary
//!
//! The binary is a `harness = false` test target, so `cargo test` hands it
//! the same arguments it would give libtest: a bare name filter and flags
//! such as `--nocapture`. The filter is honoured; libtest flags are dropped
//! before clap sees them.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{BrowserKind, HarnessConfig};

/// libtest switches without a value
const LIBTEST_SWITCHES: &[&str] = &[
    "--nocapture",
    "--show-output",
    "--ignored",
    "--include-ignored",
    "--exact",
    "--quiet",
    "-q",
    "--test",
    "--bench",
    "--force-run-in-process",
    "--report-time",
    "--ensure-time",
    "--shuffle",
];

/// libtest options that take a value, as `--opt value` or `--opt=value`
const LIBTEST_OPTIONS: &[&str] = &[
    "--test-threads",
    "--color",
    "--format",
    "--skip",
    "--logfile",
    "--shuffle-seed",
    "-Z",
];

#[derive(Parser, Debug)]
#[command(name = "oam-e2e")]
#[command(about = "Browser E2E scenarios for OpenAerialMap")]
pub struct Args {
    /// Run only scenarios whose "group > name" contains this text
    #[arg(value_name = "FILTER")]
    pub name_filter: Option<String>,

    /// Harness configuration file
    #[arg(short, long, env = "OAM_E2E_CONFIG", default_value = "oam-e2e.toml")]
    pub config: PathBuf,

    /// Root URL of the deployed app
    #[arg(long, env = "OAM_E2E_BASE_URL")]
    pub base_url: Option<String>,

    /// WebDriver endpoint
    #[arg(long, env = "OAM_E2E_WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Browser to drive
    #[arg(long, value_enum)]
    pub browser: Option<BrowserKind>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Spawn chromedriver/geckodriver instead of attaching to a running one
    #[arg(long)]
    pub spawn_driver: bool,

    /// Same as FILTER
    #[arg(short, long, conflicts_with = "name_filter")]
    pub filter: Option<String>,

    /// Override every group's retry count
    #[arg(long)]
    pub retries: Option<u32>,

    /// Status polling attempts before giving up on imagery processing
    #[arg(long)]
    pub polling_attempts: Option<u32>,

    /// List scenarios and exit
    #[arg(long)]
    pub list: bool,

    /// Output directory for results
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Parse the process arguments, ignoring anything meant for libtest
    pub fn from_env() -> Self {
        Self::parse_from(strip_libtest_args(std::env::args()))
    }

    pub fn scenario_filter(&self) -> Option<&str> {
        self.name_filter.as_deref().or(self.filter.as_deref())
    }

    /// Fold command line overrides into the loaded configuration
    pub fn apply_overrides(&self, config: &mut HarnessConfig) {
        if let Some(url) = &self.base_url {
            config.app.base_url = url.clone();
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver.url = url.clone();
        }
        if let Some(browser) = self.browser {
            config.webdriver.browser = browser;
        }
        if self.headed {
            config.webdriver.headless = false;
        }
        if self.spawn_driver {
            config.webdriver.spawn = true;
        }
        if self.retries.is_some() {
            config.runner.retries = self.retries;
        }
        if let Some(attempts) = self.polling_attempts {
            config.polling.max_attempts = attempts;
        }
        if let Some(output) = &self.output {
            config.runner.output_dir = Some(output.clone());
        }
    }
}

/// Drop the libtest flags `cargo test` forwards to every test target
pub fn strip_libtest_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut kept = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if LIBTEST_SWITCHES.contains(&arg.as_str()) {
            continue;
        }
        if LIBTEST_OPTIONS.contains(&arg.as_str()) {
            args.next();
            continue;
        }
        let takes_inline_value = LIBTEST_OPTIONS
            .iter()
            .any(|opt| arg.strip_prefix(opt).is_some_and(|rest| rest.starts_with('=')));
        if takes_inline_value {
            continue;
        }
        kept.push(arg);
    }

    kept
}
