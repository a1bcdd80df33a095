//! Live E2E entry point
//!
//! Runs the scenario catalogue against a deployed app over WebDriver.
//! Run with: OAM_E2E_BASE_URL=http://localhost:3000 cargo test --package oam-e2e --test e2e
//! Narrow it with a name filter: `cargo test --test e2e -- delete --nocapture`
//!
//! Without a base URL the suite reports itself skipped and exits 0.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use oam_e2e::cli::Args;
use oam_e2e::config::HarnessConfig;
use oam_e2e::db::DatabaseReset;
use oam_e2e::driver::{wait_for_app, DriverHandle};
use oam_e2e::runner::write_results;
use oam_e2e::scenarios::select;
use oam_e2e::webdriver::WebDriverBrowser;
use oam_e2e::{Browser, E2eResult, ScenarioContext, ScenarioRunner};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::from_env();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let scenarios = select(args.scenario_filter());

    if args.list {
        for scenario in &scenarios {
            match scenario.skip {
                Some(reason) => println!("{} (skipped: {})", scenario.full_name(), reason),
                None => println!("{}", scenario.full_name()),
            }
        }
        return Ok(true);
    }

    if args.base_url.is_none() && !args.config.exists() {
        warn!("OAM_E2E_BASE_URL not set and no config file; skipping live scenarios");
        return Ok(true);
    }

    let mut config = HarnessConfig::load(&args.config)?;
    args.apply_overrides(&mut config);
    let config = Arc::new(config);

    wait_for_app(&config.app.base_url, config.app.startup_timeout()).await?;
    let mut driver = DriverHandle::start(&config.webdriver).await?;

    let browser: Arc<dyn Browser> = Arc::new(
        WebDriverBrowser::connect(&config.webdriver, &config.app.base_url, config.waits.poll())
            .await?,
    );
    let ctx = ScenarioContext::new(browser.clone(), config.clone())?;
    let reset = DatabaseReset::new(&config.database);

    info!("Running scenarios against {}", config.app.base_url);
    let outcome = ScenarioRunner::new(&ctx, &reset).run(&scenarios).await;

    // Always close the browser, even when the run aborted
    if let Err(e) = browser.quit().await {
        warn!("Failed to close browser: {}", e);
    }
    driver.stop()?;

    let results = outcome?;
    write_results(&config.runner.output_dir(), &results)?;

    Ok(results.success())
}
