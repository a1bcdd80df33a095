//! Sequential scenario runner: isolation reset, retries, results

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::db::IsolationReset;
use crate::error::E2eResult;
use crate::journeys::ScenarioContext;
use crate::scenarios::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub group: String,
    pub outcome: Outcome,

    /// Attempts made, including the successful one
    pub attempts: u32,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running all scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs scenarios one at a time against a single browser session.
///
/// All scenarios share one database and one cookie jar, so there is no
/// parallelism here; isolation comes from resetting before every attempt.
pub struct ScenarioRunner<'a, R: IsolationReset> {
    ctx: &'a ScenarioContext,
    reset: &'a R,
    retries_override: Option<u32>,
}

impl<'a, R: IsolationReset> ScenarioRunner<'a, R> {
    pub fn new(ctx: &'a ScenarioContext, reset: &'a R) -> Self {
        Self {
            ctx,
            reset,
            retries_override: ctx.config.runner.retries,
        }
    }

    pub fn with_retries(mut self, retries: Option<u32>) -> Self {
        self.retries_override = retries;
        self
    }

    /// Run scenarios in order.
    ///
    /// Returns `Err` only for fatal errors (a failed reset); scenario
    /// failures are recorded in the suite result.
    pub async fn run(&self, scenarios: &[Scenario]) -> E2eResult<TestSuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await?;
            match result.outcome {
                Outcome::Passed => info!("✓ {} ({} ms)", scenario.full_name(), result.duration_ms),
                Outcome::Skipped => info!("- {} (skipped)", scenario.full_name()),
                Outcome::Failed => error!(
                    "✗ {} - {}",
                    scenario.full_name(),
                    result.error.as_deref().unwrap_or("unknown error")
                ),
            }
            results.push(result);
        }

        let count = |outcome: Outcome| results.iter().filter(|r| r.outcome == outcome).count();
        let passed = count(Outcome::Passed);
        let failed = count(Outcome::Failed);
        let skipped = count(Outcome::Skipped);
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Scenario results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        Ok(TestSuiteResult {
            started_at,
            total: scenarios.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        })
    }

    /// Run one scenario with its retry budget
    pub async fn run_scenario(&self, scenario: &Scenario) -> E2eResult<TestResult> {
        let start = Instant::now();
        let mut result = TestResult {
            name: scenario.name.to_string(),
            group: scenario.group.to_string(),
            outcome: Outcome::Skipped,
            attempts: 0,
            duration_ms: 0,
            error: None,
        };

        if let Some(reason) = scenario.skip {
            debug!("Skipping {}: {}", scenario.full_name(), reason);
            result.error = Some(reason.to_string());
            return Ok(result);
        }

        let max_attempts = 1 + self.retries_override.unwrap_or(scenario.retries);
        for attempt in 1..=max_attempts {
            result.attempts = attempt;

            // A broken reset must stop the suite, never be retried
            self.reset.reset().await?;

            match self.attempt(scenario).await {
                Ok(()) => {
                    result.outcome = Outcome::Passed;
                    result.error = None;
                    break;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    if attempt < max_attempts {
                        warn!(
                            "{} failed (attempt {}/{}): {}",
                            scenario.full_name(),
                            attempt,
                            max_attempts,
                            e
                        );
                    }
                    result.outcome = Outcome::Failed;
                    result.error = Some(e.to_string());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn attempt(&self, scenario: &Scenario) -> E2eResult<()> {
        self.ctx.log_out().await?;
        (scenario.body)(self.ctx).await
    }
}

/// Write suite results as pretty JSON into `output_dir`
pub fn write_results(output_dir: &Path, results: &TestSuiteResult) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join("test-results.json");
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}
