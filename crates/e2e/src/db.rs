//! Test database isolation
//!
//! Every scenario attempt starts from an empty database. The reset shells out
//! to the database's admin client and treats anything written to stderr as a
//! failure, since the client exits 0 even when it cannot connect.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error};

use crate::config::DatabaseConfig;
use crate::error::{E2eError, E2eResult};

/// Restores the shared external state before a scenario runs
#[async_trait]
pub trait IsolationReset: Send + Sync {
    async fn reset(&self) -> E2eResult<()>;
}

/// Drops the test database with the configured admin command
#[derive(Debug, Clone)]
pub struct DatabaseReset {
    program: String,
    args: Vec<String>,
}

impl DatabaseReset {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.resolved_args(),
        }
    }
}

#[async_trait]
impl IsolationReset for DatabaseReset {
    async fn reset(&self) -> E2eResult<()> {
        debug!("Resetting database: {} {}", self.program, self.args.join(" "));

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| E2eError::ResetFailed(format!("failed to run {}: {}", self.program, e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            error!("{}", stderr);
            return Err(E2eError::ResetFailed(stderr.into_owned()));
        }

        Ok(())
    }
}
