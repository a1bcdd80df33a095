//! Scenario catalogue
//!
//! Each scenario is one user journey against the deployed app. Bodies are
//! plain functions returning a boxed future so the catalogue can be a static
//! list that the runner filters and iterates.

use std::future::Future;
use std::pin::Pin;

use crate::error::E2eResult;
use crate::journeys::ScenarioContext;

mod auth;
mod imagery;
mod map;

/// Retries each group grants a failing scenario before reporting it
pub const GROUP_RETRIES: u32 = 3;

pub type ScenarioFuture<'a> = Pin<Box<dyn Future<Output = E2eResult<()>> + Send + 'a>>;

pub type ScenarioBody = fn(&ScenarioContext) -> ScenarioFuture<'_>;

#[derive(Clone)]
pub struct Scenario {
    pub group: &'static str,
    pub name: &'static str,
    pub retries: u32,

    /// Reason the scenario is disabled, if it is
    pub skip: Option<&'static str>,

    pub body: ScenarioBody,
}

impl Scenario {
    pub fn new(group: &'static str, name: &'static str, body: ScenarioBody) -> Self {
        Self {
            group,
            name,
            retries: GROUP_RETRIES,
            skip: None,
            body,
        }
    }

    pub fn skipped(mut self, reason: &'static str) -> Self {
        self.skip = Some(reason);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} > {}", self.group, self.name)
    }

    /// Case-insensitive match on group or scenario name
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.to_lowercase();
        self.full_name().to_lowercase().contains(&filter)
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("group", &self.group)
            .field("name", &self.name)
            .field("retries", &self.retries)
            .field("skip", &self.skip)
            .finish()
    }
}

/// Every scenario, in execution order
pub fn all_scenarios() -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    scenarios.extend(map::scenarios());
    scenarios.extend(auth::scenarios());
    scenarios.extend(imagery::scenarios());
    scenarios
}

/// Scenarios whose full name contains `filter`, or all of them
pub fn select(filter: Option<&str>) -> Vec<Scenario> {
    all_scenarios()
        .into_iter()
        .filter(|s| filter.map_or(true, |f| s.matches(f)))
        .collect()
}
