//! Named, ordered test steps and their report.
//!
//! Each step is awaited to completion before the next one starts. A failed
//! assertion marks its step failed and the scenario moves on; any other
//! failure (an action, navigation or session error) marks the step failed and
//! every later step is recorded as skipped without running.

use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::IntoFuture;
use std::time::Instant;
use tracing::Instrument;

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    /// Step ran and succeeded
    Passed,
    /// Step ran and failed
    Failed,
    /// Step did not run because an earlier step aborted the scenario
    Skipped,
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Step name
    pub name: String,
    /// Outcome
    pub outcome: StepOutcome,
    /// Wall time spent in the step
    pub duration_ms: u64,
    /// Failure message
    pub error: Option<String>,
}

/// Report of a finished scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub scenario: String,
    /// Steps in execution order
    pub steps: Vec<StepReport>,
    /// Wall time of the whole scenario
    pub duration_ms: u64,
}

impl ScenarioReport {
    /// Whether no step failed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.outcome != StepOutcome::Failed)
    }

    /// Failed steps
    #[must_use]
    pub fn failures(&self) -> Vec<&StepReport> {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Failed)
            .collect()
    }

    /// Number of steps with the given outcome
    #[must_use]
    pub fn count(&self, outcome: StepOutcome) -> usize {
        self.steps.iter().filter(|s| s.outcome == outcome).count()
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> E2eResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Turn failed steps into an error naming each one
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::ScenarioFailed`] if any step failed
    pub fn into_result(self) -> E2eResult<()> {
        if self.passed() {
            return Ok(());
        }
        let failures = self
            .steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Failed)
            .map(|s| format!("{}: {}", s.name, s.error.as_deref().unwrap_or("failed")))
            .collect();
        Err(E2eError::ScenarioFailed {
            scenario: self.scenario,
            failures,
        })
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} passed, {} failed, {} skipped ({}ms)",
            self.scenario,
            self.count(StepOutcome::Passed),
            self.count(StepOutcome::Failed),
            self.count(StepOutcome::Skipped),
            self.duration_ms
        )?;
        for step in &self.steps {
            let mark = match step.outcome {
                StepOutcome::Passed => "ok",
                StepOutcome::Failed => "FAILED",
                StepOutcome::Skipped => "skipped",
            };
            write!(f, "  [{mark}] {}", step.name)?;
            if let Some(error) = &step.error {
                write!(f, ": {error}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A running scenario
#[derive(Debug)]
pub struct Scenario {
    name: String,
    started: Instant,
    steps: Vec<StepReport>,
    aborted: bool,
}

impl Scenario {
    /// Start a scenario
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::info!(scenario = %name, "scenario started");
        Self {
            name,
            started: Instant::now(),
            steps: Vec::new(),
            aborted: false,
        }
    }

    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a non-assertion failure stopped the scenario
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Run one step.
    ///
    /// Returns the step's value, or `None` if it failed or was skipped. After
    /// an abort the future is dropped without being polled.
    pub async fn step<T, S>(&mut self, name: impl Into<String>, step: S) -> Option<T>
    where
        S: IntoFuture<Output = E2eResult<T>>,
    {
        let name = name.into();
        if self.aborted {
            tracing::debug!(scenario = %self.name, step = %name, "step skipped");
            self.steps.push(StepReport {
                name,
                outcome: StepOutcome::Skipped,
                duration_ms: 0,
                error: None,
            });
            return None;
        }

        let span = tracing::info_span!("step", scenario = %self.name, step = %name);
        let start = Instant::now();
        let result = step.into_future().instrument(span).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(value) => {
                tracing::info!(scenario = %self.name, step = %name, duration_ms, "step passed");
                self.steps.push(StepReport {
                    name,
                    outcome: StepOutcome::Passed,
                    duration_ms,
                    error: None,
                });
                Some(value)
            }
            Err(err) => {
                let aborts = err.aborts_scenario();
                tracing::warn!(scenario = %self.name, step = %name, error = %err, aborts, "step failed");
                self.aborted |= aborts;
                self.steps.push(StepReport {
                    name,
                    outcome: StepOutcome::Failed,
                    duration_ms,
                    error: Some(err.to_string()),
                });
                None
            }
        }
    }

    /// Finish and build the report
    #[must_use]
    pub fn finish(self) -> ScenarioReport {
        let report = ScenarioReport {
            scenario: self.name,
            steps: self.steps,
            duration_ms: self.started.elapsed().as_millis() as u64,
        };
        if report.passed() {
            tracing::info!(scenario = %report.scenario, "scenario passed");
        } else {
            tracing::warn!(
                scenario = %report.scenario,
                failed = report.count(StepOutcome::Failed),
                "scenario failed"
            );
        }
        report
    }
}
