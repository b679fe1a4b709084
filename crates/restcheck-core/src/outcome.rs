//! Scenario outcomes and the run report
//!
//! A scenario either passes, fails (the API broke its contract) or errors
//! (the harness could not evaluate it: transport or schema-file problems).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Passed,
    Failed,
    Errored,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "PASS"),
            Self::Failed => write!(f, "FAIL"),
            Self::Errored => write!(f, "ERROR"),
        }
    }
}

/// Result of running one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioOutcome {
    /// Scenario id, e.g. "users::create_invalid[no-fields]"
    pub id: String,
    pub status: OutcomeStatus,
    /// Failure or error report (absent on pass)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub elapsed_ms: u64,
}

impl ScenarioOutcome {
    #[must_use]
    pub fn passed(id: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            id: id.into(),
            status: OutcomeStatus::Passed,
            message: None,
            elapsed_ms,
        }
    }

    #[must_use]
    pub fn with_problem(
        id: impl Into<String>,
        status: OutcomeStatus,
        message: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            status,
            message: Some(message.into()),
            elapsed_ms,
        }
    }
}

/// Counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub errored: u64,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    pub base_url: String,
    /// Fabricator seed, if one was set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub outcomes: Vec<ScenarioOutcome>,
    /// True if the run stopped at the first non-passing scenario
    #[serde(default)]
    pub stopped_early: bool,
}

impl RunReport {
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for outcome in &self.outcomes {
            summary.total += 1;
            match outcome.status {
                OutcomeStatus::Passed => summary.passed += 1,
                OutcomeStatus::Failed => summary.failed += 1,
                OutcomeStatus::Errored => summary.errored += 1,
            }
        }
        summary
    }

    /// Non-passing outcomes, in run order.
    pub fn problems(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status != OutcomeStatus::Passed)
    }

    /// 0 if every scenario passed, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        let s = self.summary();
        if s.failed == 0 && s.errored == 0 { 0 } else { 1 }
    }

    #[must_use]
    pub fn verdict_line(&self) -> String {
        let s = self.summary();
        let icon = if self.exit_code() == 0 { "PASS" } else { "FAIL" };
        format!(
            "{icon}: {} scenarios, {} passed, {} failed, {} errored",
            s.total, s.passed, s.failed, s.errored
        )
    }
}

/// JSON Schema of the report written by `--output json`.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(RunReport);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
