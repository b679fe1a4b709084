//! Sequential scenario runner

use std::time::Instant;

use restcheck_core::{OutcomeStatus, RunReport, ScenarioOutcome, SchemaStore, SchemaValidator};

use crate::client::Transport;
use crate::fabricate::Fabricator;
use crate::scenarios::{self, Context, Scenario};

/// Runs catalog scenarios one after another against a [`Transport`].
pub struct SuiteRunner<'a> {
    api: &'a dyn Transport,
    schemas: &'a SchemaStore,
    validator: SchemaValidator,
    filter: Option<String>,
    /// Stop at the first scenario that does not pass
    stop_on_failure: bool,
}

impl<'a> SuiteRunner<'a> {
    #[must_use]
    pub fn new(api: &'a dyn Transport, schemas: &'a SchemaStore) -> Self {
        Self {
            api,
            schemas,
            validator: SchemaValidator::default(),
            filter: None,
            stop_on_failure: false,
        }
    }

    #[must_use]
    pub fn with_validator(mut self, validator: SchemaValidator) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Scenarios this runner would execute, in order.
    #[must_use]
    pub fn plan(&self) -> Vec<Scenario> {
        scenarios::select(self.filter.as_deref())
    }

    /// Run the selected catalog.
    pub fn run(&self, fake: &mut Fabricator) -> RunReport {
        self.run_scenarios(&self.plan(), fake)
    }

    /// Run an explicit list of scenarios.
    pub fn run_scenarios(&self, scenarios: &[Scenario], fake: &mut Fabricator) -> RunReport {
        tracing::info!(
            scenarios = scenarios.len(),
            base_url = self.api.base_url(),
            seed = ?fake.seed(),
            "starting run"
        );

        let mut outcomes = Vec::with_capacity(scenarios.len());
        let mut stopped_early = false;

        for scenario in scenarios {
            let outcome = self.run_one(scenario, fake);
            let passed = outcome.status == OutcomeStatus::Passed;
            outcomes.push(outcome);
            if self.stop_on_failure && !passed {
                tracing::warn!(id = %scenario.id, "stopping early: scenario did not pass");
                stopped_early = true;
                break;
            }
        }

        RunReport {
            base_url: self.api.base_url().to_string(),
            seed: fake.seed(),
            outcomes,
            stopped_early,
        }
    }

    fn run_one(&self, scenario: &Scenario, fake: &mut Fabricator) -> ScenarioOutcome {
        let mut ctx = Context {
            api: self.api,
            schemas: self.schemas,
            validator: self.validator,
            fake,
        };
        let start = Instant::now();
        let result = scenario.run(&mut ctx);
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(()) => {
                tracing::info!(id = %scenario.id, elapsed_ms, "PASS");
                ScenarioOutcome::passed(&scenario.id, elapsed_ms)
            }
            Err(err) => {
                let status = err.status();
                tracing::warn!(
                    id = %scenario.id,
                    %status,
                    elapsed_ms,
                    error = %err,
                    "scenario did not pass"
                );
                ScenarioOutcome::with_problem(&scenario.id, status, err.to_string(), elapsed_ms)
            }
        }
    }
}
