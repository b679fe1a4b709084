//! Drives the scenario catalog against the in-memory API.
//!
//! Run with: cargo test -p restcheck-runner --test catalog_offline

mod support;

use restcheck_core::{OutcomeStatus, ResponseSnapshot, RunReport, ScenarioOutcome, SchemaStore};
use restcheck_runner::{ApiRequest, Fabricator, SuiteRunner, Transport};
use serde_json::{Value, json};
use support::{Recorder, SimulatedApi, Tampered, Unreachable};

const SEED: u64 = 42;

fn run(api: &dyn Transport, schemas: &SchemaStore, filter: Option<&str>) -> RunReport {
    SuiteRunner::new(api, schemas)
        .with_filter(filter.map(String::from))
        .run(&mut Fabricator::new(Some(SEED)))
}

fn outcome_of<'a>(report: &'a RunReport, id: &str) -> &'a ScenarioOutcome {
    report
        .outcomes
        .iter()
        .find(|o| o.id == id)
        .unwrap_or_else(|| panic!("no outcome for {id}"))
}

#[test]
fn full_catalog_passes_against_conforming_api() {
    let api = SimulatedApi::seeded(12);
    let schemas = support::schemas();
    let report = run(&api, &schemas, None);

    let problems: Vec<_> = report.problems().collect();
    assert!(problems.is_empty(), "{problems:#?}");
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.outcomes.len(), restcheck_runner::catalog().len());
    assert_eq!(report.seed, Some(SEED));
    assert!(!report.stopped_early);
    assert_eq!(schemas.cached_names(), vec!["post", "todo", "user"]);
}

#[test]
fn same_seed_sends_identical_requests() {
    let schemas = support::schemas();

    let first = Recorder::new(SimulatedApi::seeded(12));
    run(&first, &schemas, Some("users::"));
    let second = Recorder::new(SimulatedApi::seeded(12));
    run(&second, &schemas, Some("users::"));

    let a = first.take();
    let b = second.take();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn delete_missing_targets_negative_id() {
    let schemas = support::schemas();
    let api = Recorder::new(SimulatedApi::seeded(12));
    run(&api, &schemas, Some("users::delete_missing"));

    let requests = api.take();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method.as_str(), "DELETE");
    assert_eq!(requests[0].path, "/users/-1");
    assert!(requests[0].body.is_none());
}

#[test]
fn pagination_sends_page_and_per_page() {
    let schemas = support::schemas();
    let api = Recorder::new(SimulatedApi::seeded(12));
    let report = run(&api, &schemas, Some("todos::pagination[page-out-of-range]"));
    assert_eq!(report.exit_code(), 0);

    let requests = api.take();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_param("page"), Some("9999999"));
    assert_eq!(requests[0].query_param("per_page"), Some("5"));
}

#[test]
fn wrong_content_type_fails_json_scenarios() {
    let api = Tampered {
        inner: SimulatedApi::seeded(12),
        edit: |_: &ApiRequest, mut resp: ResponseSnapshot| {
            if resp.headers.contains_key("content-type") {
                resp.headers
                    .insert("content-type".into(), "application/json".into());
            }
            resp
        },
    };
    let schemas = support::schemas();
    let report = run(&api, &schemas, Some("users::create"));

    assert_eq!(report.outcomes.len(), 11);
    for outcome in &report.outcomes {
        assert_eq!(outcome.status, OutcomeStatus::Failed, "{}", outcome.id);
        let message = outcome.message.as_deref().unwrap_or_default();
        assert!(message.contains("Content-Type"), "{message}");
    }
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn delete_with_content_type_fails() {
    let api = Tampered {
        inner: SimulatedApi::seeded(3),
        edit: |_: &ApiRequest, resp: ResponseSnapshot| {
            if resp.status == 204 {
                resp.with_header("Content-Type", "text/plain")
            } else {
                resp
            }
        },
    };
    let schemas = support::schemas();
    let report = run(&api, &schemas, Some("users::delete"));

    assert_eq!(outcome_of(&report, "users::delete").status, OutcomeStatus::Failed);
    assert_eq!(
        outcome_of(&report, "users::delete_missing").status,
        OutcomeStatus::Passed
    );
}

#[test]
fn schema_violation_fails_with_diagnostic() {
    let api = Tampered {
        inner: SimulatedApi::seeded(12),
        edit: |req: &ApiRequest, resp: ResponseSnapshot| {
            if req.path != "/users" || resp.status != 200 {
                return resp;
            }
            let mut users: Value = serde_json::from_str(&resp.body).unwrap();
            users[0]["gender"] = json!("other");
            resp.with_body(users.to_string())
        },
    };
    let schemas = support::schemas();
    let report = run(&api, &schemas, Some("users::list_schema"));

    let outcome = outcome_of(&report, "users::list_schema");
    assert_eq!(outcome.status, OutcomeStatus::Failed);
    let message = outcome.message.as_deref().unwrap_or_default();
    assert!(message.starts_with("Instance:\n"), "{message}");
    assert!(message.contains("JSON schema validation errors:\n[0, 'gender'] -> "), "{message}");
    assert!(message.contains("[TRUNCATED] (pass -v to show)"), "{message}");
}

#[test]
fn shuffled_validation_errors_still_match() {
    let api = Tampered {
        inner: SimulatedApi::seeded(3),
        edit: |_: &ApiRequest, resp: ResponseSnapshot| {
            if resp.status != 422 {
                return resp;
            }
            let mut errors: Vec<Value> = serde_json::from_str(&resp.body).unwrap();
            errors.reverse();
            resp.with_body(Value::Array(errors).to_string())
        },
    };
    let schemas = support::schemas();
    let report = run(&api, &schemas, Some("_invalid["));
    assert!(report.outcomes.len() >= 26);
    assert_eq!(report.exit_code(), 0, "{:#?}", report.problems().collect::<Vec<_>>());
}

#[test]
fn unreachable_api_errors_every_scenario() {
    let schemas = support::schemas();
    let report = run(&Unreachable, &schemas, Some("posts::"));

    assert!(!report.outcomes.is_empty());
    for outcome in &report.outcomes {
        assert_eq!(outcome.status, OutcomeStatus::Errored, "{}", outcome.id);
        assert!(
            outcome
                .message
                .as_deref()
                .is_some_and(|m| m.contains("connection refused"))
        );
    }
    assert_eq!(report.summary().errored, report.summary().total);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn missing_schema_files_error_only_schema_checks() {
    let dir = std::env::temp_dir().join("restcheck-no-such-schemas-dir");
    let schemas = SchemaStore::new(dir);
    let api = SimulatedApi::seeded(12);
    let report = run(&api, &schemas, Some("users::list"));

    assert_eq!(
        outcome_of(&report, "users::list_schema").status,
        OutcomeStatus::Errored
    );
    assert_eq!(
        outcome_of(&report, "users::list_unique_ids").status,
        OutcomeStatus::Passed
    );
}

#[test]
fn stop_on_failure_halts_after_first_problem() {
    let schemas = support::schemas();
    let report = SuiteRunner::new(&Unreachable, &schemas)
        .with_stop_on_failure(true)
        .run(&mut Fabricator::new(Some(SEED)));

    assert_eq!(report.outcomes.len(), 1);
    assert!(report.stopped_early);
    assert_eq!(report.outcomes[0].id, "users::create");
}

#[test]
fn duplicate_ids_in_listing_fail() {
    let api = Tampered {
        inner: SimulatedApi::seeded(12),
        edit: |req: &ApiRequest, resp: ResponseSnapshot| {
            if req.path != "/todos" || !req.query.is_empty() {
                return resp;
            }
            let mut todos: Vec<Value> = serde_json::from_str(&resp.body).unwrap();
            let first = todos[0].clone();
            todos.push(first);
            resp.with_body(Value::Array(todos).to_string())
        },
    };
    let schemas = support::schemas();
    let report = run(&api, &schemas, Some("todos::list"));

    let unique = outcome_of(&report, "todos::list_unique_ids");
    assert_eq!(unique.status, OutcomeStatus::Failed);
    assert!(
        unique
            .message
            .as_deref()
            .is_some_and(|m| m.starts_with("ids are not unique"))
    );
    assert_eq!(
        outcome_of(&report, "todos::list_schema").status,
        OutcomeStatus::Failed
    );
}
