//! `/users/{id}/todos` and `/todos` scenarios

use restcheck_core::expect::field_errors;
use restcheck_core::expect::messages::{BLANK, BLANK_TODO_STATUS, MUST_EXIST};
use serde_json::{Value, json};

use super::listing::{self, Listing};
use super::{Context, Fill, InvalidCase, MISSING_ID, Scenario, Template, case_id, fill_body};
use crate::checks::{self, CheckResult};
use crate::fabricate::Fabricator;

use Fill::{Random, Text};

const TITLE_WORDS: usize = 6;

const LISTING: Listing = Listing {
    group: "todos",
    path: "/todos",
    schema: "todo",
    unique_items: true,
};

const CREATE_OK: &[(&str, Template)] = &[
    (
        "all-fields",
        &[("title", Random), ("due_on", Random), ("status", Random)],
    ),
    ("missing-due_on", &[("title", Random), ("status", Random)]),
];

const CREATE_INVALID: &[InvalidCase] = &[
    InvalidCase {
        name: "no-fields",
        body: &[],
        expected: &[("title", BLANK), ("status", BLANK_TODO_STATUS)],
    },
    InvalidCase {
        name: "empty-title-status",
        body: &[("title", Text("")), ("status", Text(""))],
        expected: &[("title", BLANK), ("status", BLANK_TODO_STATUS)],
    },
    InvalidCase {
        name: "invalid-status",
        body: &[("title", Random), ("status", Text("invalid-status"))],
        expected: &[("status", BLANK_TODO_STATUS)],
    },
    InvalidCase {
        name: "empty-title",
        body: &[("title", Text("")), ("status", Random)],
        expected: &[("title", BLANK)],
    },
];

/// Fields echoed back on creation; absent ones must come back as `null`.
const ECHOED: &[&str] = &["title", "due_on", "status"];

fn random_field(fake: &mut Fabricator, field: &str) -> Value {
    match field {
        "due_on" => Value::String(fake.due_on()),
        "status" => Value::String(fake.todo_status().to_string()),
        _ => Value::String(fake.sentence(TITLE_WORDS)),
    }
}

pub(super) fn scenarios() -> Vec<Scenario> {
    let mut out = Vec::new();
    for &(name, template) in CREATE_OK {
        out.push(Scenario::new(case_id("todos::create", name), move |ctx| {
            create(ctx, template)
        }));
    }
    for case in CREATE_INVALID {
        out.push(Scenario::new(
            case_id("todos::create_invalid", case.name),
            move |ctx| create_invalid(ctx, case),
        ));
    }
    out.push(Scenario::new("todos::create_missing_user", create_missing_user));
    out.extend(listing::scenarios(LISTING));
    out
}

fn create(ctx: &mut Context<'_>, template: Template) -> CheckResult {
    let user_id = ctx.create_user(None)?;
    let submitted = fill_body(template, ctx.fake, random_field);
    let resp = ctx.api.post(
        &format!("/users/{user_id}/todos"),
        Value::Object(submitted.clone()),
    )?;
    let body = checks::expect_json_status(&resp, 201)?;
    ctx.validate(&body, "todo")?;
    checks::expect_field(&body, "user_id", &json!(user_id))?;
    for field in ECHOED {
        checks::expect_field(&body, field, submitted.get(*field).unwrap_or(&Value::Null))?;
    }
    checks::expect_positive_id(&body)?;
    Ok(())
}

fn create_invalid(ctx: &mut Context<'_>, case: &InvalidCase) -> CheckResult {
    let submitted = fill_body(case.body, ctx.fake, random_field);
    let user_id = ctx.create_user(None)?;
    let resp = ctx
        .api
        .post(&format!("/users/{user_id}/todos"), Value::Object(submitted))?;
    checks::expect_field_errors(&resp, case.expected())
}

fn create_missing_user(ctx: &mut Context<'_>) -> CheckResult {
    let submitted = json!({
        "user_id": MISSING_ID,
        "title": ctx.fake.sentence(TITLE_WORDS),
        "status": ctx.fake.todo_status(),
    });
    let resp = ctx
        .api
        .post(&format!("/users/{MISSING_ID}/todos"), submitted)?;
    checks::expect_field_errors(&resp, field_errors(&[("user", MUST_EXIST)]))
}
