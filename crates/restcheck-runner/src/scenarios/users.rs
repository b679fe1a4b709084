//! `/users` scenarios

use restcheck_core::expect::messages::{BLANK, BLANK_GENDER, INVALID, TAKEN};
use restcheck_core::expect::field_errors;
use serde_json::{Value, json};

use super::listing::{self, Listing};
use super::{Context, Fill, InvalidCase, MISSING_ID, Scenario, Template, case_id, fill_body};
use crate::checks::{self, CheckResult};
use crate::fabricate::Fabricator;

use Fill::{Random, Text};

const LISTING: Listing = Listing {
    group: "users",
    path: "/users",
    schema: "user",
    unique_items: false,
};

const CREATE_INVALID: &[InvalidCase] = &[
    InvalidCase {
        name: "no-fields",
        body: &[],
        expected: &[
            ("name", BLANK),
            ("email", BLANK),
            ("gender", BLANK_GENDER),
            ("status", BLANK),
        ],
    },
    InvalidCase {
        name: "name",
        body: &[("name", Random)],
        expected: &[("email", BLANK), ("gender", BLANK_GENDER), ("status", BLANK)],
    },
    InvalidCase {
        name: "empty-name",
        body: &[("name", Text(""))],
        expected: &[
            ("name", BLANK),
            ("email", BLANK),
            ("gender", BLANK_GENDER),
            ("status", BLANK),
        ],
    },
    InvalidCase {
        name: "email",
        body: &[("email", Random)],
        expected: &[("name", BLANK), ("gender", BLANK_GENDER), ("status", BLANK)],
    },
    InvalidCase {
        name: "invalid-email",
        body: &[("email", Text("foobar"))],
        expected: &[
            ("email", INVALID),
            ("name", BLANK),
            ("gender", BLANK_GENDER),
            ("status", BLANK),
        ],
    },
    InvalidCase {
        name: "name-email",
        body: &[("name", Random), ("email", Random)],
        expected: &[("gender", BLANK_GENDER), ("status", BLANK)],
    },
    InvalidCase {
        name: "name-empty-email",
        body: &[("name", Random), ("email", Text(""))],
        expected: &[("email", BLANK), ("gender", BLANK_GENDER), ("status", BLANK)],
    },
    InvalidCase {
        name: "name-email-gender",
        body: &[("name", Random), ("email", Random), ("gender", Text("female"))],
        expected: &[("status", BLANK)],
    },
    InvalidCase {
        name: "invalid-gender",
        body: &[("name", Random), ("email", Random), ("gender", Text("foobar"))],
        expected: &[("status", BLANK), ("gender", BLANK_GENDER)],
    },
    InvalidCase {
        name: "invalid-status",
        body: &[
            ("name", Random),
            ("email", Random),
            ("gender", Text("male")),
            ("status", Text("foobar")),
        ],
        expected: &[("status", BLANK)],
    },
];

const UPDATE_OK: &[(&str, Template)] = &[
    ("no-fields", &[]),
    ("name", &[("name", Random)]),
    ("email", &[("email", Random)]),
    ("name-email", &[("name", Random), ("email", Random)]),
    (
        "name-email-gender",
        &[("name", Random), ("email", Random), ("gender", Text("female"))],
    ),
    ("email-status", &[("email", Random), ("status", Text("inactive"))]),
    (
        "all",
        &[
            ("name", Random),
            ("email", Random),
            ("gender", Text("male")),
            ("status", Text("inactive")),
        ],
    ),
];

const UPDATE_INVALID: &[InvalidCase] = &[
    InvalidCase {
        name: "empty-name",
        body: &[("name", Text(""))],
        expected: &[("name", BLANK)],
    },
    InvalidCase {
        name: "invalid-email",
        body: &[("email", Text("foobar"))],
        expected: &[("email", INVALID)],
    },
    InvalidCase {
        name: "empty-name-invalid-email",
        body: &[("name", Text("")), ("email", Text("foobar"))],
        expected: &[("email", INVALID), ("name", BLANK)],
    },
    InvalidCase {
        name: "name-empty-email",
        body: &[("name", Random), ("email", Text(""))],
        expected: &[("email", BLANK)],
    },
    InvalidCase {
        name: "name-invalid-email",
        body: &[("name", Random), ("email", Text("barbaz"))],
        expected: &[("email", INVALID)],
    },
    InvalidCase {
        name: "invalid-gender",
        body: &[("name", Random), ("email", Random), ("gender", Text("foobar"))],
        expected: &[("gender", BLANK_GENDER)],
    },
    InvalidCase {
        name: "invalid-status",
        body: &[
            ("name", Random),
            ("email", Random),
            ("gender", Text("male")),
            ("status", Text("foobar")),
        ],
        expected: &[("status", BLANK)],
    },
];

const FULL_USER: Template = &[
    ("name", Random),
    ("email", Random),
    ("gender", Random),
    ("status", Random),
];

fn random_field(fake: &mut Fabricator, field: &str) -> Value {
    match field {
        "email" => Value::String(fake.email()),
        "gender" => Value::String(fake.gender().to_string()),
        "status" => Value::String(fake.user_status().to_string()),
        _ => Value::String(fake.name()),
    }
}

pub(super) fn scenarios() -> Vec<Scenario> {
    let mut out = vec![Scenario::new("users::create", create)];
    for case in CREATE_INVALID {
        out.push(Scenario::new(
            case_id("users::create_invalid", case.name),
            move |ctx| create_invalid(ctx, case),
        ));
    }
    for &(name, template) in UPDATE_OK {
        out.push(Scenario::new(case_id("users::update", name), move |ctx| {
            update(ctx, template)
        }));
    }
    for case in UPDATE_INVALID {
        out.push(Scenario::new(
            case_id("users::update_invalid", case.name),
            move |ctx| update_invalid(ctx, case),
        ));
    }
    out.push(Scenario::new("users::update_missing", update_missing));
    out.push(Scenario::new("users::update_taken_email", update_taken_email));
    out.push(Scenario::new("users::delete", delete));
    out.push(Scenario::new("users::delete_missing", delete_missing));
    out.extend(listing::scenarios(LISTING));
    out
}

fn create(ctx: &mut Context<'_>) -> CheckResult {
    let submitted = fill_body(FULL_USER, ctx.fake, random_field);
    let resp = ctx.api.post("/users", Value::Object(submitted.clone()))?;
    let body = checks::expect_json_status(&resp, 201)?;
    ctx.validate(&body, "user")?;
    checks::expect_echo(&body, &submitted)?;
    checks::expect_positive_id(&body)?;
    Ok(())
}

fn create_invalid(ctx: &mut Context<'_>, case: &InvalidCase) -> CheckResult {
    let submitted = fill_body(case.body, ctx.fake, random_field);
    let resp = ctx.api.post("/users", Value::Object(submitted))?;
    checks::expect_field_errors(&resp, case.expected())
}

fn update(ctx: &mut Context<'_>, template: Template) -> CheckResult {
    let user_id = ctx.create_user(None)?;
    let submitted = fill_body(template, ctx.fake, random_field);
    let resp = ctx
        .api
        .put(&format!("/users/{user_id}"), Value::Object(submitted.clone()))?;
    let body = checks::expect_json_status(&resp, 200)?;
    ctx.validate(&body, "user")?;
    checks::expect_field(&body, "id", &json!(user_id))?;
    checks::expect_echo(&body, &submitted)
}

fn update_invalid(ctx: &mut Context<'_>, case: &InvalidCase) -> CheckResult {
    let submitted = fill_body(case.body, ctx.fake, random_field);
    let user_id = ctx.create_user(None)?;
    let resp = ctx
        .api
        .put(&format!("/users/{user_id}"), Value::Object(submitted))?;
    checks::expect_field_errors(&resp, case.expected())
}

fn update_missing(ctx: &mut Context<'_>) -> CheckResult {
    let submitted = fill_body(FULL_USER, ctx.fake, random_field);
    let resp = ctx
        .api
        .put(&format!("/users/{MISSING_ID}"), Value::Object(submitted))?;
    checks::expect_not_found(&resp)
}

fn update_taken_email(ctx: &mut Context<'_>) -> CheckResult {
    let email = ctx.fake.email();
    ctx.create_user(Some(email.clone()))?;
    let user_id = ctx.create_user(None)?;
    let resp = ctx
        .api
        .put(&format!("/users/{user_id}"), json!({ "email": email }))?;
    checks::expect_field_errors(&resp, field_errors(&[("email", TAKEN)]))
}

fn delete(ctx: &mut Context<'_>) -> CheckResult {
    let user_id = ctx.create_user(None)?;
    let resp = ctx.api.delete(&format!("/users/{user_id}"))?;
    checks::expect_no_content(&resp)
}

fn delete_missing(ctx: &mut Context<'_>) -> CheckResult {
    let resp = ctx.api.delete(&format!("/users/{MISSING_ID}"))?;
    checks::expect_not_found(&resp)
}
