//! `/users/{id}/posts` and `/posts` scenarios

use restcheck_core::expect::field_errors;
use restcheck_core::expect::messages::{BLANK, MUST_EXIST};
use serde_json::{Value, json};

use super::listing::{self, Listing};
use super::{Context, Fill, InvalidCase, MISSING_ID, Scenario, case_id, fill_body};
use crate::checks::{self, CheckResult};
use crate::fabricate::Fabricator;

use Fill::{Random, Text};

const TITLE_WORDS: usize = 6;
const BODY_CHARS: usize = 200;

const LISTING: Listing = Listing {
    group: "posts",
    path: "/posts",
    schema: "post",
    unique_items: false,
};

const CREATE_INVALID: &[InvalidCase] = &[
    InvalidCase {
        name: "no-fields",
        body: &[],
        expected: &[("title", BLANK), ("body", BLANK)],
    },
    InvalidCase {
        name: "title",
        body: &[("title", Random)],
        expected: &[("body", BLANK)],
    },
    InvalidCase {
        name: "empty-title",
        body: &[("title", Text(""))],
        expected: &[("title", BLANK), ("body", BLANK)],
    },
    InvalidCase {
        name: "body",
        body: &[("body", Random)],
        expected: &[("title", BLANK)],
    },
    InvalidCase {
        name: "empty-body",
        body: &[("title", Random), ("body", Text(""))],
        expected: &[("body", BLANK)],
    },
];

fn random_field(fake: &mut Fabricator, field: &str) -> Value {
    match field {
        "body" => Value::String(fake.text(BODY_CHARS)),
        _ => Value::String(fake.sentence(TITLE_WORDS)),
    }
}

pub(super) fn scenarios() -> Vec<Scenario> {
    let mut out = vec![Scenario::new("posts::create", create)];
    for case in CREATE_INVALID {
        out.push(Scenario::new(
            case_id("posts::create_invalid", case.name),
            move |ctx| create_invalid(ctx, case),
        ));
    }
    out.push(Scenario::new("posts::create_missing_user", create_missing_user));
    out.extend(listing::scenarios(LISTING));
    out
}

fn create(ctx: &mut Context<'_>) -> CheckResult {
    let user_id = ctx.create_user(None)?;
    let submitted = json!({
        "user_id": user_id,
        "title": ctx.fake.sentence(TITLE_WORDS),
        "body": ctx.fake.text(BODY_CHARS),
    });
    let resp = ctx
        .api
        .post(&format!("/users/{user_id}/posts"), submitted.clone())?;
    let body = checks::expect_json_status(&resp, 201)?;
    ctx.validate(&body, "post")?;
    if let Value::Object(fields) = &submitted {
        checks::expect_echo(&body, fields)?;
    }
    checks::expect_positive_id(&body)?;
    Ok(())
}

fn create_invalid(ctx: &mut Context<'_>, case: &InvalidCase) -> CheckResult {
    let submitted = fill_body(case.body, ctx.fake, random_field);
    let user_id = ctx.create_user(None)?;
    let resp = ctx
        .api
        .post(&format!("/users/{user_id}/posts"), Value::Object(submitted))?;
    checks::expect_field_errors(&resp, case.expected())
}

fn create_missing_user(ctx: &mut Context<'_>) -> CheckResult {
    let submitted = json!({
        "user_id": MISSING_ID,
        "title": ctx.fake.sentence(TITLE_WORDS),
        "body": ctx.fake.text(BODY_CHARS),
    });
    let resp = ctx
        .api
        .post(&format!("/users/{MISSING_ID}/posts"), submitted)?;
    checks::expect_field_errors(&resp, field_errors(&[("user", MUST_EXIST)]))
}
