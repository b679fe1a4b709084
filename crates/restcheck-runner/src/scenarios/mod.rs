//! Scenario catalog
//!
//! Every scenario is a named closure over a [`Context`]. Parameterised cases
//! expand to one scenario per case, with ids like
//! `users::create_invalid[no-fields]`.

mod listing;
mod posts;
mod todos;
mod users;

use restcheck_core::expect::FieldError;
use restcheck_core::{ListSchema, SchemaStore, SchemaValidator};
use serde_json::{Map, Value, json};

use crate::checks::{self, CheckResult};
use crate::client::Transport;
use crate::fabricate::Fabricator;

/// Id that does not belong to any resource.
pub(crate) const MISSING_ID: i64 = -1;

/// Everything a scenario may use.
pub struct Context<'a> {
    pub api: &'a dyn Transport,
    pub schemas: &'a SchemaStore,
    pub validator: SchemaValidator,
    pub fake: &'a mut Fabricator,
}

impl Context<'_> {
    /// Validate `instance` against the stored schema `name`.
    pub fn validate(&self, instance: &Value, name: &str) -> CheckResult {
        let schema = self.schemas.get(name)?;
        self.validator.validate(instance, &schema)?;
        Ok(())
    }

    /// Validate a listing against "array of `name`".
    pub fn validate_list(&self, instance: &Value, name: &str, shape: ListSchema) -> CheckResult {
        let schema = self.schemas.list_of(name, shape)?;
        self.validator.validate(instance, &schema)?;
        Ok(())
    }

    /// Create a fresh user and return its id.
    ///
    /// Asserts 201 and a JSON body; `email` overrides the fabricated one.
    pub fn create_user(&mut self, email: Option<String>) -> CheckResult<u64> {
        let email = email.unwrap_or_else(|| self.fake.email());
        let body = json!({
            "name": self.fake.name(),
            "email": email,
            "gender": self.fake.gender(),
            "status": self.fake.user_status(),
        });
        let resp = self.api.post("/users", body)?;
        let created = checks::expect_json_status(&resp, 201)?;
        let id = checks::expect_positive_id(&created)?;
        tracing::debug!(user_id = id, "created fixture user");
        Ok(id)
    }
}

type RunFn = Box<dyn Fn(&mut Context<'_>) -> CheckResult + Send + Sync>;

/// A named, runnable check.
pub struct Scenario {
    pub id: String,
    run: RunFn,
}

impl Scenario {
    pub fn new(
        id: impl Into<String>,
        run: impl Fn(&mut Context<'_>) -> CheckResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            run: Box::new(run),
        }
    }

    /// # Errors
    ///
    /// Returns the first failed check.
    pub fn run(&self, ctx: &mut Context<'_>) -> CheckResult {
        (self.run)(ctx)
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario").field("id", &self.id).finish()
    }
}

/// How a request-body field gets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fill {
    /// Fabricated per resource and field
    Random,
    /// Literal text
    Text(&'static str),
}

/// A body template: `(field, fill)` pairs.
pub(crate) type Template = &'static [(&'static str, Fill)];

/// One parameterised case expecting a 422.
pub(crate) struct InvalidCase {
    pub name: &'static str,
    pub body: Template,
    pub expected: &'static [(&'static str, &'static str)],
}

impl InvalidCase {
    pub(crate) fn expected(&self) -> Vec<FieldError> {
        restcheck_core::expect::field_errors(self.expected)
    }
}

/// Resolve a template into a JSON object. `random` fabricates per field.
pub(crate) fn fill_body(
    template: Template,
    fake: &mut Fabricator,
    random: fn(&mut Fabricator, &str) -> Value,
) -> Map<String, Value> {
    template
        .iter()
        .map(|(field, fill)| {
            let value = match fill {
                Fill::Random => random(fake, field),
                Fill::Text(text) => Value::String((*text).to_string()),
            };
            ((*field).to_string(), value)
        })
        .collect()
}

pub(crate) fn case_id(group: &str, case: &str) -> String {
    format!("{group}[{case}]")
}

/// The full catalog, in run order.
#[must_use]
pub fn catalog() -> Vec<Scenario> {
    let mut all = Vec::new();
    all.extend(users::scenarios());
    all.extend(posts::scenarios());
    all.extend(todos::scenarios());
    all
}

/// Catalog entries whose id contains `filter` (all when `None`).
#[must_use]
pub fn select(filter: Option<&str>) -> Vec<Scenario> {
    catalog()
        .into_iter()
        .filter(|s| filter.is_none_or(|f| s.id.contains(f)))
        .collect()
}
