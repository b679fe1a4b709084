//! restcheck-core: Core types and validation for REST API contract checks
//!
//! No network I/O lives here: configuration, response snapshots, the schema
//! store, Draft-07 validation with diagnostics, error-list comparison and the
//! run report.

pub mod config;
pub mod dump;
pub mod exchange;
pub mod expect;
pub mod outcome;
pub mod schema;
pub mod validate;

pub use config::{ApiToken, Config, ConfigError, Environment};
pub use dump::{DumpError, DumpIndex};
pub use exchange::{Exchange, JSON_CONTENT_TYPE, RequestSnapshot, ResponseSnapshot};
pub use expect::{FieldError, FieldErrorMismatch, compare_field_errors, messages};
pub use outcome::{OutcomeStatus, RunReport, ScenarioOutcome, Summary};
pub use schema::{ListSchema, SchemaError, SchemaStore};
pub use validate::{SchemaValidator, ValidationFailure, Violation};
