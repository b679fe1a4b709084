//! restcheck-runner: HTTP client, data fabricator and scenario catalog

pub mod checks;
pub mod client;
pub mod fabricate;
pub mod scenarios;
pub mod suite;

pub use checks::ScenarioError;
pub use client::{ApiRequest, ClientError, Method, RestClient, Transport};
pub use fabricate::Fabricator;
pub use scenarios::{Context, Scenario, catalog};
pub use suite::SuiteRunner;
