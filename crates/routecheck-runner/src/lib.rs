//! routecheck-runner: HTTP transport and scenario execution

pub mod client;
pub mod runner;
pub mod scenarios;

pub use client::HttpClient;
pub use runner::{RunnerError, Selection, SuiteRunner, SuiteSummary};
pub use scenarios::{Scenario, ScenarioContext, Suite};
