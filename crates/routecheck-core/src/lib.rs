//! routecheck-core: Contract types and validation for routing/places APIs
//!
//! This crate builds route payloads, validates response bodies against a
//! schema document, checks the business rules both APIs must satisfy, and
//! records what each scenario saw. It never talks to the network itself;
//! see [`transport::Transport`].

pub mod config;
pub mod fixtures;
pub mod model;
pub mod payload;
pub mod report;
pub mod rules;
pub mod schema;
pub mod transport;
pub mod verdict;

pub use config::{Config, ConfigError};
pub use fixtures::Location;
pub use model::{ErrorResponse, PlaceSearchResult, Route, RouteResult};
pub use payload::{overrides, Overrides, RoutePayload, RoutePoint};
pub use report::{ReportError, ReportIndex, ScenarioReport, Step};
pub use rules::BoundingBox;
pub use schema::{SchemaDocument, SchemaLoadError};
pub use transport::{HttpRequest, HttpResponse, ResponseBody, Transport};
pub use verdict::{ContractError, FailureKind, FailureRecord, Verdict, VerdictStatus};
