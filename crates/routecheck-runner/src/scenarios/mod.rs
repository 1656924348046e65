//! Scenario catalogue
//!
//! A scenario is a fixed sequence of named steps against one API. The first
//! failing step ends the scenario; nothing after it runs.

mod places;
mod routing;

use std::fmt;
use std::str::FromStr;

use routecheck_core::payload::RoutePoint;
use routecheck_core::rules;
use routecheck_core::transport::{HttpRequest, HttpResponse};
use routecheck_core::{Config, ContractError, ScenarioReport, SchemaDocument, Transport};

/// Point set used by scenarios that need just one route.
const DEFAULT_POINT_SET: &str = "Moscow_1";

/// Suite marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suite {
    Routing,
    Catalog,
}

impl Suite {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Routing => "routing",
            Self::Catalog => "catalog",
        }
    }

    /// API area reported as the scenario's story.
    #[must_use]
    pub const fn story(self) -> &'static str {
        match self {
            Self::Routing => "Routing API",
            Self::Catalog => "Places API",
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Suite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "routing" => Ok(Self::Routing),
            "catalog" => Ok(Self::Catalog),
            other => Err(format!("unknown suite '{other}' (expected routing or catalog)")),
        }
    }
}

/// Everything a scenario borrows while it runs.
#[derive(Clone, Copy)]
pub struct ScenarioContext<'a> {
    pub config: &'a Config,
    pub schema: &'a SchemaDocument,
    pub transport: &'a dyn Transport,
}

#[derive(Debug, Clone)]
enum ScenarioKind {
    BuildRoute { points: Vec<RoutePoint> },
    TrafficMode { mode: &'static str, points: Vec<RoutePoint> },
    ErrorHandling,
    RepeatableDistance { points: Vec<RoutePoint> },
    SearchPlaces,
    SearchDeserted,
}

/// One runnable scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub id: String,
    pub suite: Suite,
    pub title: String,
    kind: ScenarioKind,
}

impl Scenario {
    fn new(
        id: impl Into<String>,
        suite: Suite,
        title: impl Into<String>,
        kind: ScenarioKind,
    ) -> Self {
        Self {
            id: id.into(),
            suite,
            title: title.into(),
            kind,
        }
    }

    /// Run every step and return the report. Never panics on API misbehaviour.
    #[must_use]
    pub fn run(&self, ctx: &ScenarioContext<'_>) -> ScenarioReport {
        let mut report = ScenarioReport::new(
            &self.id,
            self.suite.as_str(),
            self.suite.story(),
            &self.title,
        );
        tracing::info!(scenario = %self.id, suite = %self.suite, "scenario started");

        let result = self.execute(ctx, &mut report);
        report.finish(result);

        if report.passed() {
            tracing::info!(
                scenario = %self.id,
                duration_ms = report.duration_ms,
                "scenario passed"
            );
        } else {
            let message = report.failure.as_ref().map_or("", |f| f.message.as_str());
            tracing::warn!(scenario = %self.id, error = message, "scenario failed");
        }
        report
    }

    fn execute(
        &self,
        ctx: &ScenarioContext<'_>,
        report: &mut ScenarioReport,
    ) -> Result<(), ContractError> {
        match &self.kind {
            ScenarioKind::BuildRoute { points } => {
                routing::build_driving_route(ctx, report, points)
            }
            ScenarioKind::TrafficMode { mode, points } => {
                routing::traffic_mode(ctx, report, mode, points)
            }
            ScenarioKind::ErrorHandling => routing::error_handling(ctx, report),
            ScenarioKind::RepeatableDistance { points } => {
                routing::repeatable_distance(ctx, report, points)
            }
            ScenarioKind::SearchPlaces => places::search_places_by_query(ctx, report),
            ScenarioKind::SearchDeserted => places::search_deserted_places(ctx, report),
        }
    }
}

/// Build the scenario list for `config`.
///
/// One route scenario per configured point set. Scenarios needing a single
/// route use `Moscow_1`, or the first configured set when that name is
/// absent; they are left out when no point set is configured.
#[must_use]
pub fn catalogue(config: &Config) -> Vec<Scenario> {
    let mut scenarios: Vec<Scenario> = config
        .points
        .iter()
        .map(|(name, points)| {
            Scenario::new(
                format!("build_driving_route[{name}]"),
                Suite::Routing,
                "Building route with 2 points: driving",
                ScenarioKind::BuildRoute {
                    points: points.clone(),
                },
            )
        })
        .collect();

    let single = config
        .points_for(DEFAULT_POINT_SET)
        .ok()
        .or_else(|| config.points.values().next().map(Vec::as_slice))
        .map(<[RoutePoint]>::to_vec);

    if let Some(points) = &single {
        for mode in ["jam", "statistics"] {
            scenarios.push(Scenario::new(
                format!("traffic_modes[{mode}]"),
                Suite::Routing,
                "Test traffic modes",
                ScenarioKind::TrafficMode {
                    mode,
                    points: points.clone(),
                },
            ));
        }
    }

    scenarios.push(Scenario::new(
        "error_handling",
        Suite::Routing,
        "Check error handling with invalid input",
        ScenarioKind::ErrorHandling,
    ));

    if let Some(points) = single {
        scenarios.push(Scenario::new(
            "repeatable_distance",
            Suite::Routing,
            "Same payload yields the same distance",
            ScenarioKind::RepeatableDistance { points },
        ));
    }

    scenarios.push(Scenario::new(
        "search_places_by_query",
        Suite::Catalog,
        "Search places by text query and validate attributes",
        ScenarioKind::SearchPlaces,
    ));
    scenarios.push(Scenario::new(
        "search_deserted_places",
        Suite::Catalog,
        "Search deserted/unsupported places by text query",
        ScenarioKind::SearchDeserted,
    ));

    scenarios
}

/// Send `request` inside a step named `step`, recording the round trip.
fn send_step(
    ctx: &ScenarioContext<'_>,
    report: &mut ScenarioReport,
    step: &str,
    request: &HttpRequest,
) -> Result<HttpResponse, ContractError> {
    report.step(step, |step| {
        let response = ctx.transport.send(request)?;
        step.elapsed_ms = Some(response.elapsed_ms);
        Ok(response)
    })
}

fn check_status(
    report: &mut ScenarioReport,
    request: &HttpRequest,
    response: &HttpResponse,
    expected: u16,
) -> Result<(), ContractError> {
    report.step("Check on http status code", |_| {
        rules::expect_status(&request.label(), expected, response.status)
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use routecheck_core::transport::{HttpRequest, HttpResponse, Transport};
    use routecheck_core::ContractError;

    /// Replays canned responses in order and records every request.
    #[derive(Default)]
    pub struct CannedTransport {
        responses: RefCell<VecDeque<Result<HttpResponse, ContractError>>>,
        pub requests: RefCell<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        pub fn new(responses: Vec<Result<HttpResponse, ContractError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requests: RefCell::new(Vec::new()),
            }
        }

        pub fn ok(status: u16, body: &str) -> Self {
            Self::new(vec![Ok(HttpResponse::new(status, body))])
        }
    }

    impl Transport for CannedTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ContractError> {
            self.requests.borrow_mut().push(request.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ContractError::Connection {
                    url: request.url.clone(),
                    message: "no canned response left".into(),
                }))
        }
    }
}
