//! Routing API scenarios

use serde_json::{Value, json};

use routecheck_core::model::{self, Route, RouteResult};
use routecheck_core::payload::{Overrides, RoutePayload, RoutePoint, overrides};
use routecheck_core::rules;
use routecheck_core::transport::{HttpRequest, HttpResponse};
use routecheck_core::{ContractError, ScenarioReport};

use super::{ScenarioContext, check_status, send_step};

/// Traffic mode with a deterministic result for identical payloads.
const STABLE_TRAFFIC_MODE: &str = "statistics";

fn route_request(ctx: &ScenarioContext<'_>, payload: &RoutePayload) -> HttpRequest {
    HttpRequest::post_json(&ctx.config.routing_url, payload.to_value())
}

fn validate_schema(
    ctx: &ScenarioContext<'_>,
    report: &mut ScenarioReport,
    response: &HttpResponse,
) -> Result<Value, ContractError> {
    report.step("Validate JSON schema", |_| {
        let body = response.json("routing response")?;
        ctx.schema.validate(&body)?;
        Ok(body)
    })
}

/// Envelope rules, returning the first route.
fn first_route(body: &Value) -> Result<Route, ContractError> {
    let result: RouteResult = model::parse(body, "routing response")?;
    rules::check_route_envelope(&result).cloned()
}

pub(super) fn build_driving_route(
    ctx: &ScenarioContext<'_>,
    report: &mut ScenarioReport,
    points: &[RoutePoint],
) -> Result<(), ContractError> {
    let payload = RoutePayload::with_defaults(points);
    let request = route_request(ctx, &payload);
    let response = send_step(ctx, report, "Send route request", &request)?;

    report.attach(
        "Attach request/response data",
        &json!({"points": points, "payload": payload}),
        &response,
    );

    check_status(report, &request, &response, 200)?;
    let body = validate_schema(ctx, report, &response)?;

    let route = report.step("Check on business logic", |_| {
        let route = first_route(&body)?;
        rules::check_route(&route)?;
        Ok(route)
    })?;

    report.step("Check on total route calculation", |step| {
        let summary = rules::distance_summary(&route);
        step.attach_json("Total distance info", &summary);
        rules::check_distance_sum(&summary)
    })
}

pub(super) fn traffic_mode(
    ctx: &ScenarioContext<'_>,
    report: &mut ScenarioReport,
    mode: &str,
    points: &[RoutePoint],
) -> Result<(), ContractError> {
    let expected = rules::expected_algorithm(mode).ok_or_else(|| {
        ContractError::rule(
            "traffic_algorithm",
            "no algorithm label known for traffic mode",
            "jam or statistics",
            mode,
        )
    })?;

    let payload = RoutePayload::build(points, overrides([("traffic_mode", mode)]));
    let request = route_request(ctx, &payload);
    let response = send_step(ctx, report, "Send route request", &request)?;

    check_status(report, &request, &response, 200)?;
    let body = validate_schema(ctx, report, &response)?;

    report.step(&format!("Check on algorithm's traffic mode {mode}"), |_| {
        let route = first_route(&body)?;
        rules::check_algorithm(&route, expected)
    })
}

pub(super) fn error_handling(
    ctx: &ScenarioContext<'_>,
    report: &mut ScenarioReport,
) -> Result<(), ContractError> {
    let payload = RoutePayload::build(&[], Overrides::new());
    let request = route_request(ctx, &payload);
    let response = send_step(ctx, report, "Send route request without points", &request)?;

    report.attach(
        "Attach request/response data",
        &json!({"payload": payload}),
        &response,
    );

    check_status(report, &request, &response, 400)
}

pub(super) fn repeatable_distance(
    ctx: &ScenarioContext<'_>,
    report: &mut ScenarioReport,
    points: &[RoutePoint],
) -> Result<(), ContractError> {
    let payload = RoutePayload::build(points, overrides([("traffic_mode", STABLE_TRAFFIC_MODE)]));
    let request = route_request(ctx, &payload);

    let first = send_step(ctx, report, "Send first route request", &request)?;
    check_status(report, &request, &first, 200)?;
    let second = send_step(ctx, report, "Send second route request", &request)?;
    check_status(report, &request, &second, 200)?;

    report.step("Check on repeatable distance", |step| {
        let a = first_route(&first.json("first routing response")?)?;
        let b = first_route(&second.json("second routing response")?)?;
        step.attach_json(
            "Distances",
            &json!({"first": a.total_distance, "second": b.total_distance}),
        );
        rules::check_repeatable(&a, &b)
    })
}
