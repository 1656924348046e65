//! Places API scenarios

use serde_json::json;

use routecheck_core::fixtures::{LOMONOSOV_SQUARE, PACIFIC_OCEAN};
use routecheck_core::model::{self, ErrorResponse, PlaceSearchResult};
use routecheck_core::rules::{self, SAINT_PETERSBURG};
use routecheck_core::transport::HttpRequest;
use routecheck_core::{ContractError, Location, ScenarioReport};

use super::{ScenarioContext, check_status, send_step};

const CAFE_QUERY: &str = "кафе";
const DESERTED_QUERY: &str = "вода соленая";
/// Asks the catalog to include coordinates in each item.
const POINT_FIELDS: &str = "items.point";
/// `meta.code` the catalog uses for "nothing found".
const NOT_FOUND_CODE: i64 = 404;

fn search_request(ctx: &ScenarioContext<'_>, query: &str, location: Location) -> HttpRequest {
    HttpRequest::get(&ctx.config.places_url)
        .with_query("q", query)
        .with_query("location", location.as_query())
        .with_query("key", &ctx.config.api_key)
}

pub(super) fn search_places_by_query(
    ctx: &ScenarioContext<'_>,
    report: &mut ScenarioReport,
) -> Result<(), ContractError> {
    let request =
        search_request(ctx, CAFE_QUERY, LOMONOSOV_SQUARE).with_query("fields", POINT_FIELDS);
    let response = send_step(ctx, report, "Search for cafes near Lomonosov Square", &request)?;

    report.attach(
        "Attach places request/response data",
        &json!({"params": request.masked_query()}),
        &response,
    );

    check_status(report, &request, &response, 200)?;

    report.step("Check response structure and object attributes", |step| {
        let body = response.json("places response")?;
        let found: PlaceSearchResult = model::parse(&body, "places response")?;
        if let Some(first) = found.result.items.first() {
            step.attach_json(
                "Places search results",
                &json!({
                    "first_place_attributes": first,
                    "total_places_found": found.result.total,
                    "items_returned": found.result.items.len(),
                }),
            );
        }
        rules::check_places(&found, &SAINT_PETERSBURG)
    })
}

pub(super) fn search_deserted_places(
    ctx: &ScenarioContext<'_>,
    report: &mut ScenarioReport,
) -> Result<(), ContractError> {
    let request = search_request(ctx, DESERTED_QUERY, PACIFIC_OCEAN);
    let response = send_step(
        ctx,
        report,
        "Search for salty water in the Pacific Ocean",
        &request,
    )?;

    report.attach(
        "Attach places request/response data",
        &json!({"params": request.masked_query()}),
        &response,
    );

    check_status(report, &request, &response, 200)?;

    report.step("Check on real status code", |_| {
        let body = response.json("places response")?;
        let envelope: ErrorResponse = model::parse(&body, "places error envelope")?;
        rules::check_meta_code(&envelope, NOT_FOUND_CODE)
    })
}
