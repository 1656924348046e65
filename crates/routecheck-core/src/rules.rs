//! Business rules over parsed routing and places responses
//!
//! No I/O. Each check returns `Ok` or a `ContractError` carrying both the
//! expected and the observed value.

use serde::{Deserialize, Serialize};

use crate::model::{ErrorResponse, PlaceSearchResult, Route, RouteResult};
use crate::verdict::ContractError;

/// `algorithm` label the routing API reports for live traffic.
pub const ALGORITHM_WITH_TRAFFIC: &str = "с учётом пробок";
/// `algorithm` label the routing API reports for statistical traffic.
pub const ALGORITHM_WITHOUT_TRAFFIC: &str = "без учёта пробок";

/// Attributes the first place of a valid search must carry.
pub const REQUIRED_PLACE_ATTRIBUTES: [&str; 3] = ["id", "name", "type"];

/// Expected `algorithm` label for a `traffic_mode`, if the mode is known.
#[must_use]
pub fn expected_algorithm(traffic_mode: &str) -> Option<&'static str> {
    match traffic_mode {
        "jam" => Some(ALGORITHM_WITH_TRAFFIC),
        "statistics" => Some(ALGORITHM_WITHOUT_TRAFFIC),
        _ => None,
    }
}

/// HTTP status must equal `expected`.
///
/// # Errors
///
/// Returns `UnexpectedStatus` naming the actual code.
pub fn expect_status(context: &str, expected: u16, actual: u16) -> Result<(), ContractError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ContractError::UnexpectedStatus {
            context: context.to_string(),
            expected,
            actual,
        })
    }
}

/// Envelope: `status == "OK"`, `type == "result"`, at least one route.
///
/// Returns the first route.
///
/// # Errors
///
/// Returns `BusinessRuleViolation` for the first field that does not match.
pub fn check_route_envelope(result: &RouteResult) -> Result<&Route, ContractError> {
    if result.status != "OK" {
        return Err(ContractError::rule(
            "envelope_status",
            "response status is not OK",
            "OK",
            &result.status,
        ));
    }
    if result.result_type != "result" {
        return Err(ContractError::rule(
            "envelope_type",
            "response type is not result",
            "result",
            &result.result_type,
        ));
    }
    result.result.first().ok_or_else(|| {
        ContractError::rule("envelope_routes", "no routes returned", "at least 1", 0)
    })
}

/// Route shape rules: positive totals, a named algorithm, start and end maneuvers.
///
/// # Errors
///
/// Returns `BusinessRuleViolation` for the first rule that fails.
pub fn check_route(route: &Route) -> Result<(), ContractError> {
    if !(route.total_distance > 0.0) {
        return Err(ContractError::rule(
            "total_distance_positive",
            "total_distance must be positive",
            "> 0",
            route.total_distance,
        ));
    }
    if !(route.total_duration > 0.0) {
        return Err(ContractError::rule(
            "total_duration_positive",
            "total_duration must be positive",
            "> 0",
            route.total_duration,
        ));
    }
    match route.algorithm.as_deref() {
        Some(a) if !a.is_empty() => {}
        other => {
            return Err(ContractError::rule(
                "algorithm_present",
                "algorithm must be present and non-empty",
                "non-empty string",
                format!("{other:?}"),
            ));
        }
    }
    if route.maneuvers.len() < 2 {
        return Err(ContractError::rule(
            "maneuver_count",
            "a route needs at least a start and an end maneuver",
            ">= 2",
            route.maneuvers.len(),
        ));
    }
    Ok(())
}

/// Totals attached to the report next to the distance check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceSummary {
    pub total_distance: f64,
    pub total_segment_distance: f64,
    pub segments_count: usize,
}

/// Sum of `outcoming_path.distance` over maneuvers that have one.
#[must_use]
pub fn segment_distance_sum(route: &Route) -> f64 {
    route
        .maneuvers
        .iter()
        .filter_map(|m| m.outcoming_path.as_ref())
        .map(|p| p.distance)
        .sum()
}

#[must_use]
pub fn distance_summary(route: &Route) -> DistanceSummary {
    DistanceSummary {
        total_distance: route.total_distance,
        total_segment_distance: segment_distance_sum(route),
        segments_count: route.maneuvers.len(),
    }
}

/// `total_distance` must equal the segment sum exactly.
///
/// The upstream API reports whole meters, so exact equality holds today.
/// Any rounding upstream would break it; a tolerance would be the fix, but
/// the comparison stays exact until that is decided.
///
/// # Errors
///
/// Returns `BusinessRuleViolation` with both totals in the message.
pub fn check_distance_sum(summary: &DistanceSummary) -> Result<(), ContractError> {
    #[allow(clippy::float_cmp)]
    let equal = summary.total_distance == summary.total_segment_distance;
    if equal {
        Ok(())
    } else {
        Err(ContractError::rule(
            "distance_sum",
            format!(
                "total_distance:{} does not match the per-segment sum:{}",
                summary.total_distance, summary.total_segment_distance
            ),
            summary.total_distance,
            summary.total_segment_distance,
        ))
    }
}

/// `algorithm` must equal the label expected for the requested traffic mode.
///
/// # Errors
///
/// Returns `BusinessRuleViolation` with both labels.
pub fn check_algorithm(route: &Route, expected: &str) -> Result<(), ContractError> {
    let actual = route.algorithm.as_deref().unwrap_or("");
    if actual == expected {
        Ok(())
    } else {
        Err(ContractError::rule(
            "traffic_algorithm",
            "algorithm does not reflect the requested traffic mode",
            expected,
            actual,
        ))
    }
}

/// Two routes built from the same payload must have the same length.
///
/// # Errors
///
/// Returns `BusinessRuleViolation` with both distances.
pub fn check_repeatable(first: &Route, second: &Route) -> Result<(), ContractError> {
    #[allow(clippy::float_cmp)]
    let equal = first.total_distance == second.total_distance;
    if equal {
        Ok(())
    } else {
        Err(ContractError::rule(
            "repeatable_distance",
            "same payload produced different total_distance",
            first.total_distance,
            second.total_distance,
        ))
    }
}

/// Open interval on both axes: `min < value < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(lon: (f64, f64), lat: (f64, f64)) -> Self {
        Self {
            min_lon: lon.0,
            max_lon: lon.1,
            min_lat: lat.0,
            max_lat: lat.1,
        }
    }

    #[must_use]
    pub fn contains_lon(&self, lon: f64) -> bool {
        self.min_lon < lon && lon < self.max_lon
    }

    #[must_use]
    pub fn contains_lat(&self, lat: f64) -> bool {
        self.min_lat < lat && lat < self.max_lat
    }
}

/// Around Saint Petersburg.
pub const SAINT_PETERSBURG: BoundingBox = BoundingBox::new((29.0, 31.0), (58.0, 60.0));

/// Places search rules: something was found, the first item carries the
/// required attributes, and its point lies inside `bbox`.
///
/// # Errors
///
/// Returns `BusinessRuleViolation` for the first rule that fails.
pub fn check_places(result: &PlaceSearchResult, bbox: &BoundingBox) -> Result<(), ContractError> {
    let total = result.result.total;
    if total <= 0 {
        return Err(ContractError::rule(
            "places_total",
            "No places found for the query",
            "> 0",
            total,
        ));
    }
    let Some(first) = result.result.items.first() else {
        return Err(ContractError::rule(
            "places_items",
            "Items array is empty",
            "at least 1",
            0,
        ));
    };

    for attr in REQUIRED_PLACE_ATTRIBUTES {
        match first.attribute(attr) {
            None => {
                return Err(ContractError::rule(
                    "place_attributes",
                    format!("Missing required attribute: {attr}"),
                    "present",
                    "missing",
                ));
            }
            Some(v) if is_blank(v) => {
                return Err(ContractError::rule(
                    "place_attributes",
                    format!("Attribute {attr} is null or empty"),
                    "non-empty",
                    v,
                ));
            }
            Some(_) => {}
        }
    }

    let point = first.attribute("point");
    let lon = point.and_then(|p| p.get("lon")).and_then(|v| v.as_f64());
    let lat = point.and_then(|p| p.get("lat")).and_then(|v| v.as_f64());
    let Some(lon) = lon else {
        return Err(ContractError::rule(
            "place_point",
            "Point missing lon coordinate",
            "number",
            "missing",
        ));
    };
    let Some(lat) = lat else {
        return Err(ContractError::rule(
            "place_point",
            "Point missing lat coordinate",
            "number",
            "missing",
        ));
    };
    if !bbox.contains_lon(lon) {
        return Err(ContractError::rule(
            "place_point",
            "Invalid longitude",
            format!("{} < lon < {}", bbox.min_lon, bbox.max_lon),
            lon,
        ));
    }
    if !bbox.contains_lat(lat) {
        return Err(ContractError::rule(
            "place_point",
            "Invalid latitude",
            format!("{} < lat < {}", bbox.min_lat, bbox.max_lat),
            lat,
        ));
    }
    Ok(())
}

/// Null, `false`, zero, and empty strings/arrays/objects all count as blank.
fn is_blank(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// The application-level `meta.code` must equal `expected`.
///
/// Checked separately from the HTTP status: the places API reports
/// "not found" inside a 200 envelope.
///
/// # Errors
///
/// Returns `BusinessRuleViolation` with both codes.
pub fn check_meta_code(response: &ErrorResponse, expected: i64) -> Result<(), ContractError> {
    if response.meta.code == expected {
        Ok(())
    } else {
        Err(ContractError::rule(
            "meta_code",
            format!(
                "Expected {expected} status code, got {}",
                response.meta.code
            ),
            expected,
            response.meta.code,
        ))
    }
}
