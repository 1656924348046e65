//! Typed views over routing and places responses
//!
//! Only the fields the rules look at are typed; everything else is kept in
//! `extra` so attachments and diagnostics still see the whole object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::verdict::ContractError;

/// Routing response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub status: String,
    #[serde(rename = "type")]
    pub result_type: String,
    #[serde(default)]
    pub result: Vec<Route>,
}

/// One computed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub total_distance: f64,
    pub total_duration: f64,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub maneuvers: Vec<Maneuver>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One route step. The terminal maneuver has no outgoing path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcoming_path: Option<OutcomingPath>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomingPath {
    pub distance: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Places search response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSearchResult {
    pub result: PlaceItems,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceItems {
    #[serde(default)]
    pub items: Vec<Place>,
    pub total: i64,
}

/// A catalog object. Attributes stay untyped: the rules check presence,
/// nullness and emptiness, which a typed struct would hide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Place(pub Map<String, Value>);

impl Place {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// `point.lon`/`point.lat`, when both are numbers.
    #[must_use]
    pub fn point(&self) -> Option<PlacePoint> {
        let point = self.0.get("point")?;
        Some(PlacePoint {
            lon: point.get("lon")?.as_f64()?,
            lat: point.get("lat")?.as_f64()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacePoint {
    pub lon: f64,
    pub lat: f64,
}

/// "Not found" envelope: HTTP 200 with an application-level code inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub code: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deserialize a decoded body into one of the typed views.
///
/// # Errors
///
/// Returns `DecodeFailure` naming the target type when the shape does not fit.
pub fn parse<T: serde::de::DeserializeOwned>(body: &Value, what: &str) -> Result<T, ContractError> {
    T::deserialize(body).map_err(|e| ContractError::DecodeFailure {
        context: what.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn route_result_parses_with_terminal_maneuver() {
        let body = json!({
            "status": "OK",
            "type": "result",
            "query": {},
            "result": [{
                "id": "1",
                "algorithm": "с учётом пробок",
                "total_distance": 300,
                "total_duration": 60,
                "maneuvers": [
                    {"id": "m1", "outcoming_path": {"distance": 120, "duration": 20}},
                    {"id": "m2", "outcoming_path": {"distance": 180, "duration": 40}},
                    {"id": "m3", "comment": "finish"}
                ]
            }]
        });
        let parsed: RouteResult = parse(&body, "route result").unwrap();
        assert_eq!(parsed.status, "OK");
        assert_eq!(parsed.result_type, "result");
        let route = &parsed.result[0];
        assert_eq!(route.total_distance, 300.0);
        assert_eq!(route.maneuvers.len(), 3);
        assert!(route.maneuvers[2].outcoming_path.is_none());
        assert_eq!(route.extra.get("id"), Some(&json!("1")));
    }

    #[test]
    fn null_outcoming_path_is_absent() {
        let body = json!({"outcoming_path": null});
        let m: Maneuver = parse(&body, "maneuver").unwrap();
        assert!(m.outcoming_path.is_none());
    }

    #[test]
    fn route_missing_total_distance_is_decode_failure() {
        let body = json!({"total_duration": 1});
        let err = parse::<Route>(&body, "route").unwrap_err();
        match err {
            ContractError::DecodeFailure { context, message } => {
                assert_eq!(context, "route");
                assert!(message.contains("total_distance"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn place_point_extraction() {
        let place = Place(
            json!({"id": "1", "point": {"lon": 30.3, "lat": 59.9}})
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(place.point(), Some(PlacePoint { lon: 30.3, lat: 59.9 }));

        let no_lat = Place(json!({"point": {"lon": 30.3}}).as_object().cloned().unwrap());
        assert_eq!(no_lat.point(), None);
    }

    #[test]
    fn error_response_parses() {
        let body = json!({"meta": {"api_version": "3.0", "code": 404, "error": {"type": "itemNotFound"}}});
        let parsed: ErrorResponse = parse(&body, "error response").unwrap();
        assert_eq!(parsed.meta.code, 404);
    }
}
