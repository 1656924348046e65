//! Routing request payloads
//!
//! A payload is a flat JSON object: the default template, the caller's
//! points, then keyword overrides laid over the top key-by-key. Nothing is
//! validated here; an empty `points` list is a legitimate payload for
//! exercising the API's error path.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default template keys and values, in wire order.
pub const DEFAULT_TEMPLATE: &[(&str, &str)] = &[
    ("locale", "ru"),
    ("transport", "driving"),
    ("route_mode", "fastest"),
    ("traffic_mode", "jam"),
    ("output", "detailed"),
];

/// Kind of a route point. The routing API only ever receives stops from us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointType {
    Stop,
}

/// A single waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    #[serde(rename = "type", default = "default_point_type")]
    pub point_type: PointType,
    pub lon: f64,
    pub lat: f64,
}

fn default_point_type() -> PointType {
    PointType::Stop
}

impl RoutePoint {
    #[must_use]
    pub const fn stop(lon: f64, lat: f64) -> Self {
        Self {
            point_type: PointType::Stop,
            lon,
            lat,
        }
    }
}

/// Keyword overrides applied on top of the template.
pub type Overrides = Map<String, Value>;

/// Request body for the routing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutePayload(Map<String, Value>);

impl RoutePayload {
    /// Build a payload from `points` and `overrides`.
    ///
    /// Overrides replace whole top-level values, including `points`.
    #[must_use]
    pub fn build(points: &[RoutePoint], overrides: Overrides) -> Self {
        let mut fields = Map::new();
        fields.insert("points".to_string(), points_value(points));
        for (key, value) in DEFAULT_TEMPLATE {
            fields.insert((*key).to_string(), Value::String((*value).to_string()));
        }
        for (key, value) in overrides {
            fields.insert(key, value);
        }
        Self(fields)
    }

    /// Payload with the default template and no overrides.
    #[must_use]
    pub fn with_defaults(points: &[RoutePoint]) -> Self {
        Self::build(points, Overrides::new())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of entries in `points`, or 0 when overridden with a non-array.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.0
            .get("points")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Build an override map from `(key, value)` pairs.
///
/// ```
/// use routecheck_core::payload::overrides;
/// let ov = overrides([("traffic_mode", "statistics")]);
/// assert_eq!(ov["traffic_mode"], "statistics");
/// ```
pub fn overrides<K, V, I>(pairs: I) -> Overrides
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

fn points_value(points: &[RoutePoint]) -> Value {
    serde_json::to_value(points).unwrap_or_else(|_| Value::Array(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn moscow() -> Vec<RoutePoint> {
        vec![
            RoutePoint::stop(37.582591, 55.775364),
            RoutePoint::stop(37.579206, 55.774362),
        ]
    }

    #[test]
    fn defaults_applied() {
        let payload = RoutePayload::with_defaults(&moscow());
        assert_eq!(payload.get("locale"), Some(&json!("ru")));
        assert_eq!(payload.get("transport"), Some(&json!("driving")));
        assert_eq!(payload.get("route_mode"), Some(&json!("fastest")));
        assert_eq!(payload.get("traffic_mode"), Some(&json!("jam")));
        assert_eq!(payload.get("output"), Some(&json!("detailed")));
        assert_eq!(payload.point_count(), 2);
    }

    #[test]
    fn points_serialize_with_stop_type() {
        let payload = RoutePayload::with_defaults(&moscow());
        assert_eq!(
            payload.get("points").unwrap()[0],
            json!({"type": "stop", "lon": 37.582591, "lat": 55.775364})
        );
    }

    #[test]
    fn override_wins_on_collision() {
        let payload =
            RoutePayload::build(&moscow(), overrides([("traffic_mode", "statistics")]));
        assert_eq!(payload.get("traffic_mode"), Some(&json!("statistics")));
        assert_eq!(payload.get("locale"), Some(&json!("ru")));
    }

    #[test]
    fn override_adds_new_keys() {
        let payload = RoutePayload::build(&moscow(), overrides([("alternative", json!(1))]));
        assert_eq!(payload.get("alternative"), Some(&json!(1)));
    }

    #[test]
    fn override_can_replace_points() {
        let payload = RoutePayload::build(&moscow(), overrides([("points", json!([]))]));
        assert_eq!(payload.point_count(), 0);
    }

    #[test]
    fn empty_points_constructible() {
        let payload = RoutePayload::with_defaults(&[]);
        assert_eq!(payload.get("points"), Some(&json!([])));
        assert_eq!(payload.point_count(), 0);
    }

    #[test]
    fn payload_serializes_as_plain_object() {
        let payload = RoutePayload::with_defaults(&[]);
        let text = serde_json::to_string(&payload).unwrap();
        assert!(text.starts_with('{'));
        assert!(text.contains("\"transport\":\"driving\""));
    }
}
