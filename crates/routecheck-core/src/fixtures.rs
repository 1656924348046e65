//! Built-in test data: named point pairs and search locations

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::payload::RoutePoint;

/// Two stops on Bolshaya Sadovaya, Moscow.
pub const MOSCOW_1: [RoutePoint; 2] = [
    RoutePoint::stop(37.582591, 55.775364),
    RoutePoint::stop(37.579206, 55.774362),
];

/// Red Square to Lubyanka, Moscow.
pub const MOSCOW_2: [RoutePoint; 2] = [
    RoutePoint::stop(37.617494, 55.751999),
    RoutePoint::stop(37.615655, 55.768005),
];

/// Lomonosov Square, Saint Petersburg.
pub const LOMONOSOV_SQUARE: Location = Location::new(30.334575, 59.928964);

/// Open water in the southern Pacific. No catalog coverage.
pub const PACIFIC_OCEAN: Location = Location::new(-121.485531, -52.667643);

/// Default named point sets, keyed by the name scenarios are parametrized with.
#[must_use]
pub fn default_points() -> BTreeMap<String, Vec<RoutePoint>> {
    BTreeMap::from([
        ("Moscow_1".to_string(), MOSCOW_1.to_vec()),
        ("Moscow_2".to_string(), MOSCOW_2.to_vec()),
    ])
}

/// A longitude/latitude pair as the places API expects it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lon: f64,
    pub lat: f64,
}

impl Location {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// `"lon,lat"` for the `location` query parameter.
    #[must_use]
    pub fn as_query(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}
