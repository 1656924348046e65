//! Suite configuration: endpoints, credentials, timeout, test data

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fixtures;
use crate::payload::RoutePoint;

/// Environment variable that overrides `api_key` from the file.
pub const API_KEY_ENV: &str = "ROUTECHECK_API_KEY";

/// Suite configuration. Built once at startup, then only borrowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Routing endpoint (POST)
    #[serde(default = "default_routing_url")]
    pub routing_url: String,

    /// Places search endpoint (GET)
    #[serde(default = "default_places_url")]
    pub places_url: String,

    /// API key, sent as the `key` query parameter
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Routing response schema (JSON or YAML). Embedded schema when unset.
    #[serde(default)]
    pub schema: Option<PathBuf>,

    /// Directory for report artifacts (default: ".routecheck/reports")
    #[serde(default)]
    pub report_dir: Option<PathBuf>,

    /// Named point sets for route scenarios
    #[serde(default = "fixtures::default_points")]
    pub points: BTreeMap<String, Vec<RoutePoint>>,
}

fn default_routing_url() -> String {
    "http://routing.api.2gis.com/routing/7.0.0/global".to_string()
}

fn default_places_url() -> String {
    "https://catalog.api.2gis.com/3.0/items".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routing_url: default_routing_url(),
            places_url: default_places_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            schema: None,
            report_dir: None,
            points: fixtures::default_points(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.routecheck.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".routecheck.toml", ".routecheck.json", "routecheck.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Apply `ROUTECHECK_API_KEY` when set and non-empty.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        let key = std::env::var(API_KEY_ENV).ok();
        self.with_api_key_override(key)
    }

    fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key;
        }
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Points registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns error if no point set has that name
    pub fn points_for(&self, name: &str) -> Result<&[RoutePoint], ConfigError> {
        self.points
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ConfigError::UnknownPoints(name.to_string()))
    }

    /// Report directory, falling back to `.routecheck/reports`.
    #[must_use]
    pub fn report_dir(&self) -> PathBuf {
        self.report_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".routecheck/reports"))
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# routecheck configuration

# Endpoints under test
routing_url = "http://routing.api.2gis.com/routing/7.0.0/global"
places_url = "https://catalog.api.2gis.com/3.0/items"

# API key (sent as ?key=...). ROUTECHECK_API_KEY takes precedence.
api_key = "your-api-key"

# Per-request timeout in seconds
timeout_secs = 10

# Routing response schema, JSON or YAML (embedded schema when unset)
# schema = "schemas/routing-response.schema.json"

# Report artifacts
# report_dir = ".routecheck/reports"

# Named point sets for route scenarios
[[points.Moscow_1]]
lon = 37.582591
lat = 55.775364

[[points.Moscow_1]]
lon = 37.579206
lat = 55.774362

[[points.Moscow_2]]
lon = 37.617494
lat = 55.751999

[[points.Moscow_2]]
lon = 37.615655
lat = 55.768005
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("No point set named '{0}'")]
    UnknownPoints(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(
            config.routing_url,
            "http://routing.api.2gis.com/routing/7.0.0/global"
        );
        assert_eq!(config.places_url, "https://catalog.api.2gis.com/3.0/items");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.points.contains_key("Moscow_1"));
        assert!(config.points.contains_key("Moscow_2"));
    }

    #[test]
    fn parse_toml() {
        let toml = r#"
routing_url = "http://localhost:3000/routing"
places_url = "http://localhost:3000/items"
api_key = "secret"
timeout_secs = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.routing_url, "http://localhost:3000/routing");
        assert_eq!(config.places_url, "http://localhost:3000/items");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.timeout_secs, 3);
        // points fall back to built-ins
        assert_eq!(config.points.len(), 2);
    }

    #[test]
    fn parse_toml_with_points() {
        let toml = r#"
api_key = "k"

[[points.Kazan]]
lon = 49.106414
lat = 55.796127

[[points.Kazan]]
type = "stop"
lon = 49.122135
lat = 55.787895
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let kazan = config.points_for("Kazan").unwrap();
        assert_eq!(kazan.len(), 2);
        assert_eq!(kazan[0], RoutePoint::stop(49.106414, 55.796127));
        assert!(config.points_for("Moscow_1").is_err());
    }

    #[test]
    fn example_parses() {
        let config: Config = toml::from_str(Config::example()).unwrap();
        assert_eq!(config.api_key, "your-api-key");
        assert_eq!(config.points_for("Moscow_1").unwrap(), &fixtures::MOSCOW_1);
        assert_eq!(config.points_for("Moscow_2").unwrap(), &fixtures::MOSCOW_2);
    }

    #[test]
    fn load_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routecheck.json");
        std::fs::write(&path, r#"{"api_key": "json-key", "timeout_secs": 5}"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_key, "json-key");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/routecheck.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn api_key_override() {
        let config = Config::default().with_api_key_override(Some("from-env".into()));
        assert_eq!(config.api_key, "from-env");

        let config = Config {
            api_key: "file".into(),
            ..Config::default()
        }
        .with_api_key_override(Some("  ".into()));
        assert_eq!(config.api_key, "file");
    }

    #[test]
    fn unknown_points_error_names_set() {
        let err = Config::default().points_for("Atlantis").unwrap_err();
        assert_eq!(err.to_string(), "No point set named 'Atlantis'");
    }
}
