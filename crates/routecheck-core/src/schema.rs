//! Response schema documents and structural validation
//!
//! A document is parsed and compiled once at startup, then shared by
//! reference for the lifetime of the process.

use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::verdict::ContractError;

/// Routing response schema shipped with the crate.
pub const ROUTING_SCHEMA: &str = include_str!("../schemas/routing-response.schema.json");

/// Violations kept per failure. The first few are enough to locate the problem.
const MAX_VIOLATIONS: usize = 5;

/// A compiled JSON Schema.
pub struct SchemaDocument {
    name: String,
    document: Value,
    validator: jsonschema::Validator,
}

impl SchemaDocument {
    /// Compile a schema from an already-parsed document.
    ///
    /// # Errors
    ///
    /// Returns error if the document is not a valid JSON Schema.
    pub fn from_value(name: impl Into<String>, document: Value) -> Result<Self, SchemaLoadError> {
        let name = name.into();
        let validator = jsonschema::validator_for(&document).map_err(|e| {
            SchemaLoadError::Compile {
                name: name.clone(),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            name,
            document,
            validator,
        })
    }

    /// The embedded routing response schema.
    ///
    /// # Errors
    ///
    /// Returns error only if the embedded document is broken.
    pub fn routing() -> Result<Self, SchemaLoadError> {
        let document: Value = serde_json::from_str(ROUTING_SCHEMA)
            .map_err(|e| SchemaLoadError::Parse(format!("embedded routing schema: {e}")))?;
        Self::from_value("routing", document)
    }

    /// Load a schema file (JSON or YAML).
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or compiled.
    pub fn load(path: &Path) -> Result<Self, SchemaLoadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SchemaLoadError::Io(format!("{}: {e}", path.display())))?;
        let document = parse_document(path, &content)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("schema")
            .to_string();
        tracing::debug!(schema = %name, path = %path.display(), "loaded schema document");
        Self::from_value(name, document)
    }

    /// The configured file when given, otherwise the embedded routing schema.
    ///
    /// # Errors
    ///
    /// Same as [`SchemaDocument::load`].
    pub fn routing_or_file(path: Option<&Path>) -> Result<Self, SchemaLoadError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::routing(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Validate `body` against this schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` with up to five `"{instance path}: {message}"`
    /// entries. The root of the body is reported as `/`.
    pub fn validate(&self, body: &Value) -> Result<(), ContractError> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(body)
            .take(MAX_VIOLATIONS)
            .map(|e| {
                let path = e.instance_path().to_string();
                let path = if path.is_empty() { "/" } else { path.as_str() };
                format!("{path}: {e}")
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ContractError::SchemaViolation {
                schema: self.name.clone(),
                violations,
            })
        }
    }
}

impl fmt::Debug for SchemaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDocument")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Validate `body` against `schema`.
///
/// # Errors
///
/// Returns `SchemaViolation` when the body does not conform.
pub fn validate(body: &Value, schema: &SchemaDocument) -> Result<(), ContractError> {
    schema.validate(body)
}

/// Parse a schema document from JSON or YAML.
///
/// Detection strategy: try extension first (`.yaml`/`.yml`), then fall back to
/// content sniffing (leading `{` → JSON, otherwise YAML).
fn parse_document(path: &Path, content: &str) -> Result<Value, SchemaLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "yaml" | "yml" => serde_yml::from_str(content)
            .map_err(|e| SchemaLoadError::Parse(format!("Invalid YAML: {e}"))),
        "json" => serde_json::from_str(content)
            .map_err(|e| SchemaLoadError::Parse(format!("Invalid JSON: {e}"))),
        _ => {
            if content.trim_start().starts_with('{') {
                serde_json::from_str(content)
                    .map_err(|e| SchemaLoadError::Parse(format!("Invalid JSON: {e}")))
            } else {
                serde_yml::from_str(content)
                    .map_err(|e| SchemaLoadError::Parse(format!("Invalid YAML: {e}")))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaLoadError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid schema '{name}': {message}")]
    Compile { name: String, message: String },
}
