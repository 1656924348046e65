//! HTTP contract the validation pipeline depends on
//!
//! The core never talks to the network. A `Transport` implementation (the
//! runner's reqwest client, or a canned one in tests) turns an `HttpRequest`
//! into an `HttpResponse`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::verdict::ContractError;

/// Query parameters whose values never reach a report.
const SENSITIVE_PARAMS: &[&str] = &["key", "api_key", "apikey", "token"];

/// Mask value for redacted parameters.
const MASK: &str = "***";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request as the pipeline describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl HttpRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// `"POST http://host/path"`, used as error context.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.url)
    }

    /// Query parameters as a JSON object with sensitive values masked.
    #[must_use]
    pub fn masked_query(&self) -> Value {
        let params = self
            .query
            .iter()
            .map(|(k, v)| {
                let value = if is_sensitive_param(k) {
                    MASK.to_string()
                } else {
                    v.clone()
                };
                (k.clone(), Value::String(value))
            })
            .collect();
        Value::Object(params)
    }
}

fn is_sensitive_param(name: &str) -> bool {
    SENSITIVE_PARAMS
        .iter()
        .any(|&p| name.eq_ignore_ascii_case(p))
}

/// Response as received: status code and raw body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub elapsed_ms: u64,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            elapsed_ms: 0,
        }
    }

    /// Decode the body without failing: JSON when it parses, raw text otherwise.
    #[must_use]
    pub fn decode(&self) -> ResponseBody {
        match serde_json::from_str::<Value>(&self.body) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(self.body.clone()),
        }
    }

    /// Decode the body as JSON where JSON is required.
    ///
    /// # Errors
    ///
    /// Returns `DecodeFailure` when the body is not JSON.
    pub fn json(&self, context: &str) -> Result<Value, ContractError> {
        serde_json::from_str(&self.body).map_err(|e| ContractError::DecodeFailure {
            context: context.to_string(),
            message: format!("{e}; body starts with {:?}", preview(&self.body)),
        })
    }
}

/// Result of decoding a response body: the two outcomes are both expected.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }
}

/// At most 200 bytes, cut on a char boundary.
fn preview(text: &str) -> &str {
    const MAX_PREVIEW: usize = 200;
    if text.len() <= MAX_PREVIEW {
        return text;
    }
    let mut end = MAX_PREVIEW;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Something that can execute an `HttpRequest`.
///
/// Implementations block until a response arrives or the configured timeout
/// expires; a timeout is reported as `ContractError::Timeout`.
pub trait Transport {
    /// # Errors
    ///
    /// Returns a transport-family `ContractError` when no response was received.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ContractError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ContractError> {
        (**self).send(request)
    }
}
