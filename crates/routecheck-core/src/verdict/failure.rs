//! Contract failure taxonomy

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Failure category - one per error family the suite distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Unexpected status code, timeout, or connection failure
    Transport,
    /// Response body does not match the schema document
    SchemaViolation,
    /// A domain invariant does not hold
    BusinessRuleViolation,
    /// Body is not JSON (or not the expected shape) where JSON was required
    DecodeFailure,
}

impl FailureKind {
    /// Human-readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Transport => "Transport error",
            Self::SchemaViolation => "Response does not match schema",
            Self::BusinessRuleViolation => "Business rule violated",
            Self::DecodeFailure => "Response could not be decoded",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Everything that can terminate a scenario.
///
/// Every variant carries expected and actual context, so a report is enough
/// to diagnose the failure without re-running.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractError {
    #[error("{context}: expected HTTP {expected}, got {actual}")]
    UnexpectedStatus {
        context: String,
        expected: u16,
        actual: u16,
    },
    #[error("{url}: no response within {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },
    #[error("{url}: request failed: {message}")]
    Connection { url: String, message: String },
    #[error("{schema}: {}", .violations.join("; "))]
    SchemaViolation {
        schema: String,
        violations: Vec<String>,
    },
    #[error("{rule}: {message} (expected {expected}, got {actual})")]
    BusinessRuleViolation {
        rule: String,
        message: String,
        expected: String,
        actual: String,
    },
    #[error("{context}: cannot decode response: {message}")]
    DecodeFailure { context: String, message: String },
}

impl ContractError {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::UnexpectedStatus { .. } | Self::Timeout { .. } | Self::Connection { .. } => {
                FailureKind::Transport
            }
            Self::SchemaViolation { .. } => FailureKind::SchemaViolation,
            Self::BusinessRuleViolation { .. } => FailureKind::BusinessRuleViolation,
            Self::DecodeFailure { .. } => FailureKind::DecodeFailure,
        }
    }

    /// Shorthand for a rule violation.
    pub fn rule(
        rule: impl Into<String>,
        message: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::BusinessRuleViolation {
            rule: rule.into(),
            message: message.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Serializable record of a failure, as stored in reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FailureRecord {
    pub kind: FailureKind,
    /// Step that was running when the scenario stopped
    pub step: String,
    pub message: String,
}

impl FailureRecord {
    #[must_use]
    pub fn new(step: impl Into<String>, error: &ContractError) -> Self {
        Self {
            kind: error.kind(),
            step: step.into(),
            message: error.to_string(),
        }
    }
}
