//! Suite verdict - turns scenario results into a status and exit code

use super::{FailureKind, FailureRecord};

/// Final verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub exit_code: i32,
    pub reason: String,
}

impl Verdict {
    /// Determine verdict from scenario counts and the failures they produced.
    ///
    /// PASS requires every selected scenario to pass. Exit codes:
    /// 0 pass, 1 any scenario failed, 3 nothing ran.
    #[must_use]
    pub fn from_results(total: usize, passed: usize, failures: &[FailureRecord]) -> Self {
        if total == 0 {
            return Self {
                status: VerdictStatus::Fail,
                exit_code: 3,
                reason: "No scenarios were run".to_string(),
            };
        }

        if passed == total && failures.is_empty() {
            return Self {
                status: VerdictStatus::Pass,
                exit_code: 0,
                reason: format!("All {total} scenarios passed"),
            };
        }

        let count = |kind: FailureKind| failures.iter().filter(|f| f.kind == kind).count();
        let reason = format!(
            "{} of {total} scenarios failed ({} transport, {} schema, {} business rule, {} decode)",
            total - passed,
            count(FailureKind::Transport),
            count(FailureKind::SchemaViolation),
            count(FailureKind::BusinessRuleViolation),
            count(FailureKind::DecodeFailure),
        );

        Self {
            status: VerdictStatus::Fail,
            exit_code: 1,
            reason,
        }
    }
}

/// Pass or fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: FailureKind) -> FailureRecord {
        FailureRecord {
            kind,
            step: "Check on http status code".to_string(),
            message: "boom".to_string(),
        }
    }

    #[test]
    fn all_passed() {
        let v = Verdict::from_results(6, 6, &[]);
        assert_eq!(v.status, VerdictStatus::Pass);
        assert_eq!(v.exit_code, 0);
        assert_eq!(v.reason, "All 6 scenarios passed");
    }

    #[test]
    fn nothing_ran_is_tool_error() {
        let v = Verdict::from_results(0, 0, &[]);
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.exit_code, 3);
    }

    #[test]
    fn failures_counted_by_kind() {
        let failures = vec![
            record(FailureKind::Transport),
            record(FailureKind::BusinessRuleViolation),
        ];
        let v = Verdict::from_results(7, 5, &failures);
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.exit_code, 1);
        assert_eq!(
            v.reason,
            "2 of 7 scenarios failed (1 transport, 0 schema, 1 business rule, 0 decode)"
        );
    }

    #[test]
    fn display() {
        assert_eq!(VerdictStatus::Pass.to_string(), "PASS");
        assert_eq!(VerdictStatus::Fail.to_string(), "FAIL");
    }
}
