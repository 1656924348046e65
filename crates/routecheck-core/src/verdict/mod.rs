//! Verdict module - failure taxonomy and suite-level pass/fail

mod failure;
mod outcome;

pub use failure::{ContractError, FailureKind, FailureRecord};
pub use outcome::{Verdict, VerdictStatus};
