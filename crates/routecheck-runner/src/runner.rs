//! Sequential suite runner

use std::time::Instant;

use routecheck_core::{FailureRecord, ScenarioReport, Verdict};

use crate::scenarios::{Scenario, ScenarioContext, Suite};

/// Which scenarios to run. Empty selection runs everything.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub suite: Option<Suite>,
    /// Substring of the scenario id
    pub filter: Option<String>,
}

impl Selection {
    #[must_use]
    pub fn matches(&self, scenario: &Scenario) -> bool {
        self.suite.is_none_or(|s| s == scenario.suite)
            && self
                .filter
                .as_deref()
                .is_none_or(|f| scenario.id.contains(f))
    }
}

/// Runs selected scenarios one after another.
pub struct SuiteRunner<'a> {
    ctx: ScenarioContext<'a>,
    selection: Selection,
}

impl<'a> SuiteRunner<'a> {
    #[must_use]
    pub fn new(ctx: ScenarioContext<'a>) -> Self {
        Self {
            ctx,
            selection: Selection::default(),
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Scenarios from `scenarios` that the selection keeps.
    #[must_use]
    pub fn select<'s>(&self, scenarios: &'s [Scenario]) -> Vec<&'s Scenario> {
        scenarios.iter().filter(|s| self.selection.matches(s)).collect()
    }

    /// Run the selected scenarios in order. A failing scenario never stops the
    /// ones after it.
    pub fn run(&self, scenarios: &[Scenario]) -> SuiteSummary {
        self.run_with(scenarios, |_| {})
    }

    /// Same as [`SuiteRunner::run`], calling `on_report` after each scenario.
    pub fn run_with(
        &self,
        scenarios: &[Scenario],
        mut on_report: impl FnMut(&ScenarioReport),
    ) -> SuiteSummary {
        let selected = self.select(scenarios);
        tracing::info!(
            selected = selected.len(),
            available = scenarios.len(),
            "running scenarios"
        );

        let start = Instant::now();
        let mut reports = Vec::with_capacity(selected.len());
        for scenario in selected {
            let report = scenario.run(&self.ctx);
            on_report(&report);
            reports.push(report);
        }

        SuiteSummary::new(
            reports,
            u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        )
    }
}

/// Outcome of one suite run.
#[derive(Debug, Clone)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub reports: Vec<ScenarioReport>,
}

impl SuiteSummary {
    #[must_use]
    pub fn new(reports: Vec<ScenarioReport>, duration_ms: u64) -> Self {
        let passed = reports.iter().filter(|r| r.passed()).count();
        Self {
            total: reports.len(),
            passed,
            failed: reports.len() - passed,
            duration_ms,
            reports,
        }
    }

    /// Failure of every scenario that failed, in run order.
    #[must_use]
    pub fn failures(&self) -> Vec<FailureRecord> {
        self.reports.iter().filter_map(|r| r.failure.clone()).collect()
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        Verdict::from_results(self.total, self.passed, &self.failures())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("HTTP client error: {0}")]
    Http(String),
}
