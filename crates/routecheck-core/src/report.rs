//! Scenario reports: steps, attachments, and on-disk artifacts
//!
//! Every scenario records its steps and the request/response pairs it saw.
//! Reports are written as one directory per scenario:
//!
//! ```text
//! .routecheck/reports/
//! ├── 01-build_driving_route_Moscow_1_/
//! │   ├── 02-01-Request_Body.json
//! │   ├── 02-02-Response_Body.json
//! │   ├── 06-01-Total_distance_info.json
//! │   └── scenario.json
//! └── index.json
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transport::{HttpResponse, ResponseBody};
use crate::verdict::{ContractError, FailureRecord};

/// Attachment content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Json,
    Text,
}

impl AttachmentKind {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "txt",
        }
    }
}

/// A named artifact attached to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub kind: AttachmentKind,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
}

/// One named step of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub status: StepStatus,
    /// Round trip of the request sent in this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Step {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Passed,
            elapsed_ms: None,
            attachments: Vec::new(),
        }
    }

    /// Attach `value` as indented JSON. Non-ASCII text is kept as-is.
    pub fn attach_json<T: Serialize + ?Sized>(&mut self, name: impl Into<String>, value: &T) {
        let name = name.into();
        match serde_json::to_string_pretty(value) {
            Ok(content) => self.attachments.push(Attachment {
                name,
                kind: AttachmentKind::Json,
                content,
            }),
            Err(e) => self.attach_text(name, format!("<unserializable: {e}>")),
        }
    }

    pub fn attach_text(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.attachments.push(Attachment {
            name: name.into(),
            kind: AttachmentKind::Text,
            content: content.into(),
        });
    }

    /// Attach a request/response pair.
    ///
    /// The request data always goes in as "Request Body". The response goes
    /// in as "Response Body" when it decodes as JSON and as "Response Text"
    /// otherwise. Never fails; the decoded body is returned.
    pub fn attach_exchange(&mut self, request_data: &Value, response: &HttpResponse) -> ResponseBody {
        self.attach_json("Request Body", request_data);
        let decoded = response.decode();
        match &decoded {
            ResponseBody::Json(body) => self.attach_json("Response Body", body),
            ResponseBody::Text(text) => self.attach_text("Response Text", text.as_str()),
        }
        decoded
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
}

/// Everything recorded while one scenario ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario id, e.g. `build_driving_route[Moscow_1]`
    pub id: String,
    /// Suite marker: `routing` or `catalog`
    pub suite: String,
    /// API area under test, e.g. "Routing API"
    pub story: String,
    /// Human-readable title
    pub title: String,
    pub outcome: Outcome,
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureRecord>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(skip)]
    started: Option<Instant>,
}

impl ScenarioReport {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        suite: impl Into<String>,
        story: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            suite: suite.into(),
            story: story.into(),
            title: title.into(),
            outcome: Outcome::Passed,
            steps: Vec::new(),
            failure: None,
            duration_ms: 0,
            started: Some(Instant::now()),
        }
    }

    /// Run `f` as a named step.
    ///
    /// A failing step marks the step and the scenario failed and records the
    /// error; the error is returned so the caller stops the scenario.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `f`.
    pub fn step<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Step) -> Result<T, ContractError>,
    ) -> Result<T, ContractError> {
        let mut step = Step::new(name);
        let result = f(&mut step);
        if let Err(e) = &result {
            tracing::debug!(scenario = %self.id, step = name, error = %e, "step failed");
            step.status = StepStatus::Failed;
            self.outcome = Outcome::Failed;
            self.failure = Some(FailureRecord::new(name, e));
        } else {
            tracing::trace!(scenario = %self.id, step = name, "step passed");
        }
        self.steps.push(step);
        result
    }

    /// Attach a request/response pair in its own step labelled `label`.
    pub fn attach(&mut self, label: &str, request_data: &Value, response: &HttpResponse) -> ResponseBody {
        let mut step = Step::new(label);
        let decoded = step.attach_exchange(request_data, response);
        self.steps.push(step);
        decoded
    }

    /// Record the scenario's final result and elapsed time.
    pub fn finish(&mut self, result: Result<(), ContractError>) {
        if let Err(e) = result {
            // Errors raised outside any step still terminate the scenario.
            if self.failure.is_none() {
                self.failure = Some(FailureRecord::new("scenario", &e));
            }
            self.outcome = Outcome::Failed;
        }
        if let Some(started) = self.started.take() {
            self.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.steps.iter().map(|s| s.attachments.len()).sum()
    }

    /// First attachment with `name`, searching steps in order.
    #[must_use]
    pub fn find_attachment(&self, name: &str) -> Option<&Attachment> {
        self.steps
            .iter()
            .flat_map(|s| s.attachments.iter())
            .find(|a| a.name == name)
    }
}

/// Summary of a report directory, written as `index.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportIndex {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub scenarios: Vec<ReportIndexEntry>,
    pub report_dir: PathBuf,
}

/// An entry in the report index for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportIndexEntry {
    pub id: String,
    pub suite: String,
    pub title: String,
    pub outcome: Outcome,
    /// Sub-directory within the report directory
    pub dir: String,
    pub attachments: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureRecord>,
}

/// Write every scenario's attachments plus `index.json` under `report_dir`.
///
/// Scenario directories are `{run position:02}-{sanitized id}`, so ids that
/// sanitize to the same text still get separate directories.
///
/// # Errors
///
/// Returns error if the directory cannot be created or a file cannot be written.
pub fn write_reports(reports: &[ScenarioReport], report_dir: &Path) -> Result<ReportIndex, ReportError> {
    std::fs::create_dir_all(report_dir)
        .map_err(|e| ReportError::Io(format!("create {}: {e}", report_dir.display())))?;

    let mut entries = Vec::with_capacity(reports.len());
    for (position, report) in reports.iter().enumerate() {
        let dir_name = format!("{:02}-{}", position + 1, sanitize_filename(&report.id));
        let dir = report_dir.join(&dir_name);
        std::fs::create_dir_all(&dir)
            .map_err(|e| ReportError::Io(format!("create {}: {e}", dir.display())))?;

        for (step_no, step) in report.steps.iter().enumerate() {
            for (att_no, attachment) in step.attachments.iter().enumerate() {
                let file = format!(
                    "{:02}-{:02}-{}.{}",
                    step_no + 1,
                    att_no + 1,
                    sanitize_filename(&attachment.name),
                    attachment.kind.extension()
                );
                write_file(&dir.join(file), &attachment.content)?;
            }
        }

        let scenario_json = serde_json::to_string_pretty(report)
            .map_err(|e| ReportError::Serialize(e.to_string()))?;
        write_file(&dir.join("scenario.json"), &scenario_json)?;

        entries.push(ReportIndexEntry {
            id: report.id.clone(),
            suite: report.suite.clone(),
            title: report.title.clone(),
            outcome: report.outcome,
            dir: dir_name,
            attachments: report.attachment_count() as u64,
            failure: report.failure.clone(),
        });
    }

    let passed = reports.iter().filter(|r| r.passed()).count() as u64;
    let total = reports.len() as u64;
    let index = ReportIndex {
        total,
        passed,
        failed: total - passed,
        scenarios: entries,
        report_dir: report_dir.to_path_buf(),
    };

    let index_json =
        serde_json::to_string_pretty(&index).map_err(|e| ReportError::Serialize(e.to_string()))?;
    write_file(&report_dir.join("index.json"), &index_json)?;

    tracing::info!(dir = %report_dir.display(), scenarios = total, "report written");
    Ok(index)
}

fn write_file(path: &Path, content: &str) -> Result<(), ReportError> {
    std::fs::write(path, content)
        .map_err(|e| ReportError::Io(format!("write {}: {e}", path.display())))
}

/// Maximum characters kept from a label in a filename.
const MAX_FILENAME_LEN: usize = 120;

/// Convert a label to a safe filename component.
///
/// "build_driving_route[Moscow_1]" → "build_driving_route_Moscow_1_"
#[must_use]
pub fn sanitize_filename(label: &str) -> String {
    label
        .chars()
        .take(MAX_FILENAME_LEN)
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' => c,
            _ => '_',
        })
        .collect()
}

/// JSON Schema of `index.json`.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(ReportIndex);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_report() -> ScenarioReport {
        let mut report = ScenarioReport::new(
            "build_driving_route[Moscow_1]",
            "routing",
            "Routing API",
            "Building route with 2 points: driving",
        );
        report.attach(
            "Attach request/response data",
            &json!({"payload": {"points": []}}),
            &HttpResponse::new(200, r#"{"status":"OK"}"#),
        );
        let _ = report.step("Check on total route calculation", |step| {
            step.attach_json(
                "Total distance info",
                &json!({"total_distance": 300, "total_segment_distance": 300}),
            );
            Ok(())
        });
        report
    }

    #[test]
    fn attach_json_response() {
        let mut step = Step::new("Attach");
        let decoded = step.attach_exchange(
            &json!({"params": {"q": "кафе"}}),
            &HttpResponse::new(200, r#"{"result": {"total": 1}}"#),
        );
        assert!(decoded.is_json());
        assert_eq!(step.attachments.len(), 2);
        assert_eq!(step.attachments[0].name, "Request Body");
        assert_eq!(step.attachments[0].kind, AttachmentKind::Json);
        assert_eq!(
            step.attachments[0].content,
            "{\n  \"params\": {\n    \"q\": \"кафе\"\n  }\n}"
        );
        assert_eq!(step.attachments[1].name, "Response Body");
        assert_eq!(step.attachments[1].kind, AttachmentKind::Json);
    }

    #[test]
    fn attach_falls_back_to_text() {
        let mut step = Step::new("Attach");
        let decoded = step.attach_exchange(
            &json!({"payload": {}}),
            &HttpResponse::new(502, "<html>Bad Gateway</html>"),
        );
        assert_eq!(decoded, ResponseBody::Text("<html>Bad Gateway</html>".into()));
        assert_eq!(step.attachments[1].name, "Response Text");
        assert_eq!(step.attachments[1].kind, AttachmentKind::Text);
        assert_eq!(step.attachments[1].content, "<html>Bad Gateway</html>");
        assert_eq!(step.status, StepStatus::Passed);
    }

    #[test]
    fn failing_step_fails_scenario() {
        let mut report = ScenarioReport::new("x", "routing", "Routing API", "x");
        let result: Result<(), _> = report.step("Check on http status code", |_| {
            Err(ContractError::UnexpectedStatus {
                context: "POST routing".into(),
                expected: 200,
                actual: 500,
            })
        });
        assert!(result.is_err());
        assert!(!report.passed());
        assert_eq!(report.steps[0].status, StepStatus::Failed);
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.step, "Check on http status code");
        assert!(failure.message.contains("got 500"));
    }

    #[test]
    fn finish_records_error_outside_steps() {
        let mut report = ScenarioReport::new("x", "catalog", "Places API", "x");
        report.finish(Err(ContractError::Timeout {
            url: "http://places".into(),
            timeout_secs: 10,
        }));
        assert_eq!(report.outcome, Outcome::Failed);
        assert_eq!(report.failure.as_ref().unwrap().step, "scenario");
    }

    #[test]
    fn finish_keeps_step_failure() {
        let mut report = ScenarioReport::new("x", "catalog", "Places API", "x");
        let err = report
            .step("Check on real status code", |_| {
                Err::<(), _>(ContractError::rule("meta_code", "m", 404, 200))
            })
            .unwrap_err();
        report.finish(Err(err));
        assert_eq!(report.failure.as_ref().unwrap().step, "Check on real status code");
    }

    #[test]
    fn find_attachment_by_name() {
        let report = sample_report();
        assert_eq!(report.attachment_count(), 3);
        assert!(report.find_attachment("Total distance info").is_some());
        assert!(report.find_attachment("Response Text").is_none());
    }

    #[test]
    fn sanitize() {
        assert_eq!(
            sanitize_filename("build_driving_route[Moscow_1]"),
            "build_driving_route_Moscow_1_"
        );
        assert_eq!(sanitize_filename("Total distance info"), "Total_distance_info");
    }

    #[test]
    fn write_reports_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = sample_report();
        report.finish(Ok(()));
        let index = write_reports(&[report], dir.path()).unwrap();

        assert_eq!(index.total, 1);
        assert_eq!(index.passed, 1);
        assert_eq!(index.failed, 0);
        let entry = &index.scenarios[0];
        assert_eq!(entry.dir, "01-build_driving_route_Moscow_1_");
        assert_eq!(entry.attachments, 3);

        let scenario_dir = dir.path().join(&entry.dir);
        assert!(scenario_dir.join("01-01-Request_Body.json").exists());
        assert!(scenario_dir.join("01-02-Response_Body.json").exists());
        assert!(scenario_dir.join("02-01-Total_distance_info.json").exists());
        assert!(scenario_dir.join("scenario.json").exists());

        let index_content = std::fs::read_to_string(dir.path().join("index.json")).unwrap();
        let parsed: ReportIndex = serde_json::from_str(&index_content).unwrap();
        assert_eq!(parsed, index);
    }

    #[test]
    fn write_reports_keeps_ids_with_same_sanitized_name_apart() {
        let dir = tempfile::tempdir().unwrap();
        let reports: Vec<ScenarioReport> = ["build_driving_route[Москва]", "build_driving_route[Казань]"]
            .into_iter()
            .map(|id| {
                let mut report = ScenarioReport::new(id, "routing", "Routing API", "x");
                report.attach(
                    "Attach request/response data",
                    &json!({"name": id}),
                    &HttpResponse::new(200, "{}"),
                );
                report.finish(Ok(()));
                report
            })
            .collect();
        assert_eq!(sanitize_filename(&reports[0].id), sanitize_filename(&reports[1].id));

        let index = write_reports(&reports, dir.path()).unwrap();
        assert_ne!(index.scenarios[0].dir, index.scenarios[1].dir);

        for (entry, report) in index.scenarios.iter().zip(&reports) {
            let scenario_dir = dir.path().join(&entry.dir);
            let request = std::fs::read_to_string(scenario_dir.join("01-01-Request_Body.json")).unwrap();
            assert!(request.contains(&report.id));
            let saved: ScenarioReport =
                serde_json::from_str(&std::fs::read_to_string(scenario_dir.join("scenario.json")).unwrap())
                    .unwrap();
            assert_eq!(saved.id, report.id);
        }
    }

    #[test]
    fn elapsed_ms_omitted_when_unset() {
        let report = sample_report();
        let json = serde_json::to_value(&report.steps[0]).unwrap();
        assert!(json.get("elapsed_ms").is_none());
    }

    #[test]
    fn write_reports_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = write_reports(&[], dir.path()).unwrap();
        assert_eq!(index.total, 0);
        assert!(dir.path().join("index.json").exists());
    }

    #[test]
    fn schema_export() {
        let schema = generate_schema();
        let parsed: Value = serde_json::from_str(&schema).unwrap();
        assert_eq!(
            parsed.get("title").and_then(|v| v.as_str()),
            Some("ReportIndex")
        );
    }
}
