use crate::core::runner::{CaseReport, CaseStatus, SuiteReport};
use crate::domain::ports::Storage;
use crate::utils::error::{ApiTestError, Result};
use serde::Serialize;
use std::io::Write;
use uuid::Uuid;
use zip::write::{FileOptions, ZipWriter};

pub const SUMMARY_FILE: &str = "summary.csv";
pub const ARCHIVE_FILE: &str = "allure-results.zip";

/// Allure 2 result file layout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AllureResult {
    uuid: String,
    history_id: String,
    name: String,
    full_name: String,
    description: String,
    status: CaseStatus,
    status_details: Option<StatusDetails>,
    stage: &'static str,
    start: i64,
    stop: i64,
    steps: Vec<AllureStep>,
    attachments: Vec<AllureAttachment>,
    parameters: Vec<AllureParameter>,
    labels: Vec<AllureLabel>,
}

#[derive(Debug, Serialize)]
struct StatusDetails {
    message: String,
}

#[derive(Debug, Serialize)]
struct AllureStep {
    name: String,
    status: CaseStatus,
    stage: &'static str,
    start: i64,
    stop: i64,
}

#[derive(Debug, Serialize)]
struct AllureAttachment {
    name: String,
    source: String,
    #[serde(rename = "type")]
    mime_type: &'static str,
}

#[derive(Debug, Serialize)]
struct AllureParameter {
    name: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct AllureLabel {
    name: &'static str,
    value: String,
}

/// Writes a suite report as Allure results plus a CSV summary.
pub struct ReportWriter<S: Storage> {
    storage: S,
    archive: bool,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            archive: false,
        }
    }

    pub fn with_archive(mut self, archive: bool) -> Self {
        self.archive = archive;
        self
    }

    /// Returns the names of the files written, relative to the storage root.
    pub async fn write(&self, report: &SuiteReport) -> Result<Vec<String>> {
        let mut written: Vec<(String, Vec<u8>)> = Vec::new();

        for case in &report.cases {
            let uuid = Uuid::new_v4().to_string();
            let mut attachments = Vec::new();

            if !case.exchanges.is_empty() {
                let source = format!("{}-attachment.json", uuid);
                let data = serde_json::to_vec_pretty(&case.exchanges)?;
                attachments.push(AllureAttachment {
                    name: "HTTP exchanges".to_string(),
                    source: source.clone(),
                    mime_type: "application/json",
                });
                written.push((source, data));
            }

            let result = allure_result(&report.suite_name, case, uuid.clone(), attachments);
            written.push((
                format!("{}-result.json", uuid),
                serde_json::to_vec_pretty(&result)?,
            ));
        }

        written.push((SUMMARY_FILE.to_string(), summary_csv(report)?));

        for (name, data) in &written {
            self.storage.write_file(name, data).await?;
        }
        tracing::debug!("Wrote {} report files", written.len());

        let mut names: Vec<String> = written.iter().map(|(name, _)| name.clone()).collect();

        if self.archive {
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &written {
                    zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                    zip.write_all(data)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(ARCHIVE_FILE, &zip_data).await?;
            names.push(ARCHIVE_FILE.to_string());
        }

        Ok(names)
    }
}

fn allure_result(
    suite_name: &str,
    case: &CaseReport,
    uuid: String,
    attachments: Vec<AllureAttachment>,
) -> AllureResult {
    let start = case.started_at.timestamp_millis();
    let stop = case.finished_at.timestamp_millis();

    // A step ends where the next one starts; a non-passing case is blamed on
    // its last step.
    let step_count = case.steps.len();
    let steps = case
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let is_last = i + 1 == step_count;
            AllureStep {
                name: step.name.clone(),
                status: if is_last { case.status } else { CaseStatus::Passed },
                stage: "finished",
                start: step.started_at.timestamp_millis(),
                stop: case
                    .steps
                    .get(i + 1)
                    .map(|next| next.started_at.timestamp_millis())
                    .unwrap_or(stop),
            }
        })
        .collect();

    let parameters = case
        .params
        .iter()
        .enumerate()
        .map(|(i, value)| AllureParameter {
            name: format!("arg{}", i),
            value: value.clone(),
        })
        .collect();

    AllureResult {
        uuid,
        history_id: case.full_name.clone(),
        name: case.name.clone(),
        full_name: case.full_name.clone(),
        description: case.description.clone(),
        status: case.status,
        status_details: case
            .message
            .clone()
            .map(|message| StatusDetails { message }),
        stage: "finished",
        start,
        stop,
        steps,
        attachments,
        parameters,
        labels: vec![
            AllureLabel {
                name: "suite",
                value: suite_name.to_string(),
            },
            AllureLabel {
                name: "testClass",
                value: case.class.clone(),
            },
            AllureLabel {
                name: "framework",
                value: env!("CARGO_PKG_NAME").to_string(),
            },
        ],
    }
}

fn summary_csv(report: &SuiteReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["class", "case", "status", "duration_ms", "message"])?;
    for case in &report.cases {
        let duration_ms = case.duration.as_millis().to_string();
        writer.write_record([
            case.class.as_str(),
            case.name.as_str(),
            case.status.as_str(),
            duration_ms.as_str(),
            case.message.as_deref().unwrap_or(""),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| ApiTestError::IoError(e.into_error()))
}
