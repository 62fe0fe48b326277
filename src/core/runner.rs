use crate::config::test_config::AccountsConfig;
use crate::core::client::HttpExchange;
use crate::core::context::{StepRecord, TestContext};
use crate::core::suite::TestCase;
use crate::domain::ports::PlayerApi;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    /// An assertion or status expectation did not hold.
    Failed,
    /// The case could not run to completion.
    Broken,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Passed => "passed",
            CaseStatus::Failed => "failed",
            CaseStatus::Broken => "broken",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub class: String,
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub params: Vec<String>,
    pub status: CaseStatus,
    pub message: Option<String>,
    pub steps: Vec<StepRecord>,
    pub exchanges: Vec<HttpExchange>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(skip)]
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite_name: String,
    pub cases: Vec<CaseReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.cases.len()
    }

    pub fn count(&self, status: CaseStatus) -> usize {
        self.cases.iter().filter(|c| c.status == status).count()
    }

    pub fn passed(&self) -> usize {
        self.count(CaseStatus::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(CaseStatus::Failed)
    }

    pub fn broken(&self) -> usize {
        self.count(CaseStatus::Broken)
    }

    pub fn is_success(&self) -> bool {
        self.passed() == self.total()
    }

    pub fn unsuccessful(&self) -> Vec<&CaseReport> {
        self.cases
            .iter()
            .filter(|c| c.status != CaseStatus::Passed)
            .collect()
    }

    pub fn case(&self, full_name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|c| c.full_name == full_name)
    }

    pub fn get_execution_summary(&self) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let total_duration: Duration = self.cases.iter().map(|c| c.duration).sum();

        summary.insert("suite".to_string(), self.suite_name.clone().into());
        summary.insert("total".to_string(), self.total().into());
        summary.insert("passed".to_string(), self.passed().into());
        summary.insert("failed".to_string(), self.failed().into());
        summary.insert("broken".to_string(), self.broken().into());
        summary.insert(
            "total_duration_ms".to_string(),
            (total_duration.as_millis() as u64).into(),
        );

        let unsuccessful: Vec<serde_json::Value> = self
            .unsuccessful()
            .iter()
            .map(|c| serde_json::Value::String(c.full_name.clone()))
            .collect();
        summary.insert(
            "unsuccessful_cases".to_string(),
            serde_json::Value::Array(unsuccessful),
        );

        summary
    }
}

/// Executes selected cases against one API handle. Every case gets its own
/// forked handle and context, so cases may run in parallel.
pub struct SuiteRunner {
    api: Arc<dyn PlayerApi>,
    accounts: AccountsConfig,
    concurrency: usize,
}

impl SuiteRunner {
    pub fn new(api: Arc<dyn PlayerApi>, accounts: AccountsConfig) -> Self {
        Self {
            api,
            accounts,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn run(&self, suite_name: &str, cases: Vec<TestCase>) -> SuiteReport {
        let started_at = Utc::now();
        tracing::info!(
            "🚀 Running suite '{}' ({} cases, concurrency {})",
            suite_name,
            cases.len(),
            self.concurrency
        );

        let reports = if self.concurrency == 1 {
            let mut reports = Vec::with_capacity(cases.len());
            for case in cases {
                reports.push(run_case(case, self.api.fork(), self.accounts.clone()).await);
            }
            reports
        } else {
            self.run_parallel(cases).await
        };

        let report = SuiteReport {
            suite_name: suite_name.to_string(),
            cases: reports,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "🏁 Suite '{}' finished: {} passed, {} failed, {} broken",
            suite_name,
            report.passed(),
            report.failed(),
            report.broken()
        );
        report
    }

    async fn run_parallel(&self, cases: Vec<TestCase>) -> Vec<CaseReport> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut set = JoinSet::new();

        for (index, case) in cases.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let api = self.api.fork();
            let accounts = self.accounts.clone();
            set.spawn(async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire_owned().await.ok();
                (index, run_case(case, api, accounts).await)
            });
        }

        let mut indexed = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(entry) => indexed.push(entry),
                Err(e) => tracing::error!("❌ Case task aborted: {}", e),
            }
        }
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, report)| report).collect()
    }
}

/// Runs one case to completion: body, then cleanup, whatever the outcome.
async fn run_case(case: TestCase, api: Arc<dyn PlayerApi>, accounts: AccountsConfig) -> CaseReport {
    let full_name = case.full_name();
    let ctx = Arc::new(TestContext::new(full_name.clone(), Arc::clone(&api), accounts));
    let started_at = Utc::now();
    let start = Instant::now();

    tracing::info!("▶️ {}", full_name);

    // Spawned so a panicking body is reported instead of tearing down the run.
    let task_ctx = Arc::clone(&ctx);
    let task_case = case.clone();
    let outcome = tokio::spawn(async move { task_case.run(&task_ctx).await }).await;

    let (status, message) = match outcome {
        Ok(Ok(())) => (CaseStatus::Passed, None),
        Ok(Err(e)) if e.is_assertion() => (CaseStatus::Failed, Some(e.to_string())),
        Ok(Err(e)) => (
            CaseStatus::Broken,
            Some(format!("{} ({})", e.user_friendly_message(), e.recovery_suggestion())),
        ),
        Err(e) => (CaseStatus::Broken, Some(panic_message(e))),
    };

    ctx.cleanup().await;
    let duration = start.elapsed();

    match status {
        CaseStatus::Passed => tracing::info!("✅ {} passed ({:?})", full_name, duration),
        CaseStatus::Failed => tracing::warn!(
            "❌ {} failed: {}",
            full_name,
            message.as_deref().unwrap_or_default()
        ),
        CaseStatus::Broken => tracing::error!(
            "💥 {} broken: {}",
            full_name,
            message.as_deref().unwrap_or_default()
        ),
    }

    CaseReport {
        class: case.class.to_string(),
        name: case.name(),
        full_name,
        description: case.description.clone(),
        params: case.params.clone(),
        status,
        message,
        steps: ctx.take_steps(),
        exchanges: api.drain_exchanges(),
        started_at,
        finished_at: Utc::now(),
        duration,
    }
}

fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return format!("case task cancelled: {}", error);
    }
    let payload = error.into_panic();
    let text = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("case panicked: {}", text)
}
