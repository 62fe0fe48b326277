use crate::app::scenarios;
use crate::config::suite_config::SuiteDefinition;
use crate::config::test_config::TestConfig;
use crate::core::report::ReportWriter;
use crate::core::runner::{SuiteReport, SuiteRunner};
use crate::core::suite::TestCase;
use crate::domain::ports::{PlayerApi, Storage};
use crate::utils::error::Result;
use std::sync::Arc;

/// Discovery, selection, execution and reporting of one suite run.
pub struct TestEngine<S: Storage> {
    config: TestConfig,
    api: Arc<dyn PlayerApi>,
    reporter: Option<ReportWriter<S>>,
    concurrency: Option<usize>,
}

impl<S: Storage> TestEngine<S> {
    pub fn new(config: TestConfig, api: Arc<dyn PlayerApi>) -> Self {
        Self {
            config,
            api,
            reporter: None,
            concurrency: None,
        }
    }

    pub fn with_reporter(mut self, reporter: ReportWriter<S>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Overrides both the suite and the config file.
    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn discover() -> Vec<TestCase> {
        scenarios::all_cases()
    }

    pub fn select(suite: &SuiteDefinition) -> Vec<TestCase> {
        suite.select(Self::discover())
    }

    fn effective_concurrency(&self, suite: &SuiteDefinition) -> usize {
        self.concurrency
            .or_else(|| suite.concurrency())
            .unwrap_or_else(|| self.config.concurrency())
    }

    pub async fn run(&self, suite: &SuiteDefinition) -> Result<SuiteReport> {
        tracing::info!(
            "Running tests! Base url is {}",
            self.config.base_url()
        );

        let cases = Self::select(suite);
        if cases.is_empty() {
            tracing::warn!("⚠️ Suite '{}' selects no cases", suite.name());
        }
        tracing::debug!("Selected {} cases for suite '{}'", cases.len(), suite.name());

        let runner = SuiteRunner::new(Arc::clone(&self.api), self.config.accounts.clone())
            .with_concurrency(self.effective_concurrency(suite));
        let report = runner.run(suite.name(), cases).await;

        if let Some(reporter) = &self.reporter {
            let files = reporter.write(&report).await?;
            tracing::info!("📁 Report written ({} files)", files.len());
        }

        Ok(report)
    }
}
