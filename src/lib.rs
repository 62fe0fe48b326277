pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::suite_config::SuiteDefinition;
pub use config::test_config::TestConfig;
pub use core::{
    client::RestClient,
    context::TestContext,
    engine::TestEngine,
    report::ReportWriter,
    runner::{CaseStatus, SuiteReport, SuiteRunner},
    suite::TestCase,
};
pub use domain::ports::PlayerApi;
pub use utils::error::{ApiTestError, Result};
