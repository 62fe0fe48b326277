//! Full regression against a running Player API.
//!
//! Built only with `--features live-tests`. The target comes from
//! `test-config.toml`, with `BASE_URL` taking precedence.

use player_api_tests::config::DEFAULT_CONFIG_PATH;
use player_api_tests::{LocalStorage, RestClient, SuiteDefinition, TestConfig, TestEngine};
use std::path::Path;
use std::sync::Arc;

fn live_config() -> TestConfig {
    let mut config = if Path::new(DEFAULT_CONFIG_PATH).is_file() {
        TestConfig::from_file(DEFAULT_CONFIG_PATH).unwrap()
    } else {
        TestConfig::default()
    };
    config.apply_env_overrides();
    config.validate_config().unwrap();
    config
}

#[tokio::test]
async fn full_suite_against_live_service() {
    let config = live_config();
    let client = RestClient::new(config.base_url(), config.request_timeout()).unwrap();
    let suite = SuiteDefinition::resolve(Some("full"), None, config.suites_dir()).unwrap();

    let engine: TestEngine<LocalStorage> = TestEngine::new(config, Arc::new(client));
    let report = engine.run(&suite).await.unwrap();

    let failures: Vec<String> = report
        .unsuccessful()
        .iter()
        .map(|case| {
            format!(
                "{} [{}]: {}",
                case.full_name,
                case.status.as_str(),
                case.message.as_deref().unwrap_or("")
            )
        })
        .collect();
    assert!(
        report.is_success(),
        "{} of {} cases did not pass:\n{}",
        failures.len(),
        report.total(),
        failures.join("\n")
    );
}
