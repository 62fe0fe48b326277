//! Smoke check against a running Player API (`--features live-tests`).

use player_api_tests::config::DEFAULT_CONFIG_PATH;
use player_api_tests::{LocalStorage, RestClient, SuiteDefinition, TestConfig, TestEngine};
use std::path::Path;
use std::sync::Arc;

#[tokio::test]
async fn sanity_suite_against_live_service() {
    let mut config = if Path::new(DEFAULT_CONFIG_PATH).is_file() {
        TestConfig::from_file(DEFAULT_CONFIG_PATH).unwrap()
    } else {
        TestConfig::default()
    };
    config.apply_env_overrides();

    let client = RestClient::new(config.base_url(), config.request_timeout()).unwrap();
    let suite = SuiteDefinition::resolve(Some("sanity"), None, config.suites_dir()).unwrap();

    let engine: TestEngine<LocalStorage> = TestEngine::new(config, Arc::new(client));
    let report = engine.run(&suite).await.unwrap();

    assert_eq!(report.total(), 1);
    assert!(
        report.is_success(),
        "default system users missing: {:?}",
        report.cases[0].message
    );
}
