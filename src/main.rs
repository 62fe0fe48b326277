use clap::Parser;
use player_api_tests::config::{Command, RunArgs, SelectArgs};
use player_api_tests::utils::error::ErrorSeverity;
use player_api_tests::utils::{logger, validation::Validate};
use player_api_tests::{
    ApiTestError, CliConfig, LocalStorage, ReportWriter, RestClient, SuiteDefinition, TestConfig,
    TestEngine,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting player-api-tests CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let config = match cli.load_test_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let outcome = match cli.command() {
        Command::List(selection) => list(&config, &selection),
        Command::Run(args) => run(config, &args).await,
    };

    match outcome {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => exit_with(&e),
    }
}

fn resolve_suite(config: &TestConfig, selection: &SelectArgs) -> Result<SuiteDefinition, ApiTestError> {
    let suite = SuiteDefinition::resolve(
        selection.suite.as_deref(),
        selection.suite_file.as_deref(),
        config.suites_dir(),
    )?;
    suite.validate()?;
    Ok(suite)
}

fn list(config: &TestConfig, selection: &SelectArgs) -> Result<i32, ApiTestError> {
    let suite = resolve_suite(config, selection)?;
    let cases = TestEngine::<LocalStorage>::select(&suite);

    println!("Suite '{}' ({} cases)", suite.name(), cases.len());
    for case in &cases {
        println!("  {}  {}", case.full_name(), case.description);
    }
    Ok(0)
}

async fn run(config: TestConfig, args: &RunArgs) -> Result<i32, ApiTestError> {
    let suite = resolve_suite(&config, &args.selection)?;
    let client = RestClient::new(config.base_url(), config.request_timeout())?;

    let write_report = config.report_enabled() && !args.no_report;
    let report_dir = args
        .report_dir
        .clone()
        .unwrap_or_else(|| config.report_dir().to_string());
    let archive = args.archive || config.archive_report();

    let mut engine: TestEngine<LocalStorage> =
        TestEngine::new(config, Arc::new(client)).with_concurrency(args.concurrency);
    if write_report {
        let storage = LocalStorage::new(report_dir.clone());
        engine = engine.with_reporter(ReportWriter::new(storage).with_archive(archive));
    }

    let report = engine.run(&suite).await?;

    for case in report.unsuccessful() {
        println!(
            "❌ {} [{}] {}",
            case.full_name,
            case.status.as_str(),
            case.message.as_deref().unwrap_or("")
        );
    }
    println!(
        "Suite '{}': {} passed, {} failed, {} broken ({} total)",
        report.suite_name,
        report.passed(),
        report.failed(),
        report.broken(),
        report.total()
    );
    if write_report {
        println!("📁 Allure results saved to: {}", report_dir);
    }

    Ok(if report.is_success() { 0 } else { 1 })
}

fn exit_with(e: &ApiTestError) -> ! {
    tracing::error!(
        "❌ Test run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
