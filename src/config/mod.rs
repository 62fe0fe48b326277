pub mod cli;
pub mod suite_config;
pub mod test_config;

pub const DEFAULT_CONFIG_PATH: &str = "test-config.toml";

#[cfg(feature = "cli")]
use crate::config::test_config::TestConfig;
#[cfg(feature = "cli")]
use crate::utils::error::{ApiTestError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::Path;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "player-api-tests")]
#[command(about = "Conformance tests for the Player management HTTP API")]
pub struct CliConfig {
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[arg(long, global = true, help = "Base URL of the API under test (overrides config and BASE_URL)")]
    pub base_url: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a suite (every scenario when no suite is given)
    Run(RunArgs),
    /// List the cases a suite selects
    List(SelectArgs),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct SelectArgs {
    #[arg(long, help = "Suite name: full, sanity, or <suites_dir>/<name>.toml")]
    pub suite: Option<String>,

    #[arg(long, conflicts_with = "suite", help = "Path to a suite definition file")]
    pub suite_file: Option<String>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectArgs,

    #[arg(long)]
    pub concurrency: Option<usize>,

    #[arg(long, help = "Directory for Allure results")]
    pub report_dir: Option<String>,

    #[arg(long, help = "Do not write report files")]
    pub no_report: bool,

    #[arg(long, help = "Also bundle the results into allure-results.zip")]
    pub archive: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// `run` with default arguments when no subcommand is given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Run(RunArgs::default()))
    }

    /// File values, then `BASE_URL`, then `--base-url`. A missing file is
    /// only tolerated at the default path.
    pub fn load_test_config(&self) -> Result<TestConfig> {
        let mut config = if Path::new(&self.config).is_file() {
            TestConfig::from_file(&self.config)?
        } else if self.config == DEFAULT_CONFIG_PATH {
            tracing::warn!(
                "⚠️ {} not found, using built-in defaults",
                DEFAULT_CONFIG_PATH
            );
            TestConfig::default()
        } else {
            return Err(ApiTestError::MissingConfigError {
                field: format!("config file {}", self.config),
            });
        };

        config.apply_env_overrides();
        if let Some(base_url) = &self.base_url {
            config.target.base_url = base_url.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("config", &self.config)?;

        if let Some(base_url) = &self.base_url {
            validation::validate_url("base_url", base_url)?;
        }

        if let Some(Command::Run(args)) = &self.command {
            if let Some(concurrency) = args.concurrency {
                validation::validate_positive_number("concurrency", concurrency, 1)?;
            }
            if let Some(report_dir) = &args.report_dir {
                validation::validate_path("report_dir", report_dir)?;
            }
        }

        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_run_subcommand() {
        let cli = CliConfig::try_parse_from([
            "player-api-tests",
            "run",
            "--suite",
            "sanity",
            "--concurrency",
            "4",
            "--archive",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
        match cli.command() {
            Command::Run(args) => {
                assert_eq!(args.selection.suite.as_deref(), Some("sanity"));
                assert_eq!(args.concurrency, Some(4));
                assert!(args.archive);
                assert!(!args.no_report);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let cli = CliConfig::try_parse_from(["player-api-tests"]).unwrap();
        assert!(matches!(cli.command(), Command::Run(_)));
    }

    #[test]
    fn test_suite_and_suite_file_conflict() {
        let result = CliConfig::try_parse_from([
            "player-api-tests",
            "list",
            "--suite",
            "full",
            "--suite-file",
            "custom.toml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_bad_overrides() {
        let cli = CliConfig::try_parse_from([
            "player-api-tests",
            "--base-url",
            "ftp://players.local",
            "run",
        ])
        .unwrap();
        assert!(cli.validate().is_err());

        let cli =
            CliConfig::try_parse_from(["player-api-tests", "run", "--concurrency", "0"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_load_config_with_cli_override() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[target]
base_url = "http://from-file:8080"

[accounts]
supervisor = { login = "supervisor", id = 1 }
admin = { login = "admin", id = 2 }
"#,
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let cli = CliConfig::try_parse_from([
            "player-api-tests",
            "--config",
            path,
            "--base-url",
            "http://from-cli:9090",
        ])
        .unwrap();
        let config = cli.load_test_config().unwrap();
        assert_eq!(config.base_url(), "http://from-cli:9090");

        let missing =
            CliConfig::try_parse_from(["player-api-tests", "--config", "/nonexistent/x.toml"])
                .unwrap();
        assert!(matches!(
            missing.load_test_config(),
            Err(ApiTestError::MissingConfigError { .. })
        ));
    }
}
