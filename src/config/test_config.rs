use crate::utils::error::{ApiTestError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Overrides `target.base_url` when set and non-empty.
pub const BASE_URL_ENV_VAR: &str = "BASE_URL";

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_SUITES_DIR: &str = "suites";
const DEFAULT_REPORT_DIR: &str = "target/allure-results";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    pub target: TargetConfig,
    pub accounts: AccountsConfig,
    pub run: Option<RunConfig>,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

/// Pre-seeded accounts of the system under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsConfig {
    pub supervisor: Account,
    pub admin: Account,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    pub id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    pub concurrency: Option<usize>,
    pub suites_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    pub enabled: Option<bool>,
    pub output_dir: Option<String>,
    pub archive: Option<bool>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig {
                base_url: "http://localhost:8080".to_string(),
                timeout_seconds: None,
            },
            accounts: AccountsConfig {
                supervisor: Account {
                    login: "supervisor".to_string(),
                    id: 1,
                },
                admin: Account {
                    login: "admin".to_string(),
                    id: 2,
                },
            },
            run: None,
            report: None,
        }
    }
}

/// Replaces `${VAR}` placeholders with environment values. Unknown variables
/// are left untouched so validation can point at them.
pub fn substitute_env_vars(content: &str) -> Result<String> {
    use regex::Regex;
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ApiTestError::ConfigValidationError {
        field: "env_substitution".to_string(),
        message: e.to_string(),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

impl TestConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ApiTestError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Applies `BASE_URL` from the environment, which wins over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var(BASE_URL_ENV_VAR) {
            if !base_url.trim().is_empty() {
                tracing::debug!("Base URL overridden by {}: {}", BASE_URL_ENV_VAR, base_url);
                self.target.base_url = base_url;
            }
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("target.base_url", &self.target.base_url)?;

        if let Some(timeout) = self.target.timeout_seconds {
            validation::validate_range("target.timeout_seconds", timeout, 1, 600)?;
        }

        validation::validate_non_empty_string(
            "accounts.supervisor.login",
            &self.accounts.supervisor.login,
        )?;
        validation::validate_non_empty_string("accounts.admin.login", &self.accounts.admin.login)?;

        if self.accounts.supervisor.id == self.accounts.admin.id {
            return Err(ApiTestError::ConfigValidationError {
                field: "accounts".to_string(),
                message: "supervisor and admin must be different players".to_string(),
            });
        }

        if let Some(concurrency) = self.run.as_ref().and_then(|r| r.concurrency) {
            validation::validate_positive_number("run.concurrency", concurrency, 1)?;
        }

        validation::validate_path("report.output_dir", self.report_dir())?;

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.target.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.target
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn concurrency(&self) -> usize {
        self.run
            .as_ref()
            .and_then(|r| r.concurrency)
            .unwrap_or(1)
    }

    pub fn suites_dir(&self) -> &str {
        self.run
            .as_ref()
            .and_then(|r| r.suites_dir.as_deref())
            .unwrap_or(DEFAULT_SUITES_DIR)
    }

    pub fn report_enabled(&self) -> bool {
        self.report.as_ref().and_then(|r| r.enabled).unwrap_or(true)
    }

    pub fn report_dir(&self) -> &str {
        self.report
            .as_ref()
            .and_then(|r| r.output_dir.as_deref())
            .unwrap_or(DEFAULT_REPORT_DIR)
    }

    pub fn archive_report(&self) -> bool {
        self.report.as_ref().and_then(|r| r.archive).unwrap_or(false)
    }
}

impl Validate for TestConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[target]
base_url = "http://players.local:9000"
timeout_seconds = 10

[accounts.supervisor]
login = "supervisor"
id = 1

[accounts.admin]
login = "admin"
id = 2

[run]
concurrency = 4

[report]
output_dir = "out/results"
archive = true
"#;

    #[test]
    fn test_parse_basic_config() {
        let config = TestConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.base_url(), "http://players.local:9000");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.accounts.admin.id, 2);
        assert_eq!(config.concurrency(), 4);
        assert_eq!(config.report_dir(), "out/results");
        assert!(config.archive_report());
        assert!(config.report_enabled());
        assert_eq!(config.suites_dir(), "suites");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = TestConfig::from_toml_str(
            r#"
[target]
base_url = "http://localhost:8080"

[accounts]
supervisor = { login = "supervisor", id = 1 }
admin = { login = "admin", id = 2 }
"#,
        )
        .unwrap();

        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.concurrency(), 1);
        assert_eq!(config.report_dir(), "target/allure-results");
        assert!(!config.archive_report());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PLAYER_API_TEST_HOST", "http://substituted.local");

        let config = TestConfig::from_toml_str(
            r#"
[target]
base_url = "${PLAYER_API_TEST_HOST}"

[accounts]
supervisor = { login = "supervisor", id = 1 }
admin = { login = "admin", id = 2 }
"#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "http://substituted.local");

        std::env::remove_var("PLAYER_API_TEST_HOST");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = TestConfig::default();
        config.target.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = TestConfig::default();
        config.accounts.admin.id = config.accounts.supervisor.id;
        assert!(config.validate().is_err());

        let mut config = TestConfig::default();
        config.run = Some(RunConfig {
            concurrency: Some(0),
            suites_dir: None,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TestConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.accounts.supervisor.login, "supervisor");
    }
}
