use crate::config::test_config::substitute_env_vars;
use crate::core::suite::TestCase;
use crate::utils::error::{ApiTestError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const BUILTIN_FULL: &str = include_str!("../../suites/full.toml");
const BUILTIN_SANITY: &str = include_str!("../../suites/sanity.toml");

pub const DEFAULT_SUITE_NAME: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteDefinition {
    pub suite: SuiteInfo,
    #[serde(default)]
    pub selection: SelectionConfig,
    pub run: Option<SuiteRunConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteInfo {
    pub name: String,
    pub description: Option<String>,
}

/// Empty include lists select every case; exclusions always win.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub include_groups: Vec<String>,
    #[serde(default)]
    pub exclude_groups: Vec<String>,
    #[serde(default)]
    pub include_classes: Vec<String>,
    #[serde(default)]
    pub include_cases: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteRunConfig {
    pub concurrency: Option<usize>,
}

impl SuiteDefinition {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ApiTestError::ConfigValidationError {
            field: "suite_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Every registered case, no file involved.
    pub fn default_discovery() -> Self {
        Self {
            suite: SuiteInfo {
                name: DEFAULT_SUITE_NAME.to_string(),
                description: Some("All discovered scenarios".to_string()),
            },
            selection: SelectionConfig::default(),
            run: None,
        }
    }

    pub fn builtin(name: &str) -> Result<Option<Self>> {
        match name {
            "full" => Self::from_toml_str(BUILTIN_FULL).map(Some),
            "sanity" => Self::from_toml_str(BUILTIN_SANITY).map(Some),
            DEFAULT_SUITE_NAME => Ok(Some(Self::default_discovery())),
            _ => Ok(None),
        }
    }

    /// Lookup order: explicit file, `<suites_dir>/<name>.toml`, built-in
    /// definition. Without a name or file the default discovery is used.
    pub fn resolve(name: Option<&str>, file: Option<&str>, suites_dir: &str) -> Result<Self> {
        if let Some(file) = file {
            tracing::debug!("Loading suite definition from {}", file);
            return Self::from_file(file);
        }

        let Some(name) = name else {
            return Ok(Self::default_discovery());
        };

        let candidate: PathBuf = Path::new(suites_dir).join(format!("{}.toml", name));
        if candidate.is_file() {
            tracing::debug!("Loading suite '{}' from {}", name, candidate.display());
            return Self::from_file(candidate);
        }

        Self::builtin(name)?.ok_or_else(|| ApiTestError::SuiteNotFound {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.suite.name
    }

    pub fn concurrency(&self) -> Option<usize> {
        self.run.as_ref().and_then(|r| r.concurrency)
    }

    pub fn matches(&self, case: &TestCase) -> bool {
        let selection = &self.selection;

        if case
            .groups
            .iter()
            .any(|group| selection.exclude_groups.contains(group))
        {
            return false;
        }

        let no_includes = selection.include_groups.is_empty()
            && selection.include_classes.is_empty()
            && selection.include_cases.is_empty();
        if no_includes {
            return true;
        }

        case.groups
            .iter()
            .any(|group| selection.include_groups.contains(group))
            || selection.include_classes.iter().any(|c| c == case.class)
            || selection.include_cases.iter().any(|wanted| {
                wanted == &case.method || wanted == &case.name() || wanted == &case.full_name()
            })
    }

    pub fn select(&self, cases: Vec<TestCase>) -> Vec<TestCase> {
        cases.into_iter().filter(|case| self.matches(case)).collect()
    }
}

impl Validate for SuiteDefinition {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("suite.name", &self.suite.name)?;
        if let Some(concurrency) = self.concurrency() {
            validation::validate_positive_number("run.concurrency", concurrency, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::suite::TestCase;

    fn case(class: &'static str, method: &str, groups: &[&str]) -> TestCase {
        let mut case = TestCase::new(class, method, "synthetic", |_ctx| {
            Box::pin(async { Ok::<(), ApiTestError>(()) })
        });
        for group in groups {
            case = case.in_group(group);
        }
        case
    }

    fn catalog() -> Vec<TestCase> {
        vec![
            case("GetAllPlayers", "default_system_users_are_present", &["sanity"]),
            case("GetAllPlayers", "schema_integrity", &[]),
            case("CreatePlayer", "invalid_age", &["slow"])
                .with_params(vec!["16".to_string()]),
            case("DeletePlayer", "admin_can_delete_self", &[]),
        ]
    }

    #[test]
    fn test_builtin_suites_parse() {
        let full = SuiteDefinition::builtin("full").unwrap().unwrap();
        let sanity = SuiteDefinition::builtin("sanity").unwrap().unwrap();
        assert_eq!(full.name(), "full");
        assert_eq!(sanity.name(), "sanity");
        assert!(full.validate().is_ok());
        assert!(SuiteDefinition::builtin("nightly").unwrap().is_none());
    }

    #[test]
    fn test_sanity_selects_only_sanity_group() {
        let sanity = SuiteDefinition::builtin("sanity").unwrap().unwrap();
        let selected = sanity.select(catalog());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].method, "default_system_users_are_present");
    }

    #[test]
    fn test_full_and_default_select_everything() {
        let full = SuiteDefinition::builtin("full").unwrap().unwrap();
        assert_eq!(full.select(catalog()).len(), 4);
        assert_eq!(SuiteDefinition::default_discovery().select(catalog()).len(), 4);
    }

    #[test]
    fn test_exclusions_win_and_case_names_match_parameterized_variants() {
        let suite = SuiteDefinition::from_toml_str(
            r#"
[suite]
name = "custom"

[selection]
include_cases = ["invalid_age", "DeletePlayer.admin_can_delete_self"]
exclude_groups = ["slow"]

[run]
concurrency = 2
"#,
        )
        .unwrap();

        let selected = suite.select(catalog());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].method, "admin_can_delete_self");
        assert_eq!(suite.concurrency(), Some(2));
    }

    #[test]
    fn test_resolve_prefers_files_then_builtins() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("sanity.toml"),
            "[suite]\nname = \"sanity-local\"\n[selection]\ninclude_groups = [\"sanity\"]\n",
        )
        .unwrap();
        let suites_dir = dir.path().to_str().unwrap();

        let local = SuiteDefinition::resolve(Some("sanity"), None, suites_dir).unwrap();
        assert_eq!(local.name(), "sanity-local");

        let builtin = SuiteDefinition::resolve(Some("full"), None, suites_dir).unwrap();
        assert_eq!(builtin.name(), "full");

        let default = SuiteDefinition::resolve(None, None, suites_dir).unwrap();
        assert_eq!(default.name(), DEFAULT_SUITE_NAME);

        let missing = SuiteDefinition::resolve(Some("nightly"), None, suites_dir);
        assert!(matches!(missing, Err(ApiTestError::SuiteNotFound { .. })));
    }
}
