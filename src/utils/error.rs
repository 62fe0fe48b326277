use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiTestError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV report error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Suite '{name}' not found")]
    SuiteNotFound { name: String },

    #[error("{operation}: expected status {expected} but got {actual}")]
    UnexpectedStatus {
        operation: String,
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("Expected response body for {target}, but got an empty string! Status code: {status}")]
    EmptyBody { target: String, status: u16 },

    #[error("Assertion failed: {}", failures.join("; "))]
    AssertionFailed { failures: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Assertion,
    Data,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ApiTestError {
    pub fn assertion(message: impl Into<String>) -> Self {
        ApiTestError::AssertionFailed {
            failures: vec![message.into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiTestError::HttpError(_) | ApiTestError::UrlError(_) => ErrorCategory::Network,
            ApiTestError::IoError(_) | ApiTestError::CsvError(_) | ApiTestError::ZipError(_) => {
                ErrorCategory::Io
            }
            ApiTestError::SerializationError(_) | ApiTestError::EmptyBody { .. } => {
                ErrorCategory::Data
            }
            ApiTestError::ConfigValidationError { .. }
            | ApiTestError::InvalidConfigValueError { .. }
            | ApiTestError::MissingConfigError { .. }
            | ApiTestError::SuiteNotFound { .. } => ErrorCategory::Configuration,
            ApiTestError::UnexpectedStatus { .. } | ApiTestError::AssertionFailed { .. } => {
                ErrorCategory::Assertion
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Assertion => ErrorSeverity::High,
            ErrorCategory::Network | ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Io | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// A case that fails on an assertion is a product bug; anything else means
    /// the case could not run to completion.
    pub fn is_assertion(&self) -> bool {
        self.category() == ErrorCategory::Assertion
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ApiTestError::HttpError(_) => {
                "Check that the Player API is running and reachable at the configured base URL"
            }
            ApiTestError::UrlError(_) => "Use an absolute http(s) base URL, e.g. http://localhost:8080",
            ApiTestError::IoError(_) | ApiTestError::ZipError(_) | ApiTestError::CsvError(_) => {
                "Check that the report directory exists and is writable"
            }
            ApiTestError::SerializationError(_) | ApiTestError::EmptyBody { .. } => {
                "The API returned a payload that does not match the expected schema"
            }
            ApiTestError::ConfigValidationError { .. }
            | ApiTestError::InvalidConfigValueError { .. }
            | ApiTestError::MissingConfigError { .. } => {
                "Fix test-config.toml or the matching command-line override"
            }
            ApiTestError::SuiteNotFound { .. } => {
                "Pass --suite full, --suite sanity, or --suite-file <path>"
            }
            ApiTestError::UnexpectedStatus { .. } | ApiTestError::AssertionFailed { .. } => {
                "Inspect the case steps and HTTP attachments in the report"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ApiTestError::HttpError(e) if e.is_connect() => {
                "Could not connect to the Player API".to_string()
            }
            ApiTestError::HttpError(e) if e.is_timeout() => {
                "The Player API did not answer in time".to_string()
            }
            ApiTestError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            ApiTestError::SuiteNotFound { name } => format!("Unknown test suite '{}'", name),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiTestError>;
