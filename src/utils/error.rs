use thiserror::Error;

#[derive(Error, Debug)]
pub enum RollupError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Subscription source error: {message}")]
    SourceError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Data,
    Configuration,
}

/// 錯誤嚴重程度，CLI 依此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RollupError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RollupError::ApiError(_) | RollupError::SourceError { .. } => ErrorCategory::Network,
            RollupError::IoError(_) | RollupError::ZipError(_) => ErrorCategory::Io,
            RollupError::CsvError(_)
            | RollupError::SerializationError(_)
            | RollupError::InvalidInput { .. } => ErrorCategory::Data,
            RollupError::ConfigError { .. }
            | RollupError::ConfigValidationError { .. }
            | RollupError::InvalidConfigValueError { .. }
            | RollupError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RollupError::ApiError(_) | RollupError::SourceError { .. } => {
                "Check the source endpoint and network connectivity, then retry"
            }
            RollupError::IoError(_) | RollupError::ZipError(_) => {
                "Check that the input file exists and the output path is writable"
            }
            RollupError::CsvError(_) | RollupError::SerializationError(_) => {
                "Check that the subscription payload is valid JSON"
            }
            RollupError::InvalidInput { .. } => {
                "The subscription payload must be a JSON array of subscription records"
            }
            RollupError::MissingConfigError { .. } => {
                "Add the missing field to the TOML file or pass it on the command line"
            }
            RollupError::ConfigError { .. }
            | RollupError::ConfigValidationError { .. }
            | RollupError::InvalidConfigValueError { .. } => {
                "Review the configuration file against the documented options"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not retrieve subscriptions: {}", self),
            ErrorCategory::Io => format!("File system problem: {}", self),
            ErrorCategory::Data => format!("Subscription data could not be processed: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, RollupError>;
