use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
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

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Cannot read fallback file '{path}': {source}")]
    FallbackFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Column '{column}' not found in CSV header")]
    MissingColumn { column: String },

    #[error("Malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("Invalid integer '{value}' in column '{column}'")]
    InvalidNumber { column: String, value: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parsing,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::MissingColumn { .. }
            | EtlError::MalformedRow { .. }
            | EtlError::InvalidNumber { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Parsing,
            EtlError::IoError(_) | EtlError::FallbackFileError { .. } => ErrorCategory::Storage,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤只在建立 client 時才會往上拋
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Parsing => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::FallbackFileError { path, .. } => format!(
                "The website could not be reached and the local extract '{}' is unavailable",
                path
            ),
            EtlError::MissingColumn { column } => {
                format!("The local extract has no '{}' column", column)
            }
            EtlError::MalformedRow { row, .. } => {
                format!("The source table is malformed at row {}", row)
            }
            EtlError::InvalidNumber { value, .. } => {
                format!("The local extract contains a non-numeric value '{}'", value)
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity or the configured base_url",
            ErrorCategory::Parsing => {
                "Re-download the CSV extracts from the Embrapa website or pick another year"
            }
            ErrorCategory::Storage => {
                "Make sure fallback.data_dir points to the directory holding the CSV extracts"
            }
            ErrorCategory::Configuration => "Review the configuration file and CLI arguments",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
