use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Season source {source_ref} returned HTTP {status}")]
    HttpStatus { source_ref: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid score '{value}' in season {season}, row {row}")]
    InvalidScore {
        season: String,
        row: usize,
        value: String,
    },

    #[error("Insufficient data: {message}")]
    InsufficientData { message: String },

    #[error("Model error: {message}")]
    ModelError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Model,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ForecastError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ForecastError::ConfigError { .. }
            | ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ForecastError::HttpError(_) | ForecastError::HttpStatus { .. } => {
                ErrorCategory::Network
            }
            ForecastError::CsvError(_)
            | ForecastError::InvalidScore { .. }
            | ForecastError::InsufficientData { .. }
            | ForecastError::ProcessingError { .. } => ErrorCategory::Data,
            ForecastError::ModelError { .. } => ErrorCategory::Model,
            ForecastError::ZipError(_)
            | ForecastError::IoError(_)
            | ForecastError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // a retry may succeed once the remote source is reachable again
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data | ErrorCategory::Model => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ForecastError::HttpError(_) | ForecastError::HttpStatus { .. } => {
                "Check the season URL and network connectivity, then retry".to_string()
            }
            ForecastError::CsvError(_) => {
                "Make sure every season file has 'Team 1', 'FT' and 'Team 2' columns".to_string()
            }
            ForecastError::InvalidScore { .. } => {
                "Full-time scores must look like '2-1'; fix or blank out the offending row"
                    .to_string()
            }
            ForecastError::InsufficientData { .. } => {
                "Provide at least two consecutive seasons with played matches".to_string()
            }
            ForecastError::ModelError { .. } => {
                "Check the model parameters (n_estimators, max_depth)".to_string()
            }
            ForecastError::ConfigError { .. }
            | ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. } => {
                "Review the command line arguments or the TOML configuration".to_string()
            }
            ForecastError::IoError(_) => {
                "Check that input files exist and the output directory is writable".to_string()
            }
            ForecastError::ZipError(_) | ForecastError::SerializationError(_) => {
                "Check free disk space in the output directory".to_string()
            }
            ForecastError::ProcessingError { .. } => "Inspect the input data".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not download season data: {}", self),
            ErrorCategory::Data => format!("Season data problem: {}", self),
            ErrorCategory::Model => format!("Model training failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// Process exit code for the CLI binaries.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
