use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckinError {
    #[error("No file part named 'file' in the upload")]
    MissingFile,

    #[error("Unsupported spreadsheet format: {file_name}")]
    UnsupportedFormat { file_name: String },

    #[error("Malformed spreadsheet: {message}")]
    MalformedSpreadsheet { message: String },

    #[error("Index {index} out of range for {len} attendees")]
    IndexOutOfRange { index: i128, len: usize },

    #[error("No attendee with id {id}")]
    UnknownAttendee { id: u64 },

    #[error("Malformed JSON: {message}")]
    MalformedJson { message: String },

    #[error("Invalid value for '{field}': {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to render {format} export: {message}")]
    ExportError {
        format: &'static str,
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Who is responsible for a failure: the caller, the deployment, or the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Configuration,
    Server,
}

impl CheckinError {
    pub fn malformed_spreadsheet(message: impl Into<String>) -> Self {
        Self::MalformedSpreadsheet {
            message: message.into(),
        }
    }

    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::MalformedJson {
            message: message.into(),
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingFile
            | Self::UnsupportedFormat { .. }
            | Self::MalformedSpreadsheet { .. }
            | Self::IndexOutOfRange { .. }
            | Self::UnknownAttendee { .. }
            | Self::MalformedJson { .. }
            | Self::ValidationError { .. }
            | Self::PayloadTooLarge { .. } => ErrorCategory::Client,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::ExportError { .. }
            | Self::IoError(_)
            | Self::Internal { .. } => ErrorCategory::Server,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Client
    }
}

pub type Result<T> = std::result::Result<T, CheckinError>;
