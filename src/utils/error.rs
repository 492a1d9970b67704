use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Missing required environment variables: {}", .missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },

    #[error("Source sheet must contain column: '{column}'")]
    MissingColumn { column: String },

    #[error("Spreadsheet error: {message}")]
    SheetError { message: String },

    #[error("HTTP client error: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl EtlError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingCredentials { missing } => format!(
                "Cloudinary credentials are not configured ({} not set)",
                missing.join(" / ")
            ),
            EtlError::MissingColumn { column } => {
                format!("The input spreadsheet has no '{}' column", column)
            }
            EtlError::SheetError { message } => format!("Could not process spreadsheet: {}", message),
            EtlError::IoError(e) => format!("File access failed: {}", e),
            EtlError::CsvError(e) => format!("Could not read or write CSV data: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::MissingCredentials { .. } => {
                "Export CLOUD_NAME, CLOUD_API_KEY and CLOUD_API_SECRET before running"
            }
            EtlError::MissingColumn { .. } => {
                "Add the column to the header row (names are case-sensitive)"
            }
            EtlError::SheetError { .. } | EtlError::CsvError(_) => {
                "Check that the file is a valid .xlsx, .csv or .tsv spreadsheet and the sheet name exists"
            }
            EtlError::IoError(_) => "Check that the path exists and is writable",
            EtlError::ApiError(_) => "Check network connectivity and TLS configuration",
            EtlError::ConfigValidationError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Fix the command-line flags or the TOML settings file and retry"
            }
        }
    }
}

/// Why an image could not be downloaded from its origin.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Fetch failed ({status}) for URL: {url}")]
    Status { url: String, status: u16 },

    #[error("Fetch failed for URL {url}: {reason}")]
    Transport { url: String, reason: String },
}

/// Why the media host refused or could not take an upload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Upload failed ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Upload failed: {reason}")]
    Transport { reason: String },

    #[error("Upload response could not be read: {reason}")]
    InvalidResponse { reason: String },
}

/// Per-row failure. These never abort the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

pub type Result<T> = std::result::Result<T, EtlError>;
