#[cfg(feature = "cli")]
pub mod cli;
pub mod credentials;
pub mod toml_config;

use crate::adapters::cloudinary::DEFAULT_API_BASE_URL;
use crate::adapters::sheet::{READABLE_EXTENSIONS, WRITABLE_EXTENSIONS};
use crate::core::delivery::{DEFAULT_DELIVERY_BASE_URL, DEFAULT_TRANSFORM};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_range, validate_url,
    Validate,
};
use std::time::Duration;

pub const DEFAULT_INPUT_PATH: &str = "source.xlsx";
pub const DEFAULT_OUTPUT_PATH: &str = "final_output.xlsx";
pub const DEFAULT_OUTPUT_SHEET: &str = "Sheet1";
pub const DEFAULT_THROTTLE_MS: u64 = 300;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Fully resolved run settings: defaults, then the TOML file, then CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input_path: String,
    /// `None` reads the first sheet of a workbook.
    pub input_sheet: Option<String>,
    pub output_path: String,
    pub output_sheet: String,
    pub folder: Option<String>,
    pub transform: String,
    pub api_base_url: String,
    pub delivery_base_url: String,
    pub fetch_timeout: Duration,
    pub upload_timeout: Duration,
    /// Pause after every attempted row.
    pub throttle: Duration,
    pub use_alt_text: bool,
    /// Written to Image Src for rows without a delivery URL. Empty when unset.
    pub failure_marker: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_path: DEFAULT_INPUT_PATH.to_string(),
            input_sheet: None,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            output_sheet: DEFAULT_OUTPUT_SHEET.to_string(),
            folder: None,
            transform: DEFAULT_TRANSFORM.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            delivery_base_url: DEFAULT_DELIVERY_BASE_URL.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
            use_alt_text: true,
            failure_marker: None,
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("source.path", &self.input_path)?;
        validate_file_extension("source.path", &self.input_path, READABLE_EXTENSIONS)?;
        validate_path("load.output_path", &self.output_path)?;
        validate_file_extension("load.output_path", &self.output_path, WRITABLE_EXTENSIONS)?;
        validate_non_empty_string("load.sheet", &self.output_sheet)?;

        validate_non_empty_string("cloudinary.transform", &self.transform)?;
        validate_url("cloudinary.api_base_url", &self.api_base_url)?;
        validate_url("cloudinary.delivery_base_url", &self.delivery_base_url)?;

        validate_range("fetch.timeout_seconds", self.fetch_timeout.as_secs(), 1, 600)?;
        validate_range("cloudinary.timeout_seconds", self.upload_timeout.as_secs(), 1, 600)?;
        validate_range("throttle.delay_ms", self.throttle.as_millis(), 0, 60_000)?;
        Ok(())
    }
}
