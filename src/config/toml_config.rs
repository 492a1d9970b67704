use crate::config::Settings;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Optional settings file. Every section and key may be left out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub load: LoadConfig,
    pub cloudinary: CloudinaryConfig,
    pub fetch: FetchConfig,
    pub naming: NamingConfig,
    pub throttle: ThrottleConfig,
    pub error_handling: ErrorHandlingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: Option<String>,
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: Option<String>,
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudinaryConfig {
    pub folder: Option<String>,
    pub transform: Option<String>,
    pub api_base_url: Option<String>,
    pub delivery_base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub use_alt_text: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorHandlingConfig {
    pub failure_marker: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern"))
}

impl TomlConfig {
    /// Loads and parses a settings file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Overlays every key present in the file onto `settings`.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(path) = &self.source.path {
            settings.input_path = path.clone();
        }
        if let Some(sheet) = &self.source.sheet {
            settings.input_sheet = Some(sheet.clone());
        }
        if let Some(path) = &self.load.output_path {
            settings.output_path = path.clone();
        }
        if let Some(sheet) = &self.load.sheet {
            settings.output_sheet = sheet.clone();
        }
        if let Some(folder) = &self.cloudinary.folder {
            settings.folder = Some(folder.clone());
        }
        if let Some(transform) = &self.cloudinary.transform {
            settings.transform = transform.clone();
        }
        if let Some(url) = &self.cloudinary.api_base_url {
            settings.api_base_url = url.clone();
        }
        if let Some(url) = &self.cloudinary.delivery_base_url {
            settings.delivery_base_url = url.clone();
        }
        if let Some(secs) = self.cloudinary.timeout_seconds {
            settings.upload_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.fetch.timeout_seconds {
            settings.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(use_alt_text) = self.naming.use_alt_text {
            settings.use_alt_text = use_alt_text;
        }
        if let Some(ms) = self.throttle.delay_ms {
            settings.throttle = Duration::from_millis(ms);
        }
        if let Some(marker) = &self.error_handling.failure_marker {
            settings.failure_marker = Some(marker.clone());
        }
    }
}
