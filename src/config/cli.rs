use crate::config::toml_config::TomlConfig;
use crate::config::Settings;
use crate::utils::error::Result;
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "sku-image-etl")]
#[command(about = "Re-host product images on Cloudinary and add delivery URLs to a spreadsheet")]
pub struct CliConfig {
    /// Input spreadsheet (.xlsx, .xls, .ods, .csv, .tsv) [default: source.xlsx]
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output spreadsheet (.xlsx, .csv, .tsv); overwritten if present [default: final_output.xlsx]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Worksheet to read from a workbook [default: first sheet]
    #[arg(long)]
    pub sheet: Option<String>,

    /// TOML settings file; flags given here take precedence over it
    #[arg(short, long)]
    pub config: Option<String>,

    /// Cloudinary folder to upload into
    #[arg(long)]
    pub folder: Option<String>,

    /// Delivery transformation inserted into every URL
    #[arg(long)]
    pub transform: Option<String>,

    /// Pause after each attempted row, in milliseconds [default: 300]
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Image download timeout in seconds [default: 30]
    #[arg(long)]
    pub fetch_timeout: Option<u64>,

    /// Upload timeout in seconds [default: 60]
    #[arg(long)]
    pub upload_timeout: Option<u64>,

    /// Name assets after Product Name / SKU only, ignoring Image Alt Text
    #[arg(long)]
    pub no_alt_text_id: bool,

    /// Text written to Image Src when a row fails [default: empty]
    #[arg(long)]
    pub failure_marker: Option<String>,

    /// Upload API base URL [default: https://api.cloudinary.com]
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Show the public ID planned for every row without uploading anything
    #[arg(long)]
    pub dry_run: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Defaults, then the settings file named by `--config`, then flags.
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(path) = &self.config {
            tracing::info!("📁 Loading settings from: {}", path);
            TomlConfig::from_file(path)?.apply_to(&mut settings);
        }

        self.apply_to(&mut settings);
        Ok(settings)
    }

    fn apply_to(&self, settings: &mut Settings) {
        if let Some(input) = &self.input {
            settings.input_path = input.clone();
        }
        if let Some(output) = &self.output {
            settings.output_path = output.clone();
        }
        if let Some(sheet) = &self.sheet {
            settings.input_sheet = Some(sheet.clone());
        }
        if let Some(folder) = &self.folder {
            settings.folder = Some(folder.clone());
        }
        if let Some(transform) = &self.transform {
            settings.transform = transform.clone();
        }
        if let Some(ms) = self.throttle_ms {
            settings.throttle = Duration::from_millis(ms);
        }
        if let Some(secs) = self.fetch_timeout {
            settings.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.upload_timeout {
            settings.upload_timeout = Duration::from_secs(secs);
        }
        if self.no_alt_text_id {
            settings.use_alt_text = false;
        }
        if let Some(marker) = &self.failure_marker {
            settings.failure_marker = Some(marker.clone());
        }
        if let Some(url) = &self.api_base_url {
            settings.api_base_url = url.clone();
        }
    }
}
