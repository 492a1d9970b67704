pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{cloudinary::CloudinaryUploader, http::HttpImageFetcher, storage::LocalStorage};
pub use config::{credentials::Credentials, Settings};
pub use core::{delivery::DeliveryUrlBuilder, etl::EtlEngine, pipeline::EnrichPipeline};
pub use utils::error::{EtlError, Result};
