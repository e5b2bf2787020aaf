use std::sync::LazyLock;

use config::{Config, Environment, File};
use error_stack::{Report, ResultExt};
use serde::de::IntoDeserializer;
use serde::Deserialize;
use serde_path_to_error::{Deserializer as PathDeserializer, Segment, Track};
use thiserror::Error;

use super::browser_config::BrowserConfig;
use super::database_config::DatabaseConfig;
use super::logging_config::LoggingConfig;
use super::scraping_config::ScrapingConfig;

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub scraping: ScrapingConfig,
    pub browser: BrowserConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config sources")]
    FailedToRead,
    #[error("Failed to deserialize config")]
    FailedToDeserialize,
    #[error("Invalid config value")]
    InvalidValue,
}

pub const ENV_PREFIX: &str = "CMC";

/// Reads `<config_path>.{toml,yaml,json,...}` if present, then overlays `CMC__SECTION__KEY`
/// environment variables. Every field has a default, so an empty environment is valid.
pub fn load_config(config_path: &str) -> error_stack::Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name(config_path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .change_context(ConfigError::FailedToRead)
        .attach_printable_lazy(|| format!("Config path: {}", config_path))?;

    let value = config
        .try_deserialize::<serde_json::Value>()
        .change_context(ConfigError::FailedToDeserialize)?;

    let mut track = Track::new();
    let path_de = PathDeserializer::new(value.into_deserializer(), &mut track);
    let app_config = AppConfig::deserialize(path_de).map_err(|e| {
        let path_str = track
            .path()
            .iter()
            .map(|seg| match seg {
                Segment::Seq { index } => format!("[{}]", index),
                Segment::Map { key } => format!(".{}", key),
                Segment::Enum { variant } => format!("::{}", variant),
                Segment::Unknown => String::from("<?>"),
            })
            .collect::<String>();
        Report::new(e)
            .change_context(ConfigError::FailedToDeserialize)
            .attach_printable(format!(
                "Field path: {}",
                path_str.trim_start_matches('.')
            ))
    })?;

    validate(&app_config)?;
    Ok(app_config)
}

fn validate(config: &AppConfig) -> error_stack::Result<(), ConfigError> {
    if config.scraping.scroll_step_px == 0 {
        return Err(Report::new(ConfigError::InvalidValue)
            .attach_printable("scraping.scroll_step_px must be greater than zero"));
    }
    if config.scraping.table_selector.trim().is_empty() {
        return Err(Report::new(ConfigError::InvalidValue)
            .attach_printable("scraping.table_selector must not be empty"));
    }
    Ok(())
}

pub static CONFIG: LazyLock<AppConfig> = LazyLock::new(|| {
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "Config".to_string());
    load_config(&config_path).unwrap_or_else(|report| {
        panic!(
            "[CONFIG ERROR] Failed to load config '{}': {:?}",
            config_path, report
        )
    })
});
