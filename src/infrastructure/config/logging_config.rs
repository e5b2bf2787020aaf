#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Box<str>,
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub level: Box<str>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "crypto_scraper.log".into(),
            level: "info".into(),
        }
    }
}

impl LoggingConfig {
    pub fn tracing_level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}
