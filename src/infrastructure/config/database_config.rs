#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Box<str>,
    pub retention_days: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://crypto_data.db".into(),
            retention_days: 30,
        }
    }
}
