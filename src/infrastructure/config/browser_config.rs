use std::time::Duration;

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BrowserKind {
    Chrome,
    Firefox,
}

/// Fixed option profile of the automation session.
#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BrowserConfig {
    pub kind: BrowserKind,
    /// WebDriver server binary. Defaults to `chromedriver`/`geckodriver` by kind.
    pub driver_path: Option<Box<str>>,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: Box<str>,
    pub extra_args: Vec<String>,
    pub driver_startup_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chrome,
            driver_path: None,
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36".into(),
            extra_args: Vec::new(),
            driver_startup_timeout_secs: 10,
        }
    }
}

impl BrowserConfig {
    pub fn driver_binary(&self) -> &str {
        match (&self.driver_path, self.kind) {
            (Some(path), _) => path,
            (None, BrowserKind::Chrome) => "chromedriver",
            (None, BrowserKind::Firefox) => "geckodriver",
        }
    }

    pub fn driver_startup_timeout(&self) -> Duration {
        Duration::from_secs(self.driver_startup_timeout_secs)
    }
}
