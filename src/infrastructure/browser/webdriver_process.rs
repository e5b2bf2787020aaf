use std::process::Stdio;

use error_stack::ResultExt;
use serde_json::{json, Map, Value};
use tokio::process::{Child, Command};
use tracing::instrument;

use crate::domain::page::SessionError;
use crate::infrastructure::config::browser_config::{BrowserConfig, BrowserKind};

pub fn random_port() -> u16 {
    rand::random::<u16>() % (65535 - 1024) + 1024
}

/// Starts the WebDriver server for the configured browser on `port`. The child is killed
/// when its handle is dropped.
#[instrument(skip(config), fields(driver = config.driver_binary()))]
pub fn spawn_driver_process(
    config: &BrowserConfig,
    port: u16,
) -> error_stack::Result<Child, SessionError> {
    let mut command = Command::new(config.driver_binary());
    match config.kind {
        BrowserKind::Chrome => {
            command.arg(format!("--port={}", port)).arg("--silent");
        }
        BrowserKind::Firefox => {
            command
                .arg("--port")
                .arg(port.to_string())
                .arg("--log")
                .arg("fatal");
        }
    }

    command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .change_context(SessionError::FailedToStartEngine)
        .attach_printable_lazy(|| {
            format!(
                "Failed to spawn '{}' on port {}",
                config.driver_binary(),
                port
            )
        })
}

/// WebDriver capabilities for the fixed session profile: headless, no GPU, fixed window,
/// automation markers hidden.
pub fn session_capabilities(config: &BrowserConfig) -> Map<String, Value> {
    let mut capabilities = Map::new();
    match config.kind {
        BrowserKind::Chrome => {
            let mut args = vec![
                "--disable-gpu".to_string(),
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-blink-features=AutomationControlled".to_string(),
                format!("--window-size={},{}", config.window_width, config.window_height),
                format!("--user-agent={}", config.user_agent),
            ];
            if config.headless {
                args.insert(0, "--headless=new".to_string());
            }
            args.extend(config.extra_args.iter().cloned());

            capabilities.insert(
                "goog:chromeOptions".to_string(),
                json!({
                    "args": args,
                    "excludeSwitches": ["enable-automation"],
                    "useAutomationExtension": false,
                }),
            );
        }
        BrowserKind::Firefox => {
            let mut args = vec![
                format!("--width={}", config.window_width),
                format!("--height={}", config.window_height),
            ];
            if config.headless {
                args.insert(0, "-headless".to_string());
            }
            args.extend(config.extra_args.iter().cloned());

            capabilities.insert(
                "moz:firefoxOptions".to_string(),
                json!({
                    "args": args,
                    "prefs": {
                        "general.useragent.override": &*config.user_agent,
                        "dom.webdriver.enabled": false,
                        "layers.acceleration.disabled": true,
                    },
                }),
            );
        }
    }
    capabilities
}
