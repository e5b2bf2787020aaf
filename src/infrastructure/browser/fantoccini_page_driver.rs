use std::fmt;
use std::time::Duration;

use error_stack::{Report, ResultExt};
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use tokio::process::Child;
use tokio::time::Instant;
use tracing::{event, instrument, Level};

use super::webdriver_process::{random_port, session_capabilities, spawn_driver_process};
use crate::domain::page::{PageDriver, SessionError, SessionLauncher};
use crate::infrastructure::config::browser_config::BrowserConfig;

const CONNECT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A WebDriver session plus the driver process backing it.
///
/// `release` closes the session and kills the driver. If the value is dropped first
/// (error, panic, cancelled future) the driver is still killed and the session close is
/// handed to the runtime.
pub struct FantocciniPageDriver {
    driver_process: Option<Child>,
    client: Option<Client>,
}

impl fmt::Debug for FantocciniPageDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FantocciniPageDriver")
            .field("released", &self.client.is_none())
            .finish()
    }
}

#[instrument(skip(config))]
async fn connect_client(
    config: &BrowserConfig,
    port: u16,
) -> error_stack::Result<Client, SessionError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(session_capabilities(config));

    let webdriver_url = format!("http://localhost:{}", port);
    let deadline = Instant::now() + config.driver_startup_timeout();

    // The driver process needs a moment before it accepts connections.
    loop {
        match builder.connect(&webdriver_url).await {
            Ok(client) => return Ok(client),
            Err(error) if Instant::now() < deadline => {
                event!(Level::TRACE, %error, "WebDriver not ready yet");
                tokio::time::sleep(CONNECT_POLL_INTERVAL).await;
            }
            Err(error) => {
                return Err(Report::new(error)
                    .change_context(SessionError::FailedToCreateClient)
                    .attach_printable(format!(
                        "Failed to connect to {} on port {}",
                        config.driver_binary(),
                        port
                    )))
            }
        }
    }
}

impl FantocciniPageDriver {
    #[instrument(skip(config))]
    pub async fn start(config: &BrowserConfig) -> error_stack::Result<Self, SessionError> {
        let port = random_port();
        let driver_process = spawn_driver_process(config, port)?;

        // On error `driver_process` is dropped here and killed with it.
        let client = connect_client(config, port)
            .await
            .change_context(SessionError::FailedToStartEngine)?;

        if let Err(error) = client
            .set_window_size(config.window_width, config.window_height)
            .await
        {
            tracing::warn!("Failed to set window size: {}", error);
        }

        tracing::info!(browser = %config.kind, port, "Browser session started");
        Ok(Self {
            driver_process: Some(driver_process),
            client: Some(client),
        })
    }

    fn client(&self) -> error_stack::Result<&Client, SessionError> {
        self.client
            .as_ref()
            .ok_or_else(|| Report::new(SessionError::Released))
    }
}

#[async_trait::async_trait]
impl PageDriver for FantocciniPageDriver {
    #[instrument(skip(self))]
    async fn goto(&self, url: &str) -> error_stack::Result<(), SessionError> {
        self.client()?
            .goto(url)
            .await
            .change_context(SessionError::FailedToNavigate)
            .attach_printable_lazy(|| format!("URL: {}", url))
    }

    #[instrument(skip(self))]
    async fn wait_for_element(
        &self,
        css: &str,
        timeout: Duration,
    ) -> error_stack::Result<bool, SessionError> {
        let result = self
            .client()?
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(css))
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(CmdError::WaitTimeout) => Ok(false),
            Err(error) => Err(Report::new(error)
                .change_context(SessionError::ElementLookupFailed)
                .attach_printable(format!("Selector: {}", css))),
        }
    }

    async fn scroll_height(&self) -> error_stack::Result<u64, SessionError> {
        let value = self
            .client()?
            .execute("return document.body.scrollHeight;", vec![])
            .await
            .change_context(SessionError::FailedToExecuteScript)?;

        value
            .as_u64()
            .or_else(|| value.as_f64().map(|height| height.max(0.0) as u64))
            .ok_or_else(|| {
                Report::new(SessionError::FailedToExecuteScript)
                    .attach_printable(format!("Unexpected scroll height: {}", value))
            })
    }

    async fn scroll_to(&self, y: u64) -> error_stack::Result<(), SessionError> {
        self.client()?
            .execute("window.scrollTo(0, arguments[0]);", vec![y.into()])
            .await
            .change_context(SessionError::FailedToExecuteScript)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn page_source(&self) -> error_stack::Result<String, SessionError> {
        self.client()?
            .source()
            .await
            .change_context(SessionError::FailedToReadSource)
    }

    #[instrument(skip(self))]
    async fn release(&mut self) {
        if let Some(client) = self.client.take() {
            client.close().await.unwrap_or_else(|error| {
                tracing::error!("Failed to close WebDriver session: {}", error)
            });
        }

        if let Some(mut process) = self.driver_process.take() {
            process.kill().await.unwrap_or_else(|error| {
                tracing::error!("Failed to kill WebDriver process: {}", error)
            });
            tracing::info!("Browser session released");
        }
    }
}

impl Drop for FantocciniPageDriver {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            tracing::warn!("Browser session dropped without release; closing in background");
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    client.close().await.ok();
                });
            }
        }

        if let Some(mut process) = self.driver_process.take() {
            process.start_kill().unwrap_or_else(|error| {
                tracing::error!("Failed to kill WebDriver process: {}", error)
            });
        }
    }
}

/// Starts one fresh browser session per `acquire`.
#[derive(Debug, Clone)]
pub struct FantocciniSessionLauncher {
    config: BrowserConfig,
}

impl FantocciniSessionLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl SessionLauncher for FantocciniSessionLauncher {
    async fn acquire(&self) -> error_stack::Result<Box<dyn PageDriver>, SessionError> {
        let driver = FantocciniPageDriver::start(&self.config).await?;
        Ok(Box::new(driver))
    }
}
