use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Failed to start the browser engine")]
    FailedToStartEngine,
    #[error("Failed to create a WebDriver client")]
    FailedToCreateClient,
    #[error("Failed to navigate to URL")]
    FailedToNavigate,
    #[error("Failed to execute script in the page")]
    FailedToExecuteScript,
    #[error("Failed to look up element")]
    ElementLookupFailed,
    #[error("Failed to read the page source")]
    FailedToReadSource,
    #[error("Session was already released")]
    Released,
}

/// A live, navigable browser page.
///
/// Everything the pipeline needs from the browser goes through here, so the
/// scroll loop and the orchestrator can run against a scripted page in tests.
#[async_trait::async_trait]
pub trait PageDriver: Send + Sync {
    async fn goto(&self, url: &str) -> error_stack::Result<(), SessionError>;

    /// Waits for the first element matching `css`. `Ok(false)` means the timeout
    /// elapsed without a match.
    async fn wait_for_element(
        &self,
        css: &str,
        timeout: Duration,
    ) -> error_stack::Result<bool, SessionError>;

    async fn scroll_height(&self) -> error_stack::Result<u64, SessionError>;

    async fn scroll_to(&self, y: u64) -> error_stack::Result<(), SessionError>;

    async fn page_source(&self) -> error_stack::Result<String, SessionError>;

    /// Ends the session and terminates the engine. Idempotent. Implementations must
    /// also release on drop, for exit paths that never reach this call.
    async fn release(&mut self);
}

#[async_trait::async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn acquire(&self) -> error_stack::Result<Box<dyn PageDriver>, SessionError>;
}
