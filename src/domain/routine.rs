use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutineError {
    #[error("Scrape run failed: {reason}")]
    ScrapeFailed { reason: String },
    #[error("Retention pruning failed")]
    PruneFailed,
    #[error("Export failed")]
    ExportFailed,
    #[error("Failed to set up the routine")]
    SetupFailed,
    #[error("Invalid arguments: {details}")]
    InvalidArguments { details: String },
}

impl RoutineError {
    pub fn invalid_arguments<S: Into<String>>(details: S) -> Self {
        RoutineError::InvalidArguments {
            details: details.into(),
        }
    }
}

/// One unit of work the binary can be asked to perform. `run` returns a one-line
/// summary meant for the operator.
#[async_trait::async_trait]
pub trait Routine: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self) -> error_stack::Result<String, RoutineError>;
}
