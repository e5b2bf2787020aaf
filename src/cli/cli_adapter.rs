use std::path::PathBuf;
use std::sync::Arc;

use error_stack::{Report, ResultExt};
use tracing::{error, info, instrument};

use crate::application::routines::export_routine::{ExportRoutine, DEFAULT_EXPORT_LIMIT};
use crate::application::routines::prune_routine::PruneRoutine;
use crate::application::routines::report_routines::{ReportKind, ReportRoutine};
use crate::application::routines::scrape_routine::ScrapeRoutine;
use crate::application::scrape_and_store::ScrapeAndStore;
use crate::domain::routine::{Routine, RoutineError};
use crate::domain::snapshot_repository::SnapshotRepository;
use crate::infrastructure::browser::fantoccini_page_driver::FantocciniSessionLauncher;
use crate::infrastructure::config::app_config::AppConfig;
use crate::infrastructure::persistence::sqlite_snapshot_repository::SqliteSnapshotRepository;

pub const DEFAULT_LATEST_LIMIT: u32 = 100;
pub const DEFAULT_MOVERS_LIMIT: u32 = 10;

pub const USAGE: &str = "Usage: crypto-market-scraper [scrape | prune [days] | stats | \
latest [limit] | search <name> | movers [limit] | export <file.csv|file.xlsx> [limit]]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scrape,
    Prune { retention_days: Option<u32> },
    Statistics,
    Latest { limit: u32 },
    Search { name: String },
    Movers { limit: u32 },
    Export { path: PathBuf, limit: u32 },
}

/// Parses `args` as received by `main`, program name first.
pub fn parse_args(args: &[String]) -> Result<Command, RoutineError> {
    let number = |index: usize, default: u32| -> Result<u32, RoutineError> {
        match args.get(index) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|_| {
                RoutineError::invalid_arguments(format!("'{}' is not a positive number", value))
            }),
        }
    };

    let command = match args.get(1).map(|arg| arg.as_str()) {
        None | Some("scrape") => Command::Scrape,
        Some("prune") => Command::Prune {
            retention_days: args.get(2).map(|_| number(2, 0)).transpose()?,
        },
        Some("stats") => Command::Statistics,
        Some("latest") => Command::Latest {
            limit: number(2, DEFAULT_LATEST_LIMIT)?,
        },
        Some("search") => Command::Search {
            name: args
                .get(2)
                .filter(|name| !name.trim().is_empty())
                .ok_or_else(|| RoutineError::invalid_arguments("search needs a name"))?
                .clone(),
        },
        Some("movers") => Command::Movers {
            limit: number(2, DEFAULT_MOVERS_LIMIT)?,
        },
        Some("export") => Command::Export {
            path: args
                .get(2)
                .map(PathBuf::from)
                .ok_or_else(|| RoutineError::invalid_arguments("export needs a file path"))?,
            limit: number(3, DEFAULT_EXPORT_LIMIT)?,
        },
        Some(other) => {
            return Err(RoutineError::invalid_arguments(format!(
                "unknown command '{}'",
                other
            )))
        }
    };
    Ok(command)
}

/// Turns command lines into routines wired to the configured browser and store.
#[derive(Debug)]
pub struct CliAdapter {
    config: AppConfig,
}

impl CliAdapter {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn repository(&self) -> error_stack::Result<Arc<dyn SnapshotRepository>, RoutineError> {
        let repository = SqliteSnapshotRepository::new(&self.config.database.url)
            .change_context(RoutineError::SetupFailed)?;
        Ok(Arc::new(repository))
    }

    pub fn routine_for(
        &self,
        command: Command,
    ) -> error_stack::Result<Box<dyn Routine>, RoutineError> {
        let repository = self.repository()?;

        let routine: Box<dyn Routine> = match command {
            Command::Scrape => {
                let launcher = Arc::new(FantocciniSessionLauncher::new(
                    self.config.browser.clone(),
                ));
                let pipeline = ScrapeAndStore::new(launcher, repository, &self.config.scraping)
                    .change_context(RoutineError::SetupFailed)?;
                Box::new(ScrapeRoutine::new(pipeline))
            }
            Command::Prune { retention_days } => Box::new(PruneRoutine::new(
                repository,
                retention_days.unwrap_or(self.config.database.retention_days),
            )),
            Command::Statistics => Box::new(ReportRoutine::new(repository, ReportKind::Statistics)),
            Command::Latest { limit } => {
                Box::new(ReportRoutine::new(repository, ReportKind::Latest { limit }))
            }
            Command::Search { name } => {
                Box::new(ReportRoutine::new(repository, ReportKind::Search { name }))
            }
            Command::Movers { limit } => {
                Box::new(ReportRoutine::new(repository, ReportKind::Movers { limit }))
            }
            Command::Export { path, limit } => {
                Box::new(ExportRoutine::new(repository, path, limit))
            }
        };
        Ok(routine)
    }

    #[instrument(skip(self))]
    pub async fn run(&self, args: Vec<String>) -> error_stack::Result<String, RoutineError> {
        let command = parse_args(&args)
            .map_err(|error| Report::new(error).attach_printable(USAGE))?;
        let routine = self.routine_for(command)?;

        match routine.run().await {
            Ok(output) => {
                info!("✅ {}: OK", routine.name());
                Ok(output)
            }
            Err(report) => {
                error!("❌ {}: {:?}", routine.name(), report);
                Err(report)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        std::iter::once("crypto-market-scraper")
            .chain(line.split_whitespace())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_scrape_is_the_default() {
        assert_eq!(parse_args(&args("")).unwrap(), Command::Scrape);
        assert_eq!(parse_args(&args("scrape")).unwrap(), Command::Scrape);
    }

    #[test]
    fn test_optional_numbers_fall_back_to_defaults() {
        assert_eq!(
            parse_args(&args("prune")).unwrap(),
            Command::Prune {
                retention_days: None
            }
        );
        assert_eq!(
            parse_args(&args("prune 7")).unwrap(),
            Command::Prune {
                retention_days: Some(7)
            }
        );
        assert_eq!(
            parse_args(&args("latest")).unwrap(),
            Command::Latest {
                limit: DEFAULT_LATEST_LIMIT
            }
        );
        assert_eq!(
            parse_args(&args("movers 3")).unwrap(),
            Command::Movers { limit: 3 }
        );
    }

    #[test]
    fn test_export_takes_path_and_limit() {
        assert_eq!(
            parse_args(&args("export out.csv 50")).unwrap(),
            Command::Export {
                path: PathBuf::from("out.csv"),
                limit: 50
            }
        );
        assert_eq!(
            parse_args(&args("export out.csv")).unwrap(),
            Command::Export {
                path: PathBuf::from("out.csv"),
                limit: DEFAULT_EXPORT_LIMIT
            }
        );
        assert_eq!(
            parse_args(&args("export report.xlsx 5")).unwrap(),
            Command::Export {
                path: PathBuf::from("report.xlsx"),
                limit: 5
            }
        );
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        for line in ["search", "export", "latest ten", "prune -1", "launch"] {
            assert!(
                matches!(
                    parse_args(&args(line)),
                    Err(RoutineError::InvalidArguments { .. })
                ),
                "{}",
                line
            );
        }
    }

    #[tokio::test]
    async fn test_prune_command_runs_against_configured_database() {
        let path = std::env::temp_dir().join(format!(
            "crypto-market-scraper-cli-{}.db",
            rand::random::<u64>()
        ));
        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}", path.display()).into();

        let output = CliAdapter::new(config).run(args("prune 1")).await;

        std::fs::remove_file(&path).ok();
        assert!(output.unwrap().contains("older than 1 days"));
    }
}
