use std::process::ExitCode;

use crypto_market_scraper::cli::cli_adapter::CliAdapter;
use crypto_market_scraper::infrastructure::config::app_config::CONFIG;
use crypto_market_scraper::prettyprint::prettyprint::PrettyFormatter;
use tracing::instrument;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

fn init_tracing() {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(std::io::stderr);

    let log_file_layer = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&*CONFIG.logging.file)
        .map_err(|error| {
            eprintln!(
                "[LOG ERROR] Cannot open {}: {}, logging to stderr only",
                CONFIG.logging.file, error
            )
        })
        .ok()
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .event_format(PrettyFormatter::new(false))
                .with_writer(file)
                .with_ansi(false)
        });

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("crypto_market_scraper", CONFIG.logging.tracing_level()),
        )
        .with(log_file_layer)
        .with(stderr_layer)
        .init();

    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}

#[tokio::main]
#[instrument]
async fn main() -> ExitCode {
    init_tracing();

    let args = std::env::args().collect::<Vec<_>>();
    match CliAdapter::new(CONFIG.clone()).run(args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(report) => {
            eprintln!("{:?}", report);
            ExitCode::FAILURE
        }
    }
}
