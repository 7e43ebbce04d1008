mod analyzer;
mod config;
mod logging;
mod model;
mod normalizer;
mod parser;
mod runner;
mod scraper;
mod storage;

use chrono::Local;
use config::{AppConfig, StoreConfig, config_path, load_config};
use crate::scraper::HttpFetcher;
use logging::{LogConfig, init_logging};
use model::FatalError;
use parser::ProductPageParser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Logging settings live in the config file, so it is read first
    let config = match load_config(config_path()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let log_config =
        LogConfig::new(&config.log_dir, &config.log_file).with_level(&config.log_level);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    match start(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn start(config: &AppConfig) -> Result<runner::RunSummary, FatalError> {
    let store_config = StoreConfig::from_env()?;

    let fetcher = HttpFetcher::new(config.request_timeout_secs.map(Duration::from_secs))
        .map_err(FatalError::Client)?;
    let parser = ProductPageParser::new();

    info!("Starting price check run");
    runner::run(
        config,
        &store_config,
        &fetcher,
        &parser,
        Local::now().date_naive(),
    )
    .await
}
