use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Target of this crate's own events; everything else is held at warn.
const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

pub struct LogConfig {
    pub log_dir: String,
    pub file_name: String,
    pub level: String,
}

impl LogConfig {
    pub fn new(log_dir: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            log_dir: log_dir.into(),
            file_name: file_name.into(),
            level: "debug".into(),
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

/// Builds the filter directive: `warn` for every library, `level` for this crate.
pub fn filter_directives(level: &str) -> String {
    format!("warn,{CRATE_TARGET}={level}")
}

/// Installs the global subscriber: a plain file layer plus a colored console layer.
///
/// Must be called once, at process start. The returned guard flushes the file
/// writer on drop and has to live until the run ends.
pub fn init_logging(config: &LogConfig) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = rolling::never(&config.log_dir, &config.file_name);
    let (writer, guard) = non_blocking(file_appender);
    let filter = EnvFilter::try_new(filter_directives(&config.level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false),
        )
        .with(fmt::layer().with_writer(io::stdout).with_ansi(true))
        .try_init()?;

    Ok(guard)
}
