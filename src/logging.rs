//! Logging setup: compact stderr output plus an optional log file

use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default level when `RUST_LOG` is not set
    pub level: Level,

    /// Also log to this file (rolled daily)
    pub file_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            file_path: None,
        }
    }
}

impl LogConfig {
    pub fn new(debug: bool, file_path: Option<PathBuf>) -> Self {
        Self {
            level: if debug { Level::DEBUG } else { Level::INFO },
            file_path,
        }
    }
}

/// Install the global subscriber.
///
/// `--debug` wins over `RUST_LOG`; otherwise `RUST_LOG` wins over the default level.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = if config.level == Level::DEBUG {
        EnvFilter::new("debug")
    } else {
        EnvFilter::builder()
            .with_default_directive(config.level.into())
            .from_env_lossy()
    };

    let stderr_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = match config.file_path {
        Some(file_path) => {
            let directory = match file_path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&directory)?;

            let file_name = file_path
                .file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_else(|| "honeywell.log".into());
            let file_appender = tracing_appender::rolling::daily(directory, file_name);

            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
