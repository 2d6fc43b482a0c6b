//! 日志系统
//!
//! Console output plus an optional append-only log file for the CI artifact.

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 初始化日志系统
///
/// # Arguments
/// * `log_level` - filter directive (`info`, `flowbox=debug`, ...); `RUST_LOG` when `None`
/// * `log_file` - file that receives a copy of every event; opened in append mode
///
/// # Examples
/// ```no_run
/// use flowbox::utils::logger::init_logger;
/// use std::path::Path;
///
/// init_logger(Some("info"), Some(Path::new("logs/flowbox.log"))).unwrap();
/// ```
pub fn init_logger(log_level: Option<&str>, log_file: Option<&Path>) -> Result<()> {
    let env_filter = if let Some(level) = log_level {
        EnvFilter::try_new(level)?
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,flowbox=debug"))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(true)
        .compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if let Some(log_path) = log_file {
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(std::sync::Arc::new(file))
            .with_target(true)
            .with_ansi(false)
            .with_level(true);

        registry.with(file_layer).try_init()?;
    } else {
        registry.try_init()?;
    }

    tracing::debug!("Logger initialized");
    Ok(())
}
