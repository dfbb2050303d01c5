use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::{
    format::FmtSpan,
    writer::{MakeWriter, MakeWriterExt},
};

pub const LOG_PREFIX: &str = "fitrecon";

/// Logs go to a daily rotated file in `application_data_path/logs`. With `show_std` they are
/// echoed to stderr, stdout is kept for the report. Without a data path stderr is the only
/// destination.
pub fn enable_logging(
    application_data_path: Option<&Path>,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let level = log_level
        .map(|v| v.to_string())
        .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));

    match application_data_path {
        Some(path) => {
            let appender = tracing_appender::rolling::Builder::new()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix(LOG_PREFIX)
                .build(path.join("logs"))?;
            let stderr = std::io::stderr.with_filter(move |_| show_std);
            init_subscriber(stderr.and(appender), &level);
        }
        None => init_subscriber(std::io::stderr, &level),
    }
    Ok(())
}

fn init_subscriber<W>(writer: W, level: &str)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace("-", "_"),
        )))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
