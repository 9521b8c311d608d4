use std::fs::File;
use std::io::stderr;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

use chrono::Local;
use miette::{Context, IntoDiagnostic};
use tracing::level_filters::LevelFilter;
use tracing::{Level, info, warn};
use tracing_appender::non_blocking;
use tracing_subscriber::reload;
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, reload::Handle, util::SubscriberInitExt,
};

const LOG_DIR: &str = "/tmp/avalanche_logs";

pub trait LogHandle: Send + Sync {
    fn set_filter(&self, new_filter: EnvFilter) -> miette::Result<()>;
}

impl<S> LogHandle for Handle<EnvFilter, S>
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    fn set_filter(&self, new_filter: EnvFilter) -> miette::Result<()> {
        self.modify(|current| *current = new_filter)
            .into_diagnostic()
    }
}

pub struct LogHandles {
    console_handle: Mutex<Box<dyn LogHandle>>,
    file_handle: Mutex<Box<dyn LogHandle>>,
    log_file: Option<PathBuf>,
}

fn open_log_file() -> miette::Result<(File, PathBuf)> {
    let log_dir = Path::new(LOG_DIR);
    std::fs::create_dir_all(log_dir)
        .into_diagnostic()
        .context("Failed to create log directory")?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let log_path = log_dir.join(format!("avalanche_{timestamp}.log"));
    let log_file = File::create(&log_path)
        .into_diagnostic()
        .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;
    Ok((log_file, log_path))
}

static LOG_HANDLES: LazyLock<LogHandles> = LazyLock::new(|| {
    #[cfg(feature = "dev-tools")]
    color_backtrace::install();

    // Console Layer with its own reloadable filter. Stdout belongs to the
    // line protocol, so logs go to stderr
    let console_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let (console_filter, console_handle) = reload::Layer::new(console_filter);
    let console_layer = fmt::layer()
        .without_time()
        .with_writer(stderr)
        .with_filter(console_filter);

    // File Layer with its own reloadable filter (initially off)
    let file_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .from_env_lossy();
    let (file_filter, file_handle) = reload::Layer::new(file_filter);

    let (file_layer, log_file) = match open_log_file() {
        Ok((log_file, log_path)) => {
            let (non_blocking_writer, guard) = non_blocking(log_file);
            std::mem::forget(guard); // Keep the writer alive for the whole run

            let layer = fmt::layer()
                .with_writer(non_blocking_writer)
                .with_ansi(false) // No colors in file
                .with_filter(file_filter);
            (Some(layer), Some(log_path))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    if log_file.is_none() {
        warn!("File logging unavailable, could not create a log file in {LOG_DIR}");
    }

    LogHandles {
        console_handle: Mutex::new(Box::new(console_handle)),
        file_handle: Mutex::new(Box::new(file_handle)),
        log_file,
    }
});

pub fn set_log_level(level: Level) -> miette::Result<()> {
    let new_filter = EnvFilter::new(level.to_string());

    LOG_HANDLES
        .console_handle
        .lock()
        .map_err(|_| miette::miette!("Console log handle poisoned"))?
        .set_filter(new_filter)
        .with_context(|| format!("Failed to modify log filter to level: {level}"))
}

pub fn toggle_file_logging(enable: bool) -> miette::Result<()> {
    let new_filter = if enable {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("off")
    };

    if enable && LOG_HANDLES.log_file.is_none() {
        miette::bail!("No log file could be created in {LOG_DIR}");
    }

    LOG_HANDLES
        .file_handle
        .lock()
        .map_err(|_| miette::miette!("File log handle poisoned"))?
        .set_filter(new_filter)
        .context("Failed to modify log filter")
}

/// Path of this run's log file, if one could be created
pub fn log_file() -> Option<&'static Path> {
    LOG_HANDLES.log_file.as_deref()
}

/// Initialize tracing and backtrace
pub fn init() {
    LazyLock::force(&LOG_HANDLES);
    info!(
        "{} {}, log file: {}",
        env!("CARGO_PKG_NAME"),
        env!("APP_VERSION"),
        log_file()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".into())
    );
}
