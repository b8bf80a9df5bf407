//! Tracing subscriber setup for the worker process.

use std::panic;
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber.
///
/// `RUST_LOG` controls filtering (default `info`). `log` records from
/// lower-level code are bridged into tracing. When a log directory is
/// configured, JSON events are also written to `<dir>/<app_name>.log`,
/// rotated daily; keep the returned guard alive to flush that file.
pub fn init_logging(config: &LoggingConfig, app_name: &str) -> Option<WorkerGuard> {
    let _ = tracing_log::LogTracer::init();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(false).boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed(),
    });

    let guard = config
        .directory
        .as_deref()
        .and_then(|dir| rotating_file_layer(Path::new(dir), app_name))
        .map(|(layer, guard)| {
            layers.push(layer);
            guard
        });

    let subscriber = tracing_subscriber::registry().with(layers).with(env_filter);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        log::debug!("Global tracing subscriber already installed");
    }

    guard
}

fn rotating_file_layer(dir: &Path, app_name: &str) -> Option<(BoxedLayer, WorkerGuard)> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!(
            "Failed to create log directory {}: {}; logging to stdout only",
            dir.display(),
            e
        );
        return None;
    }

    let appender = tracing_appender::rolling::daily(dir, format!("{}.log", app_name));
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .boxed();
    Some((layer, guard))
}

/// Routes panics through `tracing` with their location. Installed once per
/// process.
pub fn install_panic_hook(app_name: &'static str) {
    static INSTALLED: OnceLock<()> = OnceLock::new();

    INSTALLED.get_or_init(|| {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let thread = std::thread::current();
            let location = info
                .location()
                .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()));
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".into());

            tracing::error!(
                application = app_name,
                thread = thread.name().unwrap_or("unnamed"),
                location = location.as_deref().unwrap_or("unknown"),
                panic_message = %message,
                "Panic captured"
            );
            default_hook(info);
        }));
    });
}
