/*!
Logging and optional profiling setup for the command line.

Logs go to stderr so that stdout only carries scored routes. The default
filter is `debug` in debug builds and `info` in release builds, and `RUST_LOG`
overrides it.

With the `profiling` feature, setting `ENABLE_PROFILING` also records a Chrome
trace (open it in Perfetto) to `ROUTE_HAZARD_TRACE_FILE`, or
`route-hazard-trace.json` by default. The trace is flushed when the returned
guard is dropped.
*/

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Keeps the profiling backend alive until the end of `main`
#[must_use]
pub struct LoggingGuard {
    #[cfg(feature = "profiling")]
    _chrome: Option<tracing_chrome::FlushGuard>,
}

/// Filter used when `RUST_LOG` is not set
pub fn default_directives() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives()))
}

/// Initialize logging; profiling is a no-op in this build.
#[cfg(not(feature = "profiling"))]
pub fn setup_logging_and_profiling() -> LoggingGuard {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter());
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::debug!("Logging initialized (profiling disabled in this build)");
    LoggingGuard {}
}

/// Initialize logging and, if `ENABLE_PROFILING` is set, a Chrome trace layer.
#[cfg(feature = "profiling")]
pub fn setup_logging_and_profiling() -> LoggingGuard {
    use tracing_chrome::ChromeLayerBuilder;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    if std::env::var("ENABLE_PROFILING").is_err() {
        tracing_subscriber::registry().with(fmt_layer).init();
        tracing::debug!("Logging initialized (set ENABLE_PROFILING to record a trace)");
        return LoggingGuard { _chrome: None };
    }

    let trace_file = std::env::var("ROUTE_HAZARD_TRACE_FILE")
        .unwrap_or_else(|_| "route-hazard-trace.json".to_string());
    let (chrome_layer, guard) = ChromeLayerBuilder::new().file(&trace_file).build();
    tracing_subscriber::registry()
        .with(chrome_layer)
        .with(fmt_layer)
        .init();

    tracing::info!("Recording Chrome trace to {}", trace_file);
    LoggingGuard {
        _chrome: Some(guard),
    }
}
