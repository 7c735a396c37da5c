use std::path::Path;
use std::sync::Once;

use tracing_appender::non_blocking::WorkerGuard;

/// Configure a rolling file logger the same way `ox-bin` does: a fresh
/// `cplot.log` per run, written through a non-blocking writer so
/// tracing never blocks the motion pipeline on file I/O. Returns the
/// worker guard; dropping it flushes pending log lines.
pub fn init(verbose: bool) -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("cplot.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let default_level = if verbose { "debug" } else { "info" };
    let file_appender = tracing_appender::rolling::never(log_dir, "cplot.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    match tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).try_init() {
        Ok(()) => Some(guard),
        Err(_) => None,
    }
}

pub fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}
