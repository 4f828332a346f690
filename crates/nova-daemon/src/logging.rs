//! Logging setup: `tracing` + `tracing-subscriber` to stderr/file, with the
//! current log rotated aside at startup so each run gets a clean file while
//! still keeping one generation of history.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;

use crate::config::DaemonConfig;

/// Holds the non-blocking writer's flush guard; dropping it stops the
/// background flush thread, so callers must keep this alive for the process
/// lifetime.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// Install the global `tracing` subscriber. Safe to call at most once per
/// process; a second call is a no-op (the subscriber is already installed).
pub fn init(config: &DaemonConfig) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(&config.log_dir)?;
    rotate_previous_log(&config.log_dir, &config.log_file);

    let file_appender = tracing_appender::rolling::never(&config.log_dir, &config.log_file);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let result = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .try_init();

    if let Err(err) = result {
        tracing::debug!(%err, "tracing subscriber already installed, reusing it");
    }

    install_panic_hook();
    Ok(LoggingGuard { _guard: guard })
}

fn rotate_previous_log(log_dir: &Path, log_file: &Path) {
    let current = log_dir.join(log_file);
    if !current.exists() {
        return;
    }
    let mut rotated = current.clone();
    rotated.set_extension(match current.extension() {
        Some(ext) => format!("{}.old", ext.to_string_lossy()),
        None => "old".to_string(),
    });
    let _ = std::fs::rename(&current, &rotated);
}

fn install_panic_hook() {
    static HOOK: std::sync::Once = std::sync::Once::new();
    HOOK.call_once(|| {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "daemon.panic", %info, "panic");
            default_hook(info);
        }));
    });
}
