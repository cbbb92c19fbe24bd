//! Tracing subscriber setup.
//!
//! The full-screen chat owns the terminal, so its diagnostics go to a log
//! file in the data directory. One-shot subcommands log to stderr.

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File,
}

pub fn default_log_path() -> PathBuf {
    match ProjectDirs::from("org", "palaver", "palaver") {
        Some(dirs) => dirs.data_dir().join("palaver.log"),
        None => PathBuf::from("palaver.log"),
    }
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `-v` when set.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing(verbosity: u8, target: LogTarget) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .with(filter)
                .try_init();
        }
        LogTarget::File => {
            let Some(file) = open_log_file() else {
                // No writable log location; stay silent rather than corrupt the TUI.
                return;
            };
            let _ = tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .with(filter)
                .try_init();
        }
    }
}

fn open_log_file() -> Option<File> {
    let path = default_log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}
