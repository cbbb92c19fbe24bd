//! Transcript persistence: one text file per session, named by its start time.

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use directories::ProjectDirs;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::core::config::path_display;

const TRANSCRIPT_EXTENSION: &str = "txt";

#[derive(Debug)]
pub enum HistoryError {
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Io { path, source } => {
                write!(f, "chat history I/O failed at {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for HistoryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            HistoryError::Io { source, .. } => Some(source),
        }
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> HistoryError + '_ {
    move |source| HistoryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn default_history_dir() -> PathBuf {
    match ProjectDirs::from("org", "palaver", "palaver") {
        Some(dirs) => dirs.data_dir().join("chat_history"),
        None => PathBuf::from("chat_history"),
    }
}

/// Writes the running session's transcript, replacing it on every save.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    dir: PathBuf,
    session_file: PathBuf,
}

impl TranscriptStore {
    pub fn new(dir: impl Into<PathBuf>, started_at: DateTime<Local>) -> Self {
        let dir = dir.into();
        let name = format!(
            "{}.{}",
            started_at.format("%Y%m%d_%H%M%S"),
            TRANSCRIPT_EXTENSION
        );
        let session_file = dir.join(name);
        Self { dir, session_file }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    /// Atomically replace the session file with `contents`.
    pub fn save(&self, contents: &str) -> Result<(), HistoryError> {
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let path = self.session_file.as_path();
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(io_err(path))?;
        temp.write_all(contents.as_bytes()).map_err(io_err(path))?;
        temp.as_file_mut().sync_all().map_err(io_err(path))?;
        temp.persist(path).map_err(|e| io_err(path)(e.error))?;
        debug!(path = %path_display(path), bytes = contents.len(), "saved transcript");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub name: String,
    pub contents: String,
}

/// The `limit` most recent transcripts in `dir`, newest first. A missing
/// directory just means there is no history yet.
pub fn recent(dir: &Path, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(io_err(dir)(err)),
    };

    let mut names: Vec<String> = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(io_err(dir))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(TRANSCRIPT_EXTENSION) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }

    // Names are timestamps, so lexical order is chronological.
    names.sort_unstable_by(|a, b| b.cmp(a));
    names.truncate(limit);

    names
        .into_iter()
        .map(|name| {
            let path = dir.join(&name);
            let bytes = fs::read(&path).map_err(io_err(&path))?;
            let contents = String::from_utf8_lossy(&bytes).into_owned();
            Ok(HistoryEntry { name, contents })
        })
        .collect()
}

pub fn format_entries(entries: &[HistoryEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str("=== ");
        out.push_str(&entry.name);
        out.push_str(" ===\n");
        out.push_str(entry.contents.trim_end());
        out.push_str("\n\n");
    }
    out
}
