use std::error::Error;
use std::io::Write;

use crate::core::context::AppContext;
use crate::core::history::{format_entries, recent};

/// Print the `limit` (or configured) most recent transcripts, newest first.
pub fn show<W: Write>(
    context: &AppContext,
    limit: Option<usize>,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let config = context.config();
    let limit = limit.unwrap_or_else(|| config.history_limit());
    let entries = recent(&context.history_dir(), limit)?;

    if entries.is_empty() {
        writeln!(out, "{}", config.language().strings().history_empty)?;
    } else {
        write!(out, "{}", format_entries(&entries))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::i18n::Language;
    use crate::utils::test_utils::RecordingTransport;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> AppContext {
        let config = Config {
            language: Some(Language::En),
            history_dir: Some(dir.path().join("history")),
            ..Default::default()
        };
        AppContext::from_parts(
            dir.path().join("config.toml"),
            config,
            Arc::new(RecordingTransport::new()),
        )
    }

    #[test]
    fn empty_history_says_so() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        show(&context(&dir), None, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No saved chats yet\n");
    }

    #[test]
    fn newest_transcripts_first_with_limit() {
        let dir = TempDir::new().unwrap();
        let history = dir.path().join("history");
        fs::create_dir_all(&history).unwrap();
        fs::write(history.join("20240101_090000.txt"), "old\n").unwrap();
        fs::write(history.join("20240102_090000.txt"), "middle\n").unwrap();
        fs::write(history.join("20240103_090000.txt"), "new\n").unwrap();

        let mut out = Vec::new();
        show(&context(&dir), Some(2), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "=== 20240103_090000.txt ===\nnew\n\n=== 20240102_090000.txt ===\nmiddle\n\n"
        );
    }
}
