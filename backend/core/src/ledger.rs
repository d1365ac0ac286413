//! Append-only label log.
//!
//! One entry per line: `<identifier> <text>\n`. The identifier ends at the
//! first whitespace character; everything after the whitespace run is the
//! label text. A line without whitespace is an entry with an empty label.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{LabelError, LabelResult};

/// A confirmed label as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub image_name: String,
    pub text: String,
}

/// Collapse every whitespace run (newlines included) to one space and trim
/// both ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse one ledger line. Returns `None` for blank lines.
pub fn parse_line(line: &str) -> Option<LabelEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (image_name, text) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim_start()),
        None => (line, ""),
    };
    Some(LabelEntry {
        image_name: image_name.to_string(),
        text: text.to_string(),
    })
}

async fn ends_with_newline(file: &mut fs::File, len: u64) -> LabelResult<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))
        .await
        .map_err(|e| LabelError::storage("failed to seek labels file", e))?;
    file.read_exact(&mut last)
        .await
        .map_err(|e| LabelError::storage("failed to read labels file tail", e))?;
    Ok(last[0] == b'\n')
}

#[derive(Debug)]
pub struct LabelLedger {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl LabelLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a label, normalising its text. Returns the entry as written.
    ///
    /// The whole line is formatted up front and written with a single call
    /// while holding the append lock. If the write fails the file is truncated
    /// back to its previous length so no partial line survives. An unterminated
    /// last line (a hand edit) gets its newline first, in the same write.
    pub async fn append(&self, image_name: &str, text: &str) -> LabelResult<LabelEntry> {
        let entry = LabelEntry {
            image_name: image_name.to_string(),
            text: normalize_text(text),
        };
        let _guard = self.append_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                LabelError::storage(format!("failed to open labels file {}", self.path.display()), e)
            })?;

        let previous_len = file
            .metadata()
            .await
            .map_err(|e| LabelError::storage("failed to stat labels file", e))?
            .len();

        let mut line = String::new();
        if previous_len > 0 && !ends_with_newline(&mut file, previous_len).await? {
            warn!(path = %self.path.display(), "Labels file lacks a trailing newline; terminating it");
            line.push('\n');
        }
        line.push_str(&format!("{} {}\n", entry.image_name, entry.text));

        let written = match file.write_all(line.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            if let Err(rollback) = file.set_len(previous_len).await {
                warn!(
                    path = %self.path.display(),
                    error = %rollback,
                    "Failed to roll back partial label line"
                );
            }
            return Err(LabelError::storage(
                format!("failed to append label for {image_name}"),
                e,
            ));
        }

        debug!(image_name = %entry.image_name, "Appended label line");
        Ok(entry)
    }

    /// Read every entry in file order. A missing file is an empty ledger.
    ///
    /// Lines that are not valid UTF-8 are logged and skipped.
    pub async fn read_all(&self) -> LabelResult<Vec<LabelEntry>> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LabelError::storage(
                    format!("failed to read labels file {}", self.path.display()),
                    e,
                ))
            }
        };

        let mut entries = Vec::new();
        for (idx, line) in raw.split(|b| *b == b'\n').enumerate() {
            match std::str::from_utf8(line) {
                Ok(line) => entries.extend(parse_line(line)),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = idx + 1,
                    error = %e,
                    "Skipping undecodable label line"
                ),
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ledger_in(dir: &tempfile::TempDir) -> LabelLedger {
        LabelLedger::new(dir.path().join("labels.txt"))
    }

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(normalize_text("  hello \t  world\n\nagain "), "hello world again");
        assert_eq!(normalize_text("\n \t"), "");
    }

    #[test]
    fn parses_on_first_whitespace() {
        assert_eq!(
            parse_line("a.png hello world\r"),
            Some(LabelEntry { image_name: "a.png".into(), text: "hello world".into() })
        );
        assert_eq!(
            parse_line("b.png"),
            Some(LabelEntry { image_name: "b.png".into(), text: String::new() })
        );
        assert_eq!(
            parse_line("c.png\tsome text"),
            Some(LabelEntry { image_name: "c.png".into(), text: "some text".into() })
        );
        assert_eq!(parse_line("   "), None);
    }

    #[tokio::test]
    async fn append_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);

        let written = ledger.append("a.png", "hello   world\n").await.unwrap();
        assert_eq!(written.text, "hello world");

        let entries = ledger.read_all().await.unwrap();
        assert_eq!(
            entries,
            vec![LabelEntry { image_name: "a.png".into(), text: "hello world".into() }]
        );
        let raw = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(raw, "a.png hello world\n");
    }

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ledger_in(&dir).read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicates_are_kept_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        ledger.append("a.png", "first").await.unwrap();
        ledger.append("b.png", "other").await.unwrap();
        ledger.append("a.png", "second").await.unwrap();

        let texts: Vec<_> = ledger
            .read_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| format!("{}={}", e.image_name, e.text))
            .collect();
        assert_eq!(texts, vec!["a.png=first", "b.png=other", "a.png=second"]);
    }

    #[tokio::test]
    async fn skips_blank_and_corrupt_lines() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        let mut raw = b"a.png one\n\n   \nb.png\n".to_vec();
        raw.extend_from_slice(&[0xff, 0xfe, b' ', b'x', b'\n']);
        raw.extend_from_slice(b"c.png three");
        std::fs::write(ledger.path(), raw).unwrap();

        let entries = ledger.read_all().await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.image_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
        assert_eq!(entries[1].text, "");
        assert_eq!(entries[2].text, "three");
    }

    #[tokio::test]
    async fn append_terminates_hand_edited_tail() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        std::fs::write(ledger.path(), b"a.png hand typed").unwrap();

        ledger.append("b.png", "world").await.unwrap();

        let entries = ledger.read_all().await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.image_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(entries[0].text, "hand typed");
        assert_eq!(
            std::fs::read_to_string(ledger.path()).unwrap(),
            "a.png hand typed\nb.png world\n"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(ledger_in(&dir));
        let text = "word ".repeat(500);

        let mut handles = Vec::new();
        for i in 0..32 {
            let ledger = Arc::clone(&ledger);
            let text = text.clone();
            handles.push(tokio::spawn(async move {
                ledger.append(&format!("img{i}.png"), &text).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let raw = std::fs::read_to_string(ledger.path()).unwrap();
        let lines: Vec<_> = raw.lines().collect();
        assert_eq!(lines.len(), 32);
        let expected_text = text.trim_end();
        let mut names: Vec<_> = lines
            .iter()
            .map(|line| {
                let (name, rest) = line.split_once(' ').unwrap();
                assert_eq!(rest, expected_text);
                name.to_string()
            })
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 32);
    }
}
