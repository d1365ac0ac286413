//! Recognizer backed by an external OCR command.
//!
//! The command receives the image either as a path argument or, for uploads,
//! on stdin with a trailing `-` argument, and prints a JSON array of
//! `{"text": ..., "confidence": ...}` objects on stdout.

use std::path::Path;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use ocrlabel_core::{Recognizer, TextRegion};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct RawRegion {
    text: String,
    #[serde(default)]
    confidence: f32,
}

/// Parse the bridge's stdout into regions, keeping reading order.
pub fn parse_regions(stdout: &str) -> Result<Vec<TextRegion>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<RawRegion> =
        serde_json::from_str(trimmed).context("failed to parse OCR JSON response")?;
    Ok(raw
        .into_iter()
        .map(|r| TextRegion {
            text: r.text,
            confidence: if r.confidence.is_nan() {
                0.0
            } else {
                r.confidence.clamp(0.0, 1.0)
            },
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct OcrBridge {
    program: String,
    args: Vec<String>,
}

impl OcrBridge {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Build from a whitespace separated command line such as
    /// `python3 scripts/paddleocr_bridge.py`.
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            bail!("OCR command is empty");
        };
        Ok(Self::new(program).with_args(parts))
    }

    fn command(&self, target: &std::ffi::OsStr) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(target)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, mut cmd: Command, stdin: Option<&[u8]>) -> Result<Vec<TextRegion>> {
        cmd.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() });
        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to invoke OCR command `{}`", self.program))?;

        if let (Some(bytes), Some(mut pipe)) = (stdin, child.stdin.take()) {
            if let Err(e) = pipe.write_all(bytes).await {
                // The engine may stop reading early; its exit status decides.
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e).context("failed to send image to OCR command");
                }
            }
            drop(pipe);
        }

        let output = child
            .wait_with_output()
            .await
            .context("failed to wait for OCR command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "OCR command exited unsuccessfully");
            bail!("OCR bridge failed: {}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let regions = parse_regions(&stdout)?;
        debug!(regions = regions.len(), "OCR command finished");
        Ok(regions)
    }
}

#[async_trait]
impl Recognizer for OcrBridge {
    fn name(&self) -> &str {
        &self.program
    }

    async fn recognize_bytes(&self, image: &[u8]) -> Result<Vec<TextRegion>> {
        self.run(self.command("-".as_ref()), Some(image)).await
    }

    async fn recognize_path(&self, path: &Path) -> Result<Vec<TextRegion>> {
        self.run(self.command(path.as_os_str()), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_regions_and_clamps_confidence() {
        let regions = parse_regions(
            r#"[{"text": "Total", "confidence": 0.97}, {"text": "12.50", "confidence": 1.4}, {"text": "x"}]"#,
        )
        .unwrap();
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].text, "Total");
        assert_eq!(regions[1].confidence, 1.0);
        assert_eq!(regions[2].confidence, 0.0);
    }

    #[test]
    fn empty_output_means_no_text() {
        assert!(parse_regions("  \n").unwrap().is_empty());
        assert!(parse_regions("[]").unwrap().is_empty());
    }

    #[test]
    fn garbage_output_is_an_error() {
        assert!(parse_regions("Traceback (most recent call last)").is_err());
    }

    #[test]
    fn command_line_splits_program_and_args() {
        let bridge = OcrBridge::from_command_line("python3  bridge.py --lang en").unwrap();
        assert_eq!(bridge.program, "python3");
        assert_eq!(bridge.args, vec!["bridge.py", "--lang", "en"]);
        assert!(OcrBridge::from_command_line("   ").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_command_against_path_and_stdin() {
        let script = r#"if [ "$0" = "-" ]; then n=$(wc -c); echo "[{\"text\": \"bytes $n\", \"confidence\": 0.5}]"; else echo "[{\"text\": \"path\", \"confidence\": 0.9}]"; fi"#;
        let bridge = OcrBridge::new("sh").with_args(["-c", script]);

        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.png");
        std::fs::write(&image, b"img").unwrap();

        let from_path = bridge.recognize_path(&image).await.unwrap();
        assert_eq!(from_path[0].text, "path");

        let from_bytes = bridge.recognize_bytes(b"12345").await.unwrap();
        assert_eq!(from_bytes[0].text.split_whitespace().collect::<Vec<_>>(), vec!["bytes", "5"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_is_an_error() {
        let bridge = OcrBridge::new("sh").with_args(["-c", "echo boom >&2; exit 3"]);
        let err = bridge.recognize_bytes(b"x").await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
