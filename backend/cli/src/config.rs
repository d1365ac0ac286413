use std::path::PathBuf;

use serde::Deserialize;

/// Labeling service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Directory holding the images to label
    pub images_dir: PathBuf,
    /// Append-only label log
    pub labels_file: PathBuf,
    /// OCR command line; the image path or `-` is appended
    pub ocr_command: String,
    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
    /// Log level
    pub log_level: String,
    /// Directory for rolling JSON logs
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            images_dir: PathBuf::from("images"),
            labels_file: PathBuf::from("labels.txt"),
            ocr_command: "python3 scripts/paddleocr_bridge.py".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_address: get("OCRLABEL_BIND").unwrap_or(defaults.bind_address),
            port: get("OCRLABEL_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            images_dir: get("OCRLABEL_IMAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.images_dir),
            labels_file: get("OCRLABEL_LABELS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.labels_file),
            ocr_command: get("OCRLABEL_OCR_COMMAND").unwrap_or(defaults.ocr_command),
            cors_origins: get("OCRLABEL_CORS_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or(defaults.cors_origins),
            log_level: get("RUST_LOG").unwrap_or(defaults.log_level),
            log_dir: get("OCRLABEL_LOG_DIR").map(PathBuf::from),
        }
    }
}
