use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One detected text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    pub text: String,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
}

/// External text recognition engine.
///
/// Regions come back in the engine's reading order. An image without text
/// yields an empty list, not an error.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Engine name, for logs.
    fn name(&self) -> &str;

    /// Recognize text in raw, encoded image bytes.
    async fn recognize_bytes(&self, image: &[u8]) -> Result<Vec<TextRegion>>;

    /// Recognize text in an image on disk.
    async fn recognize_path(&self, path: &Path) -> Result<Vec<TextRegion>>;
}

/// Join region texts with single spaces into the transcription shown to the
/// reviewer.
pub fn suggested_transcription(regions: &[TextRegion]) -> String {
    regions
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_in_reading_order() {
        let regions = vec![
            TextRegion { text: "INVOICE".into(), confidence: 0.98 },
            TextRegion { text: "No. 42".into(), confidence: 0.91 },
        ];
        assert_eq!(suggested_transcription(&regions), "INVOICE No. 42");
        assert_eq!(suggested_transcription(&[]), "");
    }
}
