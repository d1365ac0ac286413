//! The labeling service: catalog, ledger and recognizer behind one handle.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::catalog::ImageCatalog;
use crate::error::{LabelError, LabelResult};
use crate::ledger::{LabelEntry, LabelLedger};
use crate::recognition::{suggested_transcription, Recognizer, TextRegion};
use crate::tracker::{NextImage, Progress, ProgressTracker};

/// Output of one recognition pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recognition {
    pub extracted_text: String,
    pub regions: Vec<TextRegion>,
}

impl Recognition {
    fn from_regions(regions: Vec<TextRegion>) -> Self {
        Self {
            extracted_text: suggested_transcription(&regions),
            regions,
        }
    }
}

pub struct LabelingService {
    catalog: ImageCatalog,
    ledger: LabelLedger,
    recognizer: Arc<dyn Recognizer>,
}

impl LabelingService {
    pub fn new(catalog: ImageCatalog, ledger: LabelLedger, recognizer: Arc<dyn Recognizer>) -> Self {
        Self {
            catalog,
            ledger,
            recognizer,
        }
    }

    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &LabelLedger {
        &self.ledger
    }

    fn tracker(&self) -> ProgressTracker<'_> {
        ProgressTracker::new(&self.catalog, &self.ledger)
    }

    pub async fn overview(&self) -> LabelResult<Progress> {
        self.tracker().progress().await
    }

    /// Next image to label. An empty catalog is reported as not found.
    pub async fn next_image(&self) -> LabelResult<NextImage> {
        self.tracker()
            .next_unprocessed()
            .await?
            .ok_or_else(|| LabelError::NotFound("No images found".into()))
    }

    /// Run recognition on uploaded bytes. `content_type` must be an image type.
    pub async fn recognize_upload(
        &self,
        content_type: Option<&str>,
        image: &[u8],
    ) -> LabelResult<Recognition> {
        if !content_type.is_some_and(|ct| ct.starts_with("image/")) {
            return Err(LabelError::Validation("File must be an image".into()));
        }

        let regions = self.recognizer.recognize_bytes(image).await.map_err(|e| {
            error!(
                engine = self.recognizer.name(),
                bytes = image.len(),
                error = %e,
                "Recognition failed for uploaded image"
            );
            LabelError::Recognition(e.to_string())
        })?;

        info!(regions = regions.len(), "Recognized uploaded image");
        Ok(Recognition::from_regions(regions))
    }

    /// Run recognition on an image already in the catalog.
    pub async fn recognize_file(&self, image_name: &str) -> LabelResult<Recognition> {
        let path = self
            .catalog
            .resolve(image_name)
            .await
            .ok_or_else(|| LabelError::NotFound("Image not found".into()))?;

        let regions = self.recognizer.recognize_path(&path).await.map_err(|e| {
            error!(
                engine = self.recognizer.name(),
                image_name = %image_name,
                error = %e,
                "Recognition failed"
            );
            LabelError::Recognition(e.to_string())
        })?;

        info!(image_name = %image_name, regions = regions.len(), "Recognized catalog image");
        Ok(Recognition::from_regions(regions))
    }

    /// Validate and append a corrected label.
    pub async fn save_label(&self, image_name: &str, corrected_text: &str) -> LabelResult<LabelEntry> {
        if image_name.is_empty() || corrected_text.is_empty() {
            return Err(LabelError::Validation(
                "Both image_name and corrected_text are required".into(),
            ));
        }
        if !self.catalog.contains(image_name).await {
            return Err(LabelError::NotFound("Image not found".into()));
        }

        let entry = self.ledger.append(image_name, corrected_text).await?;
        info!(image_name = %entry.image_name, text = %entry.text, "Saved label");
        Ok(entry)
    }

    /// Every ledger entry in file order, duplicates included.
    pub async fn labels(&self) -> LabelResult<Vec<LabelEntry>> {
        self.ledger.read_all().await
    }
}
