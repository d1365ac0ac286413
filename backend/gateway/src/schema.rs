//! Request and response bodies for every endpoint.

use serde::{Deserialize, Serialize};

use ocrlabel_core::{LabelEntry, TextRegion};

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImagesResponse {
    pub total_images: usize,
    pub processed_images: usize,
    pub remaining_images: usize,
    pub images: Vec<String>,
    pub processed: Vec<String>,
}

/// `GET /api/images/next` answers with one of two shapes.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NextImageResponse {
    Pending {
        image_name: String,
        image_url: String,
        total_images: usize,
        processed_images: usize,
    },
    Exhausted {
        message: String,
        total_images: usize,
        processed_images: usize,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetailedResult {
    pub text: String,
    pub confidence: f32,
}

impl From<TextRegion> for DetailedResult {
    fn from(region: TextRegion) -> Self {
        Self {
            text: region.text,
            confidence: region.confidence,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OcrResponse {
    pub extracted_text: String,
    pub detailed_results: Vec<DetailedResult>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OcrFileQuery {
    #[serde(default)]
    pub image_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaveLabelForm {
    #[serde(default)]
    pub image_name: String,
    #[serde(default)]
    pub corrected_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveLabelResponse {
    pub success: bool,
    pub message: String,
    pub image_name: String,
    pub saved_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LabelsResponse {
    pub labels: Vec<LabelEntry>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
