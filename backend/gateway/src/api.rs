use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    Json,
};
use bytes::Bytes;
use logging::{EventLogger, LabelEvent};
use ocrlabel_core::{LabelError, LabelingService, NextImage, Recognition};
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::schema::{
    DetailedResult, ImagesResponse, LabelsResponse, NextImageResponse, OcrFileQuery, OcrResponse,
    SaveLabelForm, SaveLabelResponse, ServiceInfo,
};

/// Shared application state for API handlers.
pub struct AppState {
    pub service: LabelingService,
}

/// Log a failed operation and turn it into a response.
fn failed(operation: &str, image_name: Option<&str>, err: LabelError) -> ApiError {
    error!(
        operation,
        image_name = image_name.unwrap_or(""),
        kind = err.kind(),
        error = %err,
        "Request failed"
    );
    EventLogger::log_event(LabelEvent::OperationFailed {
        operation: operation.to_string(),
        image_name: image_name.map(str::to_string),
        kind: err.kind().to_string(),
        error_msg: err.to_string(),
    });
    ApiError(err)
}

fn ocr_response(recognition: Recognition, image_name: Option<String>) -> OcrResponse {
    OcrResponse {
        extracted_text: recognition.extracted_text,
        detailed_results: recognition
            .regions
            .into_iter()
            .map(DetailedResult::from)
            .collect(),
        success: true,
        image_name,
    }
}

/// `GET /` — service identity.
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "OCR Labeling API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/images` — catalog listing with progress counts.
pub async fn list_images(State(state): State<Arc<AppState>>) -> ApiResult<Json<ImagesResponse>> {
    let progress = state
        .service
        .overview()
        .await
        .map_err(|e| failed("list_images", None, e))?;

    Ok(Json(ImagesResponse {
        total_images: progress.total(),
        processed_images: progress.processed_count,
        remaining_images: progress.remaining(),
        images: progress.images,
        processed: progress.processed,
    }))
}

/// `GET /api/images/next` — first image without a label.
pub async fn next_image(State(state): State<Arc<AppState>>) -> ApiResult<Json<NextImageResponse>> {
    let next = state
        .service
        .next_image()
        .await
        .map_err(|e| failed("next_image", None, e))?;

    Ok(Json(match next {
        NextImage::Pending {
            image_name,
            total,
            processed,
        } => NextImageResponse::Pending {
            image_url: format!("/images/{image_name}"),
            image_name,
            total_images: total,
            processed_images: processed,
        },
        NextImage::Exhausted { total, processed } => NextImageResponse::Exhausted {
            message: "All images have been processed".to_string(),
            total_images: total,
            processed_images: processed,
        },
    }))
}

/// `POST /api/ocr` — recognize text in an uploaded image (`file` field).
pub async fn recognize_upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<OcrResponse>> {
    let (content_type, data) = read_upload(multipart)
        .await
        .map_err(|e| failed("recognize_upload", None, e))?;

    let recognition = state
        .service
        .recognize_upload(content_type.as_deref(), &data)
        .await
        .map_err(|e| failed("recognize_upload", None, e))?;

    EventLogger::log_event(LabelEvent::TextRecognized {
        image_name: None,
        regions: recognition.regions.len(),
    });
    Ok(Json(ocr_response(recognition, None)))
}

fn invalid_upload(err: impl std::fmt::Display) -> LabelError {
    LabelError::Validation(format!("Invalid upload: {err}"))
}

async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(Option<String>, Bytes), LabelError> {
    let mut multipart = multipart.map_err(invalid_upload)?;
    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(invalid_upload)?;
        return Ok((content_type, data));
    }
    Err(LabelError::Validation("No file uploaded".into()))
}

/// `POST /api/ocr/file?image_name=...` — recognize text in a catalog image.
pub async fn recognize_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OcrFileQuery>,
) -> ApiResult<Json<OcrResponse>> {
    let image_name = query
        .image_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            failed(
                "recognize_file",
                None,
                LabelError::Validation("image_name is required".into()),
            )
        })?;

    let recognition = state
        .service
        .recognize_file(&image_name)
        .await
        .map_err(|e| failed("recognize_file", Some(&image_name), e))?;

    EventLogger::log_event(LabelEvent::TextRecognized {
        image_name: Some(image_name.clone()),
        regions: recognition.regions.len(),
    });
    Ok(Json(ocr_response(recognition, Some(image_name))))
}

/// `POST /api/save` — append a corrected label to the ledger.
pub async fn save_label(
    State(state): State<Arc<AppState>>,
    form: SaveLabelForm,
) -> ApiResult<Json<SaveLabelResponse>> {
    let entry = state
        .service
        .save_label(&form.image_name, &form.corrected_text)
        .await
        .map_err(|e| failed("save_label", Some(&form.image_name), e))?;

    EventLogger::log_event(LabelEvent::LabelSaved {
        image_name: entry.image_name.clone(),
        text: entry.text.clone(),
    });
    info!(image_name = %entry.image_name, "Label saved");

    Ok(Json(SaveLabelResponse {
        success: true,
        message: format!("Label saved for {}", entry.image_name),
        image_name: entry.image_name,
        saved_text: entry.text,
    }))
}

/// `GET /api/labels` — the full ledger in file order.
pub async fn list_labels(State(state): State<Arc<AppState>>) -> ApiResult<Json<LabelsResponse>> {
    let labels = state
        .service
        .labels()
        .await
        .map_err(|e| failed("list_labels", None, e))?;

    Ok(Json(LabelsResponse {
        count: labels.len(),
        labels,
    }))
}
