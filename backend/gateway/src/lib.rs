//! HTTP API for the OCR labeling service.
//!
//! Thin handlers over [`ocrlabel_core::LabelingService`], plus static serving
//! of the catalog directory under `/images`.

pub mod api;
pub mod error;
pub mod forms;
pub mod schema;
pub mod server;

pub use api::AppState;
pub use error::{ApiError, ApiResult};
pub use server::{build_router, cors_layer, start_server};
