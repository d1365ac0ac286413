//! Media helpers for the labeling service: image MIME detection, the
//! `/images` file router and the external OCR command bridge.

pub mod image_server;
pub mod mime_detect;
pub mod ocr_bridge;

pub use image_server::image_router;
pub use mime_detect::{detect_mime_type, is_image, is_inline_safe};
pub use ocr_bridge::{parse_regions, OcrBridge};
