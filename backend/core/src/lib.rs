//! Core of the OCR labeling service.
//!
//! - [`ImageCatalog`]: supported images in one directory, natural order
//! - [`LabelLedger`]: append-only `<image> <text>` log
//! - [`ProgressTracker`]: processed / unprocessed views over both
//! - [`Recognizer`]: the external OCR engine seam
//! - [`LabelingService`]: the handle request handlers work through

pub mod catalog;
pub mod error;
pub mod ledger;
pub mod natural;
pub mod recognition;
pub mod service;
pub mod tracker;

pub use catalog::{has_image_extension, ImageCatalog, IMAGE_EXTENSIONS};
pub use error::{LabelError, LabelResult};
pub use ledger::{normalize_text, LabelEntry, LabelLedger};
pub use natural::{natural_cmp, natural_sort};
pub use recognition::{suggested_transcription, Recognizer, TextRegion};
pub use service::{LabelingService, Recognition};
pub use tracker::{NextImage, Progress, ProgressTracker};
