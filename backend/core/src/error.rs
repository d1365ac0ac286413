use thiserror::Error;

/// Error type shared by the catalog, ledger and labeling service.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("OCR processing failed: {0}")]
    Recognition(String),

    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl LabelError {
    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// Short machine-readable name of the failure class, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Recognition(_) => "upstream_failure",
            Self::Storage { .. } => "storage_failure",
        }
    }
}

pub type LabelResult<T> = std::result::Result<T, LabelError>;
