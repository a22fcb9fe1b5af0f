use thiserror::Error;

/// Errors that can occur while saving or loading projects, settings and images
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize project: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to access file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to encode or decode image: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid project data: {0}")]
    InvalidProject(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Why a single shape record could not be imported
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Malformed shape record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid color {0:?}, expected #AARRGGBB")]
    InvalidColor(String),

    #[error("Invalid raster payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Invalid raster image: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error("Invalid raster size: {0}")]
    InvalidGeometry(String),
}
