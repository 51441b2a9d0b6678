use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Source image is required for img2img and inpainting")]
    MissingSourceImage,
    #[error("Mask image is required for inpainting")]
    MissingMaskImage,
    /// Non-2xx response or transport failure. `message` is the server text
    /// when one was returned.
    #[error("{message}")]
    NetworkFailure {
        status: Option<u16>,
        message: String,
    },
    #[error("{0}")]
    UnknownFailure(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Image error: {0}")]
    ImageError(String),
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StudioError {
    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        StudioError::NetworkFailure {
            status,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StudioError::MissingSourceImage | StudioError::MissingMaskImage
        )
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(e: reqwest::Error) -> Self {
        StudioError::network(e.status().map(|s| s.as_u16()), e.to_string())
    }
}

impl From<image::ImageError> for StudioError {
    fn from(e: image::ImageError) -> Self {
        StudioError::ImageError(e.to_string())
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(e: serde_json::Error) -> Self {
        StudioError::SerializationError(e.to_string())
    }
}

impl From<base64::DecodeError> for StudioError {
    fn from(e: base64::DecodeError) -> Self {
        StudioError::InvalidDataUrl(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_failure_message_is_verbatim() {
        let err = StudioError::network(Some(500), "model overloaded");
        assert_eq!(err.to_string(), "model overloaded");
    }

    #[test]
    fn test_validation_kinds() {
        assert!(StudioError::MissingSourceImage.is_validation());
        assert!(StudioError::MissingMaskImage.is_validation());
        assert!(!StudioError::UnknownFailure("x".into()).is_validation());
    }
}
