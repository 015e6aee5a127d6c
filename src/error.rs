//! Error types for qrgen operations

use thiserror::Error;

/// Result type alias using qrgen's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown when the form is submitted without any text
pub const VALIDATION_MESSAGE: &str = "Please enter some text or URL to generate a QR code";

/// Message shown when the render service could not produce an image
pub const SERVICE_MESSAGE: &str = "Failed to generate QR code. Please try again.";

/// Message shown when saving a rendered image failed
pub const DOWNLOAD_MESSAGE: &str = "Failed to download QR code. Please try again.";

/// Main error type for qrgen operations
#[derive(Error, Debug)]
pub enum Error {
    /// Request rejected before reaching the network
    #[error("Validation error: {0}")]
    Validation(String),

    /// Render service unreachable or answered with a non-success status
    #[error("Render service error: {0}")]
    Service(String),

    /// Fetching or saving an image for download failed
    #[error("Download error: {0}")]
    Download(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Text suitable for showing to the person using the form.
    ///
    /// Service and download failures collapse to a generic retry hint; the
    /// detailed cause stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(_) => VALIDATION_MESSAGE.to_string(),
            Error::Service(_) => SERVICE_MESSAGE.to_string(),
            Error::Download(_) => DOWNLOAD_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::Config(format!("Invalid URL: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_hide_details() {
        let err = Error::Service("HTTP 500 from api".into());
        assert_eq!(err.user_message(), SERVICE_MESSAGE);

        let err = Error::Download("connection refused".into());
        assert_eq!(err.user_message(), DOWNLOAD_MESSAGE);

        let err = Error::Validation("blank".into());
        assert_eq!(err.user_message(), VALIDATION_MESSAGE);
    }

    #[test]
    fn config_errors_keep_their_text() {
        let err = Error::Config("bad theme".into());
        assert_eq!(err.user_message(), "Configuration error: bad theme");
    }
}
