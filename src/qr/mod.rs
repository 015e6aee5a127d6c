//! QR generation requests and results
//!
//! The symbols themselves are rendered by a remote service; this module only
//! models what is asked for and what comes back, and builds the request URL.

mod request;

pub use request::{DEFAULT_BASE_URL, Endpoint};

use crate::error::{Error, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendered image size offered by the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrSize {
    /// 200x200 pixels
    Small,
    /// 300x300 pixels
    #[default]
    Medium,
    /// 400x400 pixels
    Large,
}

impl QrSize {
    /// All sizes in display order
    pub const ALL: [QrSize; 3] = [QrSize::Small, QrSize::Medium, QrSize::Large];

    /// Edge length in pixels requested from the render service
    pub fn dimension(self) -> u32 {
        match self {
            QrSize::Small => 200,
            QrSize::Medium => 300,
            QrSize::Large => 400,
        }
    }

    /// Identifier used in config files and on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            QrSize::Small => "small",
            QrSize::Medium => "medium",
            QrSize::Large => "large",
        }
    }

    /// Human-readable label, e.g. `Medium (300x300)`
    pub fn label(self) -> String {
        let dim = self.dimension();
        let name = match self {
            QrSize::Small => "Small",
            QrSize::Medium => "Medium",
            QrSize::Large => "Large",
        };
        format!("{name} ({dim}x{dim})")
    }
}

impl fmt::Display for QrSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QrSize {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(QrSize::Small),
            "medium" => Ok(QrSize::Medium),
            "large" => Ok(QrSize::Large),
            other => Err(format!(
                "Unsupported size '{other}', expected small, medium or large"
            )),
        }
    }
}

/// QR error correction level forwarded to the render service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCorrection {
    /// Recovers roughly 7% of damaged codewords
    L,
    /// Recovers roughly 15%
    #[default]
    M,
    /// Recovers roughly 25%
    Q,
    /// Recovers roughly 30%
    H,
}

impl ErrorCorrection {
    /// All levels from lowest to highest redundancy
    pub const ALL: [ErrorCorrection; 4] = [
        ErrorCorrection::L,
        ErrorCorrection::M,
        ErrorCorrection::Q,
        ErrorCorrection::H,
    ];

    /// Single-letter code sent as the `ecc` query parameter
    pub fn code(self) -> &'static str {
        match self {
            ErrorCorrection::L => "L",
            ErrorCorrection::M => "M",
            ErrorCorrection::Q => "Q",
            ErrorCorrection::H => "H",
        }
    }

    /// Human-readable label, e.g. `Quartile (25%)`
    pub fn label(self) -> &'static str {
        match self {
            ErrorCorrection::L => "Low (7%)",
            ErrorCorrection::M => "Medium (15%)",
            ErrorCorrection::Q => "Quartile (25%)",
            ErrorCorrection::H => "High (30%)",
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(ErrorCorrection::L),
            "M" | "MEDIUM" => Ok(ErrorCorrection::M),
            "Q" | "QUARTILE" => Ok(ErrorCorrection::Q),
            "H" | "HIGH" => Ok(ErrorCorrection::H),
            other => Err(format!(
                "Unsupported error correction level '{other}', expected L, M, Q or H"
            )),
        }
    }
}

/// A validated request for one rendered QR image.
///
/// Built fresh for every generate action and consumed by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    text: String,
    size: QrSize,
    error_correction: ErrorCorrection,
}

impl GenerationRequest {
    /// Validate and build a request. Blank or whitespace-only text is rejected.
    ///
    /// The text is kept exactly as typed; trimming only decides emptiness.
    pub fn new(
        text: impl Into<String>,
        size: QrSize,
        error_correction: ErrorCorrection,
    ) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::Validation(
                "text must contain at least one non-whitespace character".to_string(),
            ));
        }

        Ok(Self {
            text,
            size,
            error_correction,
        })
    }

    /// Text to encode
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Requested image size
    pub fn size(&self) -> QrSize {
        self.size
    }

    /// Requested error correction level
    pub fn error_correction(&self) -> ErrorCorrection {
        self.error_correction
    }
}

/// A QR image rendered by the remote service.
///
/// `url` is what the service was asked for and stays valid only as long as
/// the service keeps answering it. `image` holds the bytes returned by that
/// same request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQr {
    /// Request URL against the render service
    pub url: String,
    /// Text the image encodes
    pub text: String,
    /// Size that was requested
    pub size: QrSize,
    /// Error correction level that was requested
    pub error_correction: ErrorCorrection,
    /// Raw image body as returned by the service
    pub image: Bytes,
    /// `Content-Type` reported by the service, if any
    pub content_type: Option<String>,
}

impl GeneratedQr {
    /// Suggested filename derived from the encoded text
    pub fn suggested_filename(&self) -> String {
        crate::download::sanitize_filename(&self.text)
    }
}
