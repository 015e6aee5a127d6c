//! qrgen - a client for remote QR code rendering services
//!
//! This library turns a piece of text, a size and an error correction level
//! into a request against an HTTP QR rendering service, shows the resulting
//! image and saves it under a filesystem-safe name.
//!
//! # Features
//!
//! - **Request building**: deterministic, percent-encoded render URLs
//! - **Single fetch**: the render request validates and captures the image
//! - **Downloads**: transient object URLs that are always revoked
//! - **Async-first**: Built on Tokio for non-blocking operations
//!
//! # Example
//!
//! ```no_run
//! use qrgen::{ErrorCorrection, GenerationRequest, QrClient, QrSize};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = QrClient::new()?;
//!     let request = GenerationRequest::new("https://example.com", QrSize::Medium, ErrorCorrection::M)?;
//!
//!     let qr = client.generate(&request).await?;
//!     println!("Rendered {} bytes from {}", qr.image.len(), qr.url);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod blob;
pub mod client;
pub mod config;
pub mod controller;
pub mod download;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod output;
pub mod qr;
pub mod theme;

// Re-exports for convenience
pub use error::{Error, Result};

pub use blob::{Blob, BlobStore, ObjectUrl};
pub use client::QrClient;
pub use config::{DownloadOptions, LogRotation, LoggingOptions, QrgenConfig, ServiceOptions, UiOptions};
pub use controller::{AppState, Controller, FormState};
pub use download::{DirectoryTarget, Downloader, SaveTarget, SavedFile, sanitize_filename};
pub use qr::{Endpoint, ErrorCorrection, GeneratedQr, GenerationRequest, QrSize};
pub use theme::Theme;
