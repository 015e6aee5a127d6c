//! Saving rendered QR images
//!
//! The download path mirrors what a browser does with an anchor click: fetch
//! the image, publish it under a transient object URL, let the host save
//! capability persist it, then revoke the URL again.

use crate::blob::{Blob, BlobStore};
use crate::client::{QrClient, is_binary_content_type};
use crate::error::{Error, Result};
use crate::qr::GeneratedQr;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Filename used when there is no text to derive one from
pub const DEFAULT_FILENAME: &str = "qrcode.png";

const FILENAME_SOURCE_CHARS: usize = 20;

/// Derive a filesystem-safe filename from the encoded text.
///
/// Takes the first 20 characters and replaces each one outside
/// `[A-Za-z0-9]` with a single underscore.
pub fn sanitize_filename(text: &str) -> String {
    if text.is_empty() {
        return DEFAULT_FILENAME.to_string();
    }

    let stem: String = text
        .chars()
        .take(FILENAME_SOURCE_CHARS)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("qrcode-{stem}.png")
}

/// Host capability that persists content published under an object URL
#[async_trait]
pub trait SaveTarget: Send + Sync {
    /// Persist the content behind `object_url` under `filename`.
    ///
    /// The URL is only valid for the duration of this call.
    async fn save(&self, store: &BlobStore, object_url: &str, filename: &str) -> Result<PathBuf>;
}

/// Saves files into a fixed directory
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    /// Save into `dir`, creating it on first use
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SaveTarget for DirectoryTarget {
    async fn save(&self, store: &BlobStore, object_url: &str, filename: &str) -> Result<PathBuf> {
        let blob = store
            .resolve(object_url)
            .ok_or_else(|| Error::Download(format!("object URL {object_url} is not live")))?;

        let name = Path::new(filename)
            .file_name()
            .filter(|name| **name == *filename)
            .ok_or_else(|| {
                Error::Download(format!("refusing to save to non-plain filename '{filename}'"))
            })?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, &blob.bytes).await?;

        debug!(path = %path.display(), bytes = blob.bytes.len(), "Image written");
        Ok(path)
    }
}

/// Outcome of a completed download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Where the save target put the file
    pub path: PathBuf,
    /// Number of bytes written
    pub byte_length: usize,
    /// Media type of the saved content
    pub content_type: String,
}

/// Fetches images and hands them to a [`SaveTarget`]
#[derive(Clone)]
pub struct Downloader {
    client: QrClient,
    store: BlobStore,
    target: Arc<dyn SaveTarget>,
}

impl Downloader {
    /// Create a downloader with its own object URL registry
    pub fn new(client: QrClient, target: Arc<dyn SaveTarget>) -> Self {
        Self {
            client,
            store: BlobStore::new(),
            target,
        }
    }

    /// Registry backing this downloader's object URLs
    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    /// Fetch `url` and save it as `filename`.
    ///
    /// When the fetch fails no object URL is created and the save target is
    /// never called.
    pub async fn download(&self, url: &str, filename: &str) -> Result<SavedFile> {
        let fetched = self.client.fetch_image(url).await?;
        info!(url, bytes = fetched.bytes.len(), "Fetched image for download");
        self.save_bytes(fetched.bytes, fetched.content_type.as_deref(), filename)
            .await
    }

    /// Save the bytes captured when `qr` was generated, without refetching.
    pub async fn save_rendered(&self, qr: &GeneratedQr, filename: &str) -> Result<SavedFile> {
        if qr.image.is_empty() {
            return Err(Error::Download("rendered image is empty".to_string()));
        }
        if let Some(kind) = qr.content_type.as_deref() {
            if !is_binary_content_type(kind) {
                return Err(Error::Download(format!(
                    "rendered content is not binary ({kind})"
                )));
            }
        }
        self.save_bytes(qr.image.clone(), qr.content_type.as_deref(), filename)
            .await
    }

    async fn save_bytes(
        &self,
        bytes: Bytes,
        content_type: Option<&str>,
        filename: &str,
    ) -> Result<SavedFile> {
        let blob = Blob::new(bytes, content_type);
        let byte_length = blob.bytes.len();
        let content_type = blob.content_type.clone();

        let object_url = self.store.create_object_url(blob);
        let result = self
            .target
            .save(&self.store, object_url.as_str(), filename)
            .await;
        object_url.revoke();

        let path = result.map_err(|err| match err {
            Error::Download(_) => err,
            other => Error::Download(format!("save failed: {other}")),
        })?;

        info!(path = %path.display(), byte_length, "QR image saved");
        Ok(SavedFile {
            path,
            byte_length,
            content_type,
        })
    }
}
