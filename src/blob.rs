//! Transient object URLs for in-memory image data
//!
//! A [`BlobStore`] hands out `blob:qrgen/<uuid>` references to byte buffers so
//! that a save target can resolve content by URL. Every reference is owned by
//! an [`ObjectUrl`] guard and revoked when the guard drops.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const SCHEME_PREFIX: &str = "blob:qrgen/";

/// Immutable binary content with its media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Raw bytes
    pub bytes: Bytes,
    /// Media type, `application/octet-stream` when unknown
    pub content_type: String,
}

impl Blob {
    /// Wrap bytes, falling back to `application/octet-stream`
    pub fn new(bytes: Bytes, content_type: Option<&str>) -> Self {
        Self {
            bytes,
            content_type: content_type
                .unwrap_or("application/octet-stream")
                .to_string(),
        }
    }
}

/// Registry of live object URLs
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    entries: Arc<Mutex<HashMap<Uuid, Blob>>>,
    issued: Arc<AtomicUsize>,
}

impl BlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `blob` and return the guard owning its URL.
    pub fn create_object_url(&self, blob: Blob) -> ObjectUrl {
        let id = Uuid::new_v4();
        self.entries
            .lock()
            .expect("blob store mutex poisoned")
            .insert(id, blob);
        self.issued.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(%id, "Object URL created");

        ObjectUrl {
            id,
            url: format!("{SCHEME_PREFIX}{id}"),
            store: self.clone(),
        }
    }

    /// Look up the content behind a live object URL
    pub fn resolve(&self, url: &str) -> Option<Blob> {
        let id = url
            .strip_prefix(SCHEME_PREFIX)
            .and_then(|raw| Uuid::parse_str(raw).ok())?;
        self.entries
            .lock()
            .expect("blob store mutex poisoned")
            .get(&id)
            .cloned()
    }

    /// Number of object URLs not yet revoked
    pub fn live_count(&self) -> usize {
        self.entries
            .lock()
            .expect("blob store mutex poisoned")
            .len()
    }

    /// Number of object URLs ever created by this store
    pub fn issued_count(&self) -> usize {
        self.issued.load(Ordering::Relaxed)
    }

    fn revoke(&self, id: &Uuid) {
        let removed = self
            .entries
            .lock()
            .expect("blob store mutex poisoned")
            .remove(id);
        if removed.is_some() {
            tracing::trace!(%id, "Object URL revoked");
        }
    }
}

/// Owning handle for one object URL; revokes it on drop
#[derive(Debug)]
pub struct ObjectUrl {
    id: Uuid,
    url: String,
    store: BlobStore,
}

impl ObjectUrl {
    /// The `blob:` URL string
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Revoke now instead of at end of scope
    pub fn revoke(self) {
        drop(self);
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.store.revoke(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_lifecycle() {
        let store = BlobStore::new();
        let guard = store.create_object_url(Blob::new(Bytes::from_static(b"png"), Some("image/png")));

        assert!(guard.as_str().starts_with("blob:qrgen/"));
        assert_eq!(store.live_count(), 1);

        let blob = store.resolve(guard.as_str()).unwrap();
        assert_eq!(blob.bytes.as_ref(), b"png");
        assert_eq!(blob.content_type, "image/png");

        let url = guard.as_str().to_string();
        guard.revoke();
        assert_eq!(store.live_count(), 0);
        assert!(store.resolve(&url).is_none());
    }

    #[test]
    fn test_guard_revokes_on_drop() {
        let store = BlobStore::new();
        {
            let _a = store.create_object_url(Blob::new(Bytes::new(), None));
            let _b = store.create_object_url(Blob::new(Bytes::new(), None));
            assert_eq!(store.live_count(), 2);
        }
        assert_eq!(store.live_count(), 0);
        assert_eq!(store.issued_count(), 2);
    }

    #[test]
    fn test_resolve_rejects_foreign_urls() {
        let store = BlobStore::new();
        assert!(store.resolve("https://example.com/x.png").is_none());
        assert!(store.resolve("blob:qrgen/not-a-uuid").is_none());
    }

    #[test]
    fn test_default_content_type() {
        let blob = Blob::new(Bytes::from_static(b"x"), None);
        assert_eq!(blob.content_type, "application/octet-stream");
    }
}
