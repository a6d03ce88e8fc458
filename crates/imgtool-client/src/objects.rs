//! Local object URLs for binary results.
//!
//! A binary capability result is parked in an [`ObjectStore`] and handed back
//! as an [`ObjectUrl`]. The URL stays resolvable until the caller revokes it;
//! nothing is released implicitly, so long-running callers must revoke URLs
//! they no longer display.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

const URL_PREFIX: &str = "blob:image-toolbox/";

/// Binary payload with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Bytes,
    pub content_type: String,
}

impl Blob {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Handle to a blob held by an [`ObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    fn generate() -> Self {
        Self(format!("{}{}", URL_PREFIX, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Shared registry of live object URLs. Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    objects: Arc<RwLock<HashMap<ObjectUrl, Blob>>>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob under a fresh URL.
    pub fn create(&self, blob: Blob) -> ObjectUrl {
        let url = ObjectUrl::generate();
        debug!(url = %url, bytes = blob.len(), content_type = %blob.content_type, "Created object URL");

        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone(), blob);
        url
    }

    /// Resolve a URL. Returns `None` once it has been revoked.
    pub fn get(&self, url: &ObjectUrl) -> Option<Blob> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    /// Release a URL. Returns `false` if it was not live.
    pub fn revoke(&self, url: &ObjectUrl) -> bool {
        let removed = self
            .objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url)
            .is_some();

        if removed {
            debug!(url = %url, "Revoked object URL");
        }
        removed
    }

    /// Number of live URLs.
    pub fn len(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
