//! Preview resources — in-memory object URLs with owned release.
//!
//! DESIGN
//! ======
//! `BlobStore` plays the role of the browser's object-URL table: `create`
//! registers markup and hands back an `ObjectUrl` guard. The guard revokes
//! its entry when dropped, so replacing, clearing, or tearing down a preview
//! releases the old resource exactly once on every path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

const URL_PREFIX: &str = "blob:artboard/";

#[derive(Default)]
struct BlobTable {
    entries: HashMap<Uuid, Blob>,
    created: u64,
    revoked: u64,
}

#[derive(Clone)]
struct Blob {
    mime: &'static str,
    data: Arc<str>,
}

/// Shared registry of live preview resources. Clones share the table.
#[derive(Clone, Default)]
pub struct BlobStore {
    inner: Arc<Mutex<BlobTable>>,
}

impl BlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `data` and return an owning handle.
    #[must_use]
    pub fn create(&self, mime: &'static str, data: impl Into<Arc<str>>) -> ObjectUrl {
        let id = Uuid::new_v4();
        let mut table = self.lock();
        table.entries.insert(id, Blob { mime, data: data.into() });
        table.created += 1;
        ObjectUrl { id, store: self.clone() }
    }

    /// Resolve a URL produced by [`ObjectUrl::url`].
    #[must_use]
    pub fn get(&self, url: &str) -> Option<(&'static str, Arc<str>)> {
        let id = Uuid::parse_str(url.strip_prefix(URL_PREFIX)?).ok()?;
        self.lock()
            .entries
            .get(&id)
            .map(|b| (b.mime, Arc::clone(&b.data)))
    }

    /// Number of resources currently registered.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.lock().entries.len()
    }

    /// Total resources ever created.
    #[must_use]
    pub fn created_count(&self) -> u64 {
        self.lock().created
    }

    /// Total resources released.
    #[must_use]
    pub fn revoked_count(&self) -> u64 {
        self.lock().revoked
    }

    fn revoke(&self, id: Uuid) {
        let mut table = self.lock();
        if table.entries.remove(&id).is_some() {
            table.revoked += 1;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BlobTable> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owning handle to one registered resource. Released on drop.
pub struct ObjectUrl {
    id: Uuid,
    store: BlobStore,
}

impl ObjectUrl {
    /// `blob:artboard/<uuid>` address of this resource.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{URL_PREFIX}{}", self.id)
    }

    /// The registered markup, while the handle is alive.
    #[must_use]
    pub fn data(&self) -> Option<Arc<str>> {
        self.store
            .lock()
            .entries
            .get(&self.id)
            .map(|b| Arc::clone(&b.data))
    }
}

impl std::fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.url()).finish()
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.store.revoke(self.id);
    }
}

#[cfg(test)]
#[path = "blob_test.rs"]
mod tests;
