//! Preview render controller — last-request-wins rendering of the selection.
//!
//! DESIGN
//! ======
//! Each dispatch bumps a monotonic request counter and captures the new
//! value as its token. The render runs in a spawned task; when it finishes,
//! `commit` compares the token with the counter under the slot lock and
//! drops the result unless it is still the latest. Superseded tasks are also
//! aborted, but correctness only relies on the token check.
//!
//! RESOURCES
//! =========
//! The controller owns at most one `ObjectUrl`. Replacing, clearing, and
//! dropping the controller all release it. Render tasks and the store
//! watcher hold only a `Weak` reference, so dropping the controller ends the
//! session.
//!
//! ERROR HANDLING
//! ==============
//! Failures never escape: transport and format errors clear the preview and
//! are logged, stale results are discarded silently.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, warn};

use super::blob::{BlobStore, ObjectUrl};
use crate::api::RenderService;
use crate::api::markup::{MarkupSource, classify_render_response, ensure_markup, make_responsive};
use crate::api::types::{ApiError, RenderPayload};
use crate::state::{ArtboardStore, DesignSelection, RenderKey};

pub const PREVIEW_TITLE: &str = "Preview Title";
pub const PREVIEW_SUBTITLE: &str = "Preview Subtitle";
const SVG_MIME: &str = "image/svg+xml";

/// Status of the most recent render request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderState {
    /// Nothing requested, or the selection is incomplete.
    #[default]
    Idle,
    Pending,
    Ready,
    Failed,
}

/// Preview payload for `selection`, or `None` if it cannot be rendered.
#[must_use]
pub fn preview_payload(selection: &DesignSelection) -> Option<RenderPayload> {
    selection.render_payload(PREVIEW_TITLE, PREVIEW_SUBTITLE)
}

/// Run one render and reduce the response to display-ready markup.
///
/// # Errors
///
/// Returns the transport error from either request, or
/// [`ApiError::MissingMarkup`] if no SVG can be found.
pub async fn resolve_markup(service: &dyn RenderService, payload: &RenderPayload) -> Result<String, ApiError> {
    let body = service.render(payload).await?;
    let markup = match classify_render_response(&body)? {
        MarkupSource::Inline(markup) => markup,
        MarkupSource::Remote(url) => ensure_markup(&service.fetch_markup(&url).await?)?,
    };
    Ok(make_responsive(&markup))
}

// =============================================================================
// CONTROLLER
// =============================================================================

#[derive(Default)]
struct Slot {
    preview: Option<ObjectUrl>,
    in_flight: Option<AbortHandle>,
    last_key: Option<RenderKey>,
    state: RenderState,
}

struct Inner {
    service: Arc<dyn RenderService>,
    blobs: BlobStore,
    latest: AtomicU64,
    slot: Mutex<Slot>,
    watcher: Mutex<Option<AbortHandle>>,
}

/// Owns the preview for one configuration session.
#[derive(Clone)]
pub struct PreviewController {
    inner: Arc<Inner>,
}

impl PreviewController {
    #[must_use]
    pub fn new(service: Arc<dyn RenderService>, blobs: BlobStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                service,
                blobs,
                latest: AtomicU64::new(0),
                slot: Mutex::new(Slot::default()),
                watcher: Mutex::new(None),
            }),
        }
    }

    /// Issue a render for `selection` and return its request token.
    ///
    /// An incomplete selection clears the preview without a request. Either
    /// way any in-flight render becomes stale. Must be called from within a
    /// Tokio runtime.
    pub fn request_preview(&self, selection: &DesignSelection) -> u64 {
        let mut slot = self.inner.lock_slot();
        let token = self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1;
        slot.last_key = Some(selection.render_key());
        if let Some(previous) = slot.in_flight.take() {
            previous.abort();
        }

        let Some(payload) = preview_payload(selection) else {
            debug!(request_id = token, schematic_id = ?selection.schematic_id, "selection incomplete; preview cleared");
            slot.preview = None;
            slot.state = RenderState::Idle;
            return token;
        };

        debug!(request_id = token, schematic_url = %payload.schematic_url, "dispatching preview render");
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let service = Arc::clone(&self.inner.service);
        let task = tokio::spawn(async move {
            let outcome = resolve_markup(service.as_ref(), &payload).await;
            if let Some(inner) = weak.upgrade() {
                inner.commit(token, outcome);
            }
        });
        slot.in_flight = Some(task.abort_handle());
        slot.state = RenderState::Pending;
        token
    }

    /// Re-render only if the render-relevant fields changed since the last
    /// request. Returns the new token, if any.
    pub fn refresh(&self, selection: &DesignSelection) -> Option<u64> {
        let key = selection.render_key();
        if self.inner.lock_slot().last_key.as_ref() == Some(&key) {
            return None;
        }
        Some(self.request_preview(selection))
    }

    /// Apply a finished render. Returns `false` if `token` is stale.
    pub fn commit(&self, token: u64, outcome: Result<String, ApiError>) -> bool {
        self.inner.commit(token, outcome)
    }

    /// Follow `store`, refreshing the preview after every notification.
    ///
    /// The watcher ends, and the preview is torn down, when the store is
    /// dropped. Dropping the controller also stops it.
    pub fn watch(&self, store: &ArtboardStore) -> JoinHandle<()> {
        let mut rx = store.subscribe();
        let weak = Arc::downgrade(&self.inner);
        let initial = rx.borrow_and_update().clone();
        self.refresh(&initial);

        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let selection = rx.borrow_and_update().clone();
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                PreviewController { inner }.refresh(&selection);
            }
            if let Some(inner) = weak.upgrade() {
                inner.teardown();
            }
        });
        if let Some(previous) = self.inner.lock_watcher().replace(task.abort_handle()) {
            previous.abort();
        }
        task
    }

    /// Stop rendering and release the preview.
    pub fn teardown(&self) {
        if let Some(watcher) = self.inner.lock_watcher().take() {
            watcher.abort();
        }
        self.inner.teardown();
    }

    /// Address of the current preview resource.
    #[must_use]
    pub fn preview_url(&self) -> Option<String> {
        self.inner.lock_slot().preview.as_ref().map(ObjectUrl::url)
    }

    /// Markup of the current preview.
    #[must_use]
    pub fn preview_markup(&self) -> Option<Arc<str>> {
        self.inner
            .lock_slot()
            .preview
            .as_ref()
            .and_then(ObjectUrl::data)
    }

    #[must_use]
    pub fn has_preview(&self) -> bool {
        self.inner.lock_slot().preview.is_some()
    }

    #[must_use]
    pub fn state(&self) -> RenderState {
        self.inner.lock_slot().state
    }

    /// Token of the most recently issued request.
    #[must_use]
    pub fn latest_request_id(&self) -> u64 {
        self.inner.latest.load(Ordering::SeqCst)
    }
}

impl Inner {
    fn commit(&self, token: u64, outcome: Result<String, ApiError>) -> bool {
        let mut slot = self.lock_slot();
        if token != self.latest.load(Ordering::SeqCst) {
            return false;
        }
        slot.in_flight = None;
        // Release the old resource before registering its replacement.
        slot.preview = None;

        match outcome {
            Ok(markup) => {
                slot.preview = Some(self.blobs.create(SVG_MIME, markup));
                slot.state = RenderState::Ready;
                debug!(request_id = token, "preview ready");
            }
            Err(e) => {
                slot.state = RenderState::Failed;
                if e.is_transport() {
                    warn!(request_id = token, code = e.error_code(), error = %e, "preview render failed");
                } else {
                    debug!(request_id = token, code = e.error_code(), error = %e, "preview response unusable");
                }
            }
        }
        true
    }

    fn teardown(&self) {
        let mut slot = self.lock_slot();
        self.latest.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = slot.in_flight.take() {
            task.abort();
        }
        slot.preview = None;
        slot.last_key = None;
        slot.state = RenderState::Idle;
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_watcher(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.watcher.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(watcher) = self.lock_watcher().take() {
            watcher.abort();
        }
        if let Some(task) = self.lock_slot().in_flight.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "preview_test.rs"]
mod tests;
