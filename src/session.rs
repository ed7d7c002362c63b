//! One artboard configuration session.
//!
//! DESIGN
//! ======
//! `ArtboardSession` wires the pieces together the way a product page does:
//! a store seeded from config, a preview controller watching it, and the
//! Drawscape client behind every service trait. Dropping the session tears
//! the preview down and releases its resource.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::api::types::{ApiError, SchematicSummary};
use crate::api::{DrawscapeClient, DrawscapeConfig, RenderService};
use crate::services::blob::BlobStore;
use crate::services::catalog;
use crate::services::checkout::{self, CheckoutError, LineItemAttribute};
use crate::services::legend::LegendEditor;
use crate::services::preview::PreviewController;
use crate::state::{ArtboardStore, DesignSelection};
use crate::widgets::{PreviewDisplay, preview_display};

pub struct ArtboardSession {
    pub store: ArtboardStore,
    pub preview: PreviewController,
    pub blobs: BlobStore,
    client: Arc<DrawscapeClient>,
    watcher: JoinHandle<()>,
}

impl ArtboardSession {
    /// Start a session against the configured Drawscape service.
    ///
    /// Must be called from within a Tokio runtime. If the config names a
    /// default schematic its detail load is started in the background.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails.
    pub fn start(config: &DrawscapeConfig) -> Result<Self, ApiError> {
        let client = Arc::new(DrawscapeClient::new(config)?);
        let store = ArtboardStore::new(DesignSelection::seeded(config.default_schematic.clone()));
        let blobs = BlobStore::new();
        let service: Arc<dyn RenderService> = client.clone();
        let preview = PreviewController::new(service, blobs.clone());
        let watcher = preview.watch(&store);

        if let Some(id) = config.default_schematic.clone() {
            let store = store.clone();
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                catalog::load(&store, &*client, &id).await;
            });
        }

        info!(base_url = %config.base_url, default_schematic = ?config.default_schematic, "artboard session started");
        Ok(Self { store, preview, blobs, client, watcher })
    }

    /// Catalog listing for the schematic picker.
    ///
    /// # Errors
    ///
    /// Returns the client error if the listing cannot be fetched.
    pub async fn schematics(&self) -> Result<Vec<SchematicSummary>, ApiError> {
        self.client.schematics().await
    }

    /// Select a schematic and load its vectors and color schemes.
    pub async fn select_schematic(&self, id: Option<String>) -> bool {
        catalog::select_and_load(&self.store, &*self.client, id).await
    }

    #[must_use]
    pub fn legend_editor(&self) -> LegendEditor {
        LegendEditor::new(self.store.clone())
    }

    #[must_use]
    pub fn display(&self) -> PreviewDisplay {
        let url = self.preview.preview_url();
        self.store.read(|s| preview_display(s, url))
    }

    /// Stage the current design and exchange it for artboard attributes.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] if the design is incomplete or the
    /// artboard cannot be created.
    pub async fn add_to_cart(
        &self,
        attributes: Vec<LineItemAttribute>,
    ) -> Result<Vec<LineItemAttribute>, CheckoutError> {
        let staged = checkout::stage_line_item(&self.store.snapshot())?;
        let mut line = attributes;
        line.push(staged);
        checkout::finalize_line_item(&line, &*self.client).await
    }
}

impl Drop for ArtboardSession {
    fn drop(&mut self) {
        self.watcher.abort();
        self.preview.teardown();
    }
}
