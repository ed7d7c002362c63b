//! Drawscape API — render service, schematic catalog, and artboard creation.
//!
//! DESIGN
//! ======
//! Services depend on the narrow async traits below rather than on
//! `DrawscapeClient` directly, so tests can substitute in-memory fakes.
//! `DrawscapeClient` implements all three over HTTP.

pub mod client;
pub mod config;
pub mod markup;
pub mod types;

pub use client::DrawscapeClient;
pub use config::DrawscapeConfig;
use types::{ApiError, CreatedArtboard, RenderPayload, SchematicDetail};

// =============================================================================
// SERVICE TRAITS
// =============================================================================

/// Produces render markup for a payload.
#[async_trait::async_trait]
pub trait RenderService: Send + Sync {
    /// Request a render. The body is returned verbatim: raw markup or a JSON
    /// envelope, to be classified by [`markup::classify_render_response`].
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or status failure.
    async fn render(&self, payload: &RenderPayload) -> Result<String, ApiError>;

    /// Fetch markup referenced by an envelope's `svg_url`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or status failure.
    async fn fetch_markup(&self, url: &str) -> Result<String, ApiError>;
}

/// Loads schematic detail records.
#[async_trait::async_trait]
pub trait SchematicSource: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the schematic cannot be fetched or decoded.
    async fn schematic(&self, id: &str) -> Result<SchematicDetail, ApiError>;
}

/// Persists a finalized configuration as an artboard.
#[async_trait::async_trait]
pub trait ArtboardCreator: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the backend rejects or cannot be reached.
    async fn create_artboard(&self, payload: &RenderPayload) -> Result<CreatedArtboard, ApiError>;
}

#[async_trait::async_trait]
impl RenderService for DrawscapeClient {
    async fn render(&self, payload: &RenderPayload) -> Result<String, ApiError> {
        self.render_text(payload).await
    }

    async fn fetch_markup(&self, url: &str) -> Result<String, ApiError> {
        self.get_text(url).await
    }
}

#[async_trait::async_trait]
impl SchematicSource for DrawscapeClient {
    async fn schematic(&self, id: &str) -> Result<SchematicDetail, ApiError> {
        DrawscapeClient::schematic(self, id).await
    }
}

#[async_trait::async_trait]
impl ArtboardCreator for DrawscapeClient {
    async fn create_artboard(&self, payload: &RenderPayload) -> Result<CreatedArtboard, ApiError> {
        DrawscapeClient::create_artboard(self, payload).await
    }
}
