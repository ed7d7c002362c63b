//! Artboard — design selection, live preview, and checkout staging for
//! custom blueprint artboards rendered by the Drawscape service.
//!
//! ARCHITECTURE
//! ============
//! - `api`: Drawscape HTTP client, config, wire types, markup handling
//! - `state`: `DesignSelection` and the observable `ArtboardStore`
//! - `services`: preview controller, legend editor, catalog, checkout
//! - `widgets`: picker/text-field bindings and preview placeholder state
//! - `session`: everything above wired for one product page

pub mod api;
pub mod services;
pub mod session;
pub mod state;
pub mod widgets;

pub use api::types::{ApiError, ColorScheme, LegendItem, Orientation, RenderPayload, SchematicDetail, Vector};
pub use api::{DrawscapeClient, DrawscapeConfig};
pub use services::preview::PreviewController;
pub use session::ArtboardSession;
pub use state::{ArtboardStore, DesignSelection, LoadStatus};
