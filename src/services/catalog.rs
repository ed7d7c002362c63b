//! Schematic loader — fills the store's detail slot after a selection.

use tracing::{info, warn};

use crate::api::SchematicSource;
use crate::state::ArtboardStore;

/// Select `id` and load its detail.
///
/// Returns `true` if the loaded detail was applied. A result for a
/// schematic that was deselected in the meantime is dropped by the store.
pub async fn select_and_load(store: &ArtboardStore, source: &dyn SchematicSource, id: Option<String>) -> bool {
    store.select_schematic(id.clone());
    match id {
        Some(id) => load(store, source, &id).await,
        None => false,
    }
}

/// Fetch detail for `id` and apply it, or record the failure.
pub async fn load(store: &ArtboardStore, source: &dyn SchematicSource, id: &str) -> bool {
    match source.schematic(id).await {
        Ok(detail) => {
            let vectors = detail.vectors.len();
            let applied = store.apply_schematic_detail(detail);
            info!(schematic_id = %id, vectors, applied, "schematic detail loaded");
            applied
        }
        Err(e) => {
            warn!(schematic_id = %id, code = e.error_code(), error = %e, "schematic detail load failed");
            store.fail_schematic_load(id);
            false
        }
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
