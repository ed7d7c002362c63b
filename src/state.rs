//! Artboard design selection and its observable store.
//!
//! DESIGN
//! ======
//! `DesignSelection` is the single source of truth for one configuration
//! session. `ArtboardStore` wraps it in a `tokio::sync::watch` channel: every
//! mutator runs inside one `send_modify`, so subscribers see exactly one
//! notification per logical change and always read the latest snapshot.
//!
//! No mutator can fail. Unknown ids produce empty selections rather than
//! errors, and detail loads for a schematic that is no longer selected are
//! ignored.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::types::{ColorScheme, LegendItem, Orientation, RENDER_STYLE, RenderPayload, SchematicDetail, Vector};

// =============================================================================
// LOAD STATUS
// =============================================================================

/// Outcome of the schematic detail fetch. Independent of render requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

// =============================================================================
// DESIGN SELECTION
// =============================================================================

/// The user's current design choices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DesignSelection {
    /// Selected design template; `None` means nothing chosen.
    pub schematic_id: Option<String>,
    /// Loaded detail for `schematic_id`, once available.
    pub schematic: Option<SchematicDetail>,
    pub vector_id: Option<String>,
    /// `vector_id` resolved against the loaded vector set.
    pub selected_vector: Option<Vector>,
    pub color_scheme: Option<ColorScheme>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    /// Rendered top to bottom. Duplicates allowed.
    pub legend: Vec<LegendItem>,
    pub status: LoadStatus,
    /// Bumped on every `set_legend`.
    pub legend_revision: u64,
    /// Bumped on every explicit `render`.
    pub render_generation: u64,
}

/// The fields a preview depends on. Two selections with equal keys render
/// identically.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderKey {
    pub schematic_id: Option<String>,
    pub vector_id: Option<String>,
    /// Resolved vector; changes when detail arrives for a preselected id.
    pub selected_vector: Option<Vector>,
    pub legend: Vec<LegendItem>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub color_scheme: Option<ColorScheme>,
    pub render_generation: u64,
}

impl DesignSelection {
    /// Fresh selection, optionally preselecting a schematic.
    #[must_use]
    pub fn seeded(schematic_id: Option<String>) -> Self {
        let mut selection = Self::default();
        selection.select_schematic(schematic_id);
        selection
    }

    pub fn select_schematic(&mut self, id: Option<String>) {
        self.status = if id.is_some() { LoadStatus::Loading } else { LoadStatus::Idle };
        self.schematic_id = id;
        self.schematic = None;
        self.vector_id = None;
        self.selected_vector = None;
        self.color_scheme = None;
    }

    /// Fill the detail slot. Returns `false` (and changes nothing) when the
    /// detail belongs to a schematic that is no longer selected.
    pub fn apply_schematic_detail(&mut self, detail: SchematicDetail) -> bool {
        if self.schematic_id.as_deref() != Some(detail.id.as_str()) {
            return false;
        }

        self.color_scheme = match self.color_scheme.take() {
            Some(current) if detail.color_schemes.iter().any(|s| s.name == current.name) => Some(current),
            _ => detail.color_schemes.first().cloned(),
        };

        let vector_id = self
            .vector_id
            .clone()
            .or_else(|| detail.vectors.first().map(|v| v.id.clone()));
        self.schematic = Some(detail);
        self.status = LoadStatus::Ready;
        self.select_vector(vector_id);
        true
    }

    /// Mark the detail load for `id` as failed. Ignored if `id` is stale.
    pub fn fail_schematic_load(&mut self, id: &str) -> bool {
        if self.schematic_id.as_deref() != Some(id) {
            return false;
        }
        self.status = LoadStatus::Error;
        true
    }

    pub fn select_vector(&mut self, id: Option<String>) {
        self.selected_vector = id.as_deref().and_then(|id| {
            self.vectors()
                .iter()
                .find(|v| v.id == id)
                .cloned()
        });
        self.vector_id = id;
    }

    pub fn set_color_scheme(&mut self, scheme: Option<ColorScheme>) {
        self.color_scheme = scheme;
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn set_subtitle(&mut self, subtitle: Option<String>) {
        self.subtitle = subtitle;
    }

    pub fn set_legend(&mut self, legend: Vec<LegendItem>) {
        self.legend = legend;
        self.legend_revision += 1;
    }

    pub fn render(&mut self) {
        self.render_generation += 1;
    }

    /// Vectors offered by the loaded schematic.
    #[must_use]
    pub fn vectors(&self) -> &[Vector] {
        self.schematic.as_ref().map(|s| s.vectors.as_slice()).unwrap_or_default()
    }

    /// Color schemes offered by the loaded schematic.
    #[must_use]
    pub fn color_schemes(&self) -> &[ColorScheme] {
        self.schematic.as_ref().map(|s| s.color_schemes.as_slice()).unwrap_or_default()
    }

    /// Schematic and a vector with a usable source are both present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.schematic_id.is_some() && self.selected_vector.as_ref().and_then(Vector::source_url).is_some()
    }

    #[must_use]
    pub fn render_key(&self) -> RenderKey {
        RenderKey {
            schematic_id: self.schematic_id.clone(),
            vector_id: self.vector_id.clone(),
            selected_vector: self.selected_vector.clone(),
            legend: self.legend.clone(),
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            color_scheme: self.color_scheme.clone(),
            render_generation: self.render_generation,
        }
    }

    /// Derive a render payload, or `None` if the selection is incomplete.
    ///
    /// Missing title/subtitle fall back to the given defaults; a missing
    /// color scheme falls back to [`ColorScheme::fallback`].
    #[must_use]
    pub fn render_payload(&self, default_title: &str, default_subtitle: &str) -> Option<RenderPayload> {
        self.schematic_id.as_ref()?;
        let vector = self.selected_vector.as_ref()?;
        let schematic_url = vector.source_url()?.to_string();
        let scheme = self.color_scheme.clone().unwrap_or_else(ColorScheme::fallback);

        Some(RenderPayload {
            render_style: RENDER_STYLE.to_string(),
            title: self.title.clone().unwrap_or_else(|| default_title.to_string()),
            subtitle: self.subtitle.clone().unwrap_or_else(|| default_subtitle.to_string()),
            schematic_url,
            color_scheme: scheme.name,
            paper_color: scheme.paper_color,
            pen_color: scheme.pen_color,
            orientation: vector.orientation.unwrap_or(Orientation::Portrait),
            legend: self.legend.clone(),
        })
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Shared handle to one session's `DesignSelection`. Clones share state.
#[derive(Clone)]
pub struct ArtboardStore {
    tx: Arc<watch::Sender<DesignSelection>>,
}

impl ArtboardStore {
    #[must_use]
    pub fn new(selection: DesignSelection) -> Self {
        let (tx, _rx) = watch::channel(selection);
        Self { tx: Arc::new(tx) }
    }

    /// Clone of the current selection.
    #[must_use]
    pub fn snapshot(&self) -> DesignSelection {
        self.tx.borrow().clone()
    }

    /// Read the current selection without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&DesignSelection) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receiver notified once per mutation batch.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DesignSelection> {
        self.tx.subscribe()
    }

    /// Apply several mutations with a single notification.
    pub fn batch(&self, f: impl FnOnce(&mut DesignSelection)) {
        self.tx.send_modify(f);
    }

    pub fn select_schematic(&self, id: Option<String>) {
        self.batch(|s| s.select_schematic(id));
    }

    /// Returns whether the detail was accepted.
    pub fn apply_schematic_detail(&self, detail: SchematicDetail) -> bool {
        let mut accepted = false;
        self.tx.send_if_modified(|s| {
            accepted = s.apply_schematic_detail(detail);
            accepted
        });
        accepted
    }

    pub fn fail_schematic_load(&self, id: &str) -> bool {
        self.tx.send_if_modified(|s| s.fail_schematic_load(id))
    }

    pub fn select_vector(&self, id: Option<String>) {
        self.batch(|s| s.select_vector(id));
    }

    pub fn set_color_scheme(&self, scheme: Option<ColorScheme>) {
        self.batch(|s| s.set_color_scheme(scheme));
    }

    pub fn set_title(&self, title: Option<String>) {
        self.batch(|s| s.set_title(title));
    }

    pub fn set_subtitle(&self, subtitle: Option<String>) {
        self.batch(|s| s.set_subtitle(subtitle));
    }

    pub fn set_legend(&self, legend: Vec<LegendItem>) {
        self.batch(|s| s.set_legend(legend));
    }

    pub fn render(&self) {
        self.batch(DesignSelection::render);
    }
}

impl Default for ArtboardStore {
    fn default() -> Self {
        Self::new(DesignSelection::default())
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;
