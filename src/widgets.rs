//! Selection widget bindings.
//!
//! DESIGN
//! ======
//! Widgets hold no design state of their own. Option lists are derived from
//! a `DesignSelection` snapshot and every choice is forwarded to the store,
//! which in turn wakes the preview controller. Text fields are the only
//! exception: in submit mode they buffer input until submitted.

#[cfg(test)]
#[path = "widgets_test.rs"]
mod widgets_test;

use crate::api::types::SchematicSummary;
use crate::state::{ArtboardStore, DesignSelection, LoadStatus};

/// One entry in a picker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickerOption {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

fn label_or_id(name: &str, id: &str) -> String {
    if name.trim().is_empty() { id.to_string() } else { name.to_string() }
}

/// Schematic picker entries from the catalog listing.
#[must_use]
pub fn schematic_options(catalog: &[SchematicSummary], selection: &DesignSelection) -> Vec<PickerOption> {
    catalog
        .iter()
        .map(|s| PickerOption {
            id: s.id.clone(),
            label: label_or_id(&s.name, &s.id),
            selected: selection.schematic_id.as_deref() == Some(s.id.as_str()),
        })
        .collect()
}

/// Vector picker entries for the loaded schematic.
#[must_use]
pub fn vector_options(selection: &DesignSelection) -> Vec<PickerOption> {
    selection
        .vectors()
        .iter()
        .map(|v| PickerOption {
            id: v.id.clone(),
            label: label_or_id(&v.name, &v.id),
            selected: selection.vector_id.as_deref() == Some(v.id.as_str()),
        })
        .collect()
}

/// Color picker entries for the loaded schematic, keyed by scheme name.
#[must_use]
pub fn color_options(selection: &DesignSelection) -> Vec<PickerOption> {
    let current = selection.color_scheme.as_ref().map(|c| c.name.as_str());
    selection
        .color_schemes()
        .iter()
        .map(|c| PickerOption {
            id: c.name.clone(),
            label: c.name.replace('_', " "),
            selected: current == Some(c.name.as_str()),
        })
        .collect()
}

/// Apply the offered color scheme named `name`. Unknown names are ignored.
pub fn choose_color(store: &ArtboardStore, name: &str) -> bool {
    let Some(scheme) = store.read(|s| s.color_schemes().iter().find(|c| c.name == name).cloned()) else {
        return false;
    };
    store.set_color_scheme(Some(scheme));
    true
}

// =============================================================================
// TEXT FIELDS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextTarget {
    Title,
    Subtitle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextMode {
    /// Every keystroke reaches the store.
    #[default]
    Live,
    /// Input is buffered until `submit`, which also requests a render.
    Submit,
}

/// Title or subtitle input bound to the store.
#[derive(Clone, Debug)]
pub struct TextField {
    target: TextTarget,
    mode: TextMode,
    buffer: String,
}

impl TextField {
    #[must_use]
    pub fn new(target: TextTarget, mode: TextMode, store: &ArtboardStore) -> Self {
        let buffer = store.read(|s| match target {
            TextTarget::Title => s.title.clone(),
            TextTarget::Subtitle => s.subtitle.clone(),
        });
        Self { target, mode, buffer: buffer.unwrap_or_default() }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn input(&mut self, store: &ArtboardStore, value: impl Into<String>) {
        self.buffer = value.into();
        if self.mode == TextMode::Live {
            self.write(store);
        }
    }

    /// Push the buffered value and request a render in one notification.
    pub fn submit(&self, store: &ArtboardStore) {
        let value = normalize(&self.buffer);
        let target = self.target;
        store.batch(|s| {
            match target {
                TextTarget::Title => s.set_title(value),
                TextTarget::Subtitle => s.set_subtitle(value),
            }
            s.render();
        });
    }

    fn write(&self, store: &ArtboardStore) {
        let value = normalize(&self.buffer);
        match self.target {
            TextTarget::Title => store.set_title(value),
            TextTarget::Subtitle => store.set_subtitle(value),
        }
    }
}

/// Blank input means "unset" so preview defaults apply.
fn normalize(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

// =============================================================================
// PREVIEW PLACEHOLDER
// =============================================================================

/// What the preview area shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewDisplay {
    Loading,
    Error,
    /// Schematic or vector still missing.
    SelectPrompt,
    /// Complete selection, no preview (yet, or after a failed render).
    Empty,
    Preview { url: String },
}

#[must_use]
pub fn preview_display(selection: &DesignSelection, preview_url: Option<String>) -> PreviewDisplay {
    match selection.status {
        LoadStatus::Loading => return PreviewDisplay::Loading,
        LoadStatus::Error => return PreviewDisplay::Error,
        LoadStatus::Idle | LoadStatus::Ready => {}
    }
    if !selection.is_complete() {
        return PreviewDisplay::SelectPrompt;
    }
    match preview_url {
        Some(url) => PreviewDisplay::Preview { url },
        None => PreviewDisplay::Empty,
    }
}
