//! Legend editor — draft editing, confirmed deletion, and reordering.
//!
//! DESIGN
//! ======
//! The committed legend lives in the store; the editor only keeps transient
//! per-row drafts and delete confirmations, keyed by position. Every
//! structural change goes through `ArtboardStore::set_legend` with a full
//! replacement list.
//!
//! Position keys are only valid for one legend revision. Before each
//! operation the editor compares the store's `legend_revision` with the one
//! it last saw and wipes all drafts and confirmations on mismatch, whoever
//! made the change.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::api::types::LegendItem;
use crate::state::ArtboardStore;

/// How long a first delete press stays armed.
pub const DELETE_CONFIRM_WINDOW: Duration = Duration::from_secs(3);

/// Shown in collapsed rows for empty fields.
pub const EMPTY_PLACEHOLDER: &str = "(empty)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Uncommitted edits for one row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegendDraft {
    pub label: String,
    pub content: String,
    pub dirty: bool,
}

/// Result of a delete press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// First press; the row stays until confirmed.
    Armed,
    Removed,
    OutOfRange,
}

pub struct LegendEditor {
    store: ArtboardStore,
    seen_revision: u64,
    drafts: HashMap<usize, LegendDraft>,
    confirmations: HashMap<usize, Instant>,
    expanded: Option<usize>,
}

impl LegendEditor {
    #[must_use]
    pub fn new(store: ArtboardStore) -> Self {
        let seen_revision = store.read(|s| s.legend_revision);
        Self { store, seen_revision, drafts: HashMap::new(), confirmations: HashMap::new(), expanded: None }
    }

    /// Committed rows.
    #[must_use]
    pub fn items(&self) -> Vec<LegendItem> {
        self.store.read(|s| s.legend.clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.read(|s| s.legend.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the expanded row, if any.
    pub fn expanded(&mut self) -> Option<usize> {
        self.sync();
        self.expanded
    }

    pub fn toggle_expanded(&mut self, index: usize) {
        self.sync();
        if index >= self.len() {
            return;
        }
        self.expanded = if self.expanded == Some(index) { None } else { Some(index) };
    }

    // =========================================================================
    // STRUCTURE
    // =========================================================================

    /// Append an empty row and expand it.
    pub fn add_item(&mut self) {
        self.sync();
        let mut legend = self.items();
        legend.push(LegendItem::default());
        self.expanded = Some(legend.len() - 1);
        self.commit(legend);
    }

    /// Remove a row immediately. Returns `false` if `index` is out of range.
    pub fn remove_item(&mut self, index: usize) -> bool {
        self.sync();
        let mut legend = self.items();
        if index >= legend.len() {
            return false;
        }
        legend.remove(index);
        self.expanded = match self.expanded {
            Some(e) if e == index => None,
            Some(e) if e > index => Some(e - 1),
            other => other,
        };
        self.commit(legend);
        true
    }

    /// Swap a row with its neighbour. No-op at either end.
    pub fn move_item(&mut self, index: usize, direction: MoveDirection) -> bool {
        self.sync();
        let mut legend = self.items();
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1),
        };
        let Some(target) = target.filter(|t| *t < legend.len() && index < legend.len()) else {
            return false;
        };
        legend.swap(index, target);
        self.expanded = match self.expanded {
            Some(e) if e == index => Some(target),
            Some(e) if e == target => Some(index),
            other => other,
        };
        self.commit(legend);
        true
    }

    /// Two-step delete: the first press arms, a second press within
    /// [`DELETE_CONFIRM_WINDOW`] removes.
    pub fn request_delete(&mut self, index: usize) -> DeleteOutcome {
        self.sync();
        if index >= self.len() {
            return DeleteOutcome::OutOfRange;
        }
        if self.is_delete_armed(index) {
            self.remove_item(index);
            return DeleteOutcome::Removed;
        }
        self.confirmations.insert(index, Instant::now());
        DeleteOutcome::Armed
    }

    /// Whether a delete press for `index` is awaiting confirmation.
    #[must_use]
    pub fn is_delete_armed(&self, index: usize) -> bool {
        self.store.read(|s| s.legend_revision) == self.seen_revision
            && self
                .confirmations
                .get(&index)
                .is_some_and(|armed_at| armed_at.elapsed() < DELETE_CONFIRM_WINDOW)
    }

    // =========================================================================
    // DRAFTS
    // =========================================================================

    /// Open a draft for `index`, seeded from the committed row, and expand it.
    pub fn begin_edit(&mut self, index: usize) -> bool {
        self.sync();
        if self.draft_entry(index).is_none() {
            return false;
        }
        self.expanded = Some(index);
        true
    }

    pub fn edit_label(&mut self, index: usize, label: impl Into<String>) -> bool {
        self.sync();
        let Some(draft) = self.draft_entry(index) else {
            return false;
        };
        draft.label = label.into();
        draft.dirty = true;
        true
    }

    pub fn edit_content(&mut self, index: usize, content: impl Into<String>) -> bool {
        self.sync();
        let Some(draft) = self.draft_entry(index) else {
            return false;
        };
        draft.content = content.into();
        draft.dirty = true;
        true
    }

    /// Commit the draft for `index`. Does nothing unless the row is dirty.
    pub fn update_item(&mut self, index: usize) -> bool {
        self.sync();
        let Some(draft) = self.drafts.get(&index).filter(|d| d.dirty).cloned() else {
            return false;
        };
        let mut legend = self.items();
        let Some(row) = legend.get_mut(index) else {
            return false;
        };
        row.label = draft.label;
        row.content = draft.content;
        self.commit(legend);
        true
    }

    /// Throw away the draft for `index`.
    pub fn discard_draft(&mut self, index: usize) {
        self.sync();
        self.drafts.remove(&index);
    }

    pub fn draft(&mut self, index: usize) -> Option<&LegendDraft> {
        self.sync();
        self.drafts.get(&index)
    }

    pub fn is_dirty(&mut self, index: usize) -> bool {
        self.draft(index).is_some_and(|d| d.dirty)
    }

    /// Label as shown in a collapsed row: the draft if any, else the
    /// committed value, with empty text replaced by a placeholder.
    pub fn display_label(&mut self, index: usize) -> Option<String> {
        self.sync();
        let value = match self.drafts.get(&index) {
            Some(d) => Some(d.label.clone()),
            None => self.store.read(|s| s.legend.get(index).map(|i| i.label.clone())),
        };
        value.map(placeholder)
    }

    pub fn display_content(&mut self, index: usize) -> Option<String> {
        self.sync();
        let value = match self.drafts.get(&index) {
            Some(d) => Some(d.content.clone()),
            None => self.store.read(|s| s.legend.get(index).map(|i| i.content.clone())),
        };
        value.map(placeholder)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn draft_entry(&mut self, index: usize) -> Option<&mut LegendDraft> {
        let row = self.store.read(|s| s.legend.get(index).cloned())?;
        Some(self.drafts.entry(index).or_insert_with(|| LegendDraft {
            label: row.label,
            content: row.content,
            dirty: false,
        }))
    }

    fn commit(&mut self, legend: Vec<LegendItem>) {
        debug!(rows = legend.len(), "legend committed");
        self.store.set_legend(legend);
        self.sync();
    }

    /// Drop position-keyed state if the committed legend moved on.
    fn sync(&mut self) {
        let (revision, len) = self.store.read(|s| (s.legend_revision, s.legend.len()));
        if revision == self.seen_revision {
            return;
        }
        self.seen_revision = revision;
        self.drafts.clear();
        self.confirmations.clear();
        if self.expanded.is_some_and(|e| e >= len) {
            self.expanded = None;
        }
    }
}

fn placeholder(value: String) -> String {
    if value.is_empty() { EMPTY_PLACEHOLDER.to_string() } else { value }
}

#[cfg(test)]
#[path = "legend_test.rs"]
mod tests;
