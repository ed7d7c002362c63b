//! Artboard services built on the store and the Drawscape API.
//!
//! ARCHITECTURE
//! ============
//! Services own the session behaviour (preview rendering, legend editing,
//! schematic loading, checkout staging) so widgets can stay thin bindings
//! over `ArtboardStore`.

pub mod blob;
pub mod catalog;
pub mod checkout;
pub mod legend;
pub mod preview;
