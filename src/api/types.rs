//! Drawscape types — catalog records, render payloads, and errors.
//!
//! Shared by the HTTP client, the store, and the services. Field names
//! mirror the Drawscape JSON contract so the structs serialize directly.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by Drawscape client operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The HTTP request could not be sent or its body could not be read.
    #[error("API request failed: {0}")]
    Request(String),

    /// The service returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    Response { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The render response carried no recognizable SVG markup.
    #[error("render response contained no svg markup")]
    MissingMarkup,
}

impl ApiError {
    /// Short machine-readable code used in log fields.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Request(_) => "E_API_REQUEST",
            Self::Response { .. } => "E_API_RESPONSE",
            Self::Parse(_) => "E_API_PARSE",
            Self::MissingMarkup => "E_MISSING_MARKUP",
        }
    }

    /// Transport-level failures, as opposed to a reachable service that
    /// answered with something unusable.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { .. })
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Layout orientation of a vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// A selectable layout/orientation variant of a schematic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vector {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub orientation: Option<Orientation>,
    /// Source document the render service draws from.
    #[serde(default)]
    pub url: Option<String>,
}

impl Vector {
    /// The source URL, if present and non-blank.
    #[must_use]
    pub fn source_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Named paper/pen palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub name: String,
    pub paper_color: String,
    pub pen_color: String,
    #[serde(default)]
    pub pens: Vec<String>,
}

pub const FALLBACK_SCHEME_NAME: &str = "blue_white";
pub const FALLBACK_PAPER_COLOR: &str = "navy";
pub const FALLBACK_PEN_COLOR: &str = "white";

impl ColorScheme {
    /// Palette used whenever no scheme has been chosen.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            name: FALLBACK_SCHEME_NAME.into(),
            paper_color: FALLBACK_PAPER_COLOR.into(),
            pen_color: FALLBACK_PEN_COLOR.into(),
            pens: Vec::new(),
        }
    }
}

/// Catalog listing entry from `GET /schematics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchematicSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Full schematic record as returned by `GET /schematics/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchematicDetail {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vectors: Vec<Vector>,
    #[serde(default)]
    pub color_schemes: Vec<ColorScheme>,
}

/// One legend row. No identity beyond its position in the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendItem {
    pub label: String,
    pub content: String,
}

impl LegendItem {
    #[must_use]
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self { label: label.into(), content: content.into() }
    }
}

// =============================================================================
// RENDER
// =============================================================================

/// The only render style the service supports.
pub const RENDER_STYLE: &str = "blueprint";

/// Body of `POST /artboard/render` and of the staged checkout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPayload {
    pub render_style: String,
    pub title: String,
    pub subtitle: String,
    pub schematic_url: String,
    pub color_scheme: String,
    pub paper_color: String,
    pub pen_color: String,
    pub orientation: Orientation,
    pub legend: Vec<LegendItem>,
}

/// Artboard created from a staged configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedArtboard {
    pub id: String,
    pub preview_url: String,
}
