//! Render response normalization.
//!
//! The render endpoint answers either with a raw SVG document or with a JSON
//! envelope. `classify_render_response` decides which, `ensure_markup`
//! validates the final string, and `make_responsive` rewrites the root
//! `<svg>` tag so the preview scales with its container.

use super::types::ApiError;

const SVG_MARKER: &str = "<svg";

/// Where the markup for a render lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupSource {
    /// Markup already present in the response.
    Inline(String),
    /// Markup must be fetched from this URL.
    Remote(String),
}

#[derive(serde::Deserialize, Default)]
struct RenderEnvelope {
    #[serde(default)]
    svg: Option<String>,
    #[serde(default)]
    svg_text: Option<String>,
    #[serde(default)]
    svg_url: Option<String>,
}

/// Classify a raw render response body.
///
/// JSON envelopes are checked field by field: `svg`, then `svg_text`, then
/// `svg_url`. Anything else must itself be markup.
///
/// # Errors
///
/// Returns [`ApiError::MissingMarkup`] if no usable field or markup exists.
pub fn classify_render_response(body: &str) -> Result<MarkupSource, ApiError> {
    let trimmed = body.trim();
    if trimmed.starts_with('{') {
        if let Ok(envelope) = serde_json::from_str::<RenderEnvelope>(trimmed) {
            return classify_envelope(envelope);
        }
    }
    ensure_markup(trimmed).map(MarkupSource::Inline)
}

fn classify_envelope(envelope: RenderEnvelope) -> Result<MarkupSource, ApiError> {
    let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    if let Some(svg) = non_blank(envelope.svg) {
        return ensure_markup(&svg).map(MarkupSource::Inline);
    }
    if let Some(text) = non_blank(envelope.svg_text) {
        return ensure_markup(&text).map(MarkupSource::Inline);
    }
    if let Some(url) = non_blank(envelope.svg_url) {
        return Ok(MarkupSource::Remote(url.trim().to_string()));
    }
    Err(ApiError::MissingMarkup)
}

/// Accept `text` only if it contains an SVG root element.
///
/// # Errors
///
/// Returns [`ApiError::MissingMarkup`] when the marker is absent.
pub fn ensure_markup(text: &str) -> Result<String, ApiError> {
    if text.contains(SVG_MARKER) { Ok(text.to_string()) } else { Err(ApiError::MissingMarkup) }
}

// =============================================================================
// RESPONSIVE REWRITE
// =============================================================================

/// Rewrite the root `<svg>` tag for fluid display.
///
/// Fixed `width`/`height` are dropped; when there is no `viewBox` and both
/// were numeric they become one. `preserveAspectRatio` defaults to
/// `xMidYMid meet`. Attribute names match case-insensitively. Markup without
/// a root tag is returned unchanged.
#[must_use]
pub fn make_responsive(markup: &str) -> String {
    let Some(start) = find_root_tag(markup) else {
        return markup.to_string();
    };
    let body_start = start + SVG_MARKER.len();
    let Some(end) = find_tag_end(markup, body_start) else {
        return markup.to_string();
    };

    let mut body = &markup[body_start..end];
    let self_closing = body.trim_end().ends_with('/');
    if self_closing {
        body = body.trim_end().trim_end_matches('/');
    }

    let attrs = split_attributes(body);
    let lookup = |name: &str| {
        attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| *v)
    };
    let width = lookup("width").and_then(parse_length);
    let height = lookup("height").and_then(parse_length);
    let has = |name: &str| attrs.iter().any(|(n, _)| n.eq_ignore_ascii_case(name));
    let has_view_box = has("viewBox");
    let has_aspect = has("preserveAspectRatio");

    let mut tag = String::from(SVG_MARKER);
    for (name, value) in &attrs {
        if name.eq_ignore_ascii_case("width") || name.eq_ignore_ascii_case("height") {
            continue;
        }
        push_attr(&mut tag, name, *value);
    }
    if !has_view_box {
        if let (Some(w), Some(h)) = (width, height) {
            push_attr(&mut tag, "viewBox", Some(format!("0 0 {w} {h}").as_str()));
        }
    }
    if !has_aspect {
        push_attr(&mut tag, "preserveAspectRatio", Some("xMidYMid meet"));
    }
    tag.push_str(if self_closing { "/>" } else { ">" });

    let mut out = String::with_capacity(markup.len() + 48);
    out.push_str(&markup[..start]);
    out.push_str(&tag);
    out.push_str(&markup[end + 1..]);
    out
}

fn push_attr(tag: &mut String, name: &str, value: Option<&str>) {
    tag.push(' ');
    tag.push_str(name);
    if let Some(value) = value {
        tag.push_str("=\"");
        tag.push_str(&value.replace('"', "&quot;"));
        tag.push('"');
    }
}

/// Index of the first `<svg` that opens an element (not `<svgfoo`).
fn find_root_tag(markup: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = markup[from..].find(SVG_MARKER) {
        let at = from + rel;
        let next = markup.as_bytes().get(at + SVG_MARKER.len()).copied();
        if matches!(next, Some(b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/')) {
            return Some(at);
        }
        from = at + SVG_MARKER.len();
    }
    None
}

/// Index of the `>` closing the tag whose body starts at `from`.
fn find_tag_end(markup: &str, from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, b) in markup.bytes().enumerate().skip(from) {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return Some(i),
            (None, _) => {}
        }
    }
    None
}

fn split_attributes(body: &str) -> Vec<(&str, Option<&str>)> {
    let bytes = body.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut i = 0;

    while i < len {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        if i == start {
            // Stray '=' with no name.
            i += 1;
            continue;
        }
        let name = &body[start..i];
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i < len && bytes[i] == b'=' {
            i += 1;
            while i < len && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let value = if i < len && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let q = bytes[i];
                i += 1;
                let value_start = i;
                while i < len && bytes[i] != q {
                    i += 1;
                }
                let value = &body[value_start..i];
                i += 1;
                value
            } else {
                let value_start = i;
                while i < len && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                &body[value_start..i]
            };
            out.push((name, Some(value)));
        } else {
            out.push((name, None));
        }
    }
    out
}

fn parse_length(raw: &str) -> Option<f64> {
    let value = raw.trim().trim_end_matches("px").parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

#[cfg(test)]
#[path = "markup_test.rs"]
mod tests;
