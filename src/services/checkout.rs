//! Checkout hand-off — stages a configured design on a cart line.
//!
//! DESIGN
//! ======
//! Adding a design to the cart attaches the final render payload as the
//! `_artboard_payload` line attribute. Before the line is committed,
//! `finalize_line_item` turns that payload into a persisted artboard and
//! swaps the attribute for `_artboard_id` and `_preview_url`. The fallback
//! palette is the same one the preview uses.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::ArtboardCreator;
use crate::api::types::{ApiError, RenderPayload};
use crate::state::DesignSelection;

pub const PAYLOAD_ATTRIBUTE: &str = "_artboard_payload";
pub const ARTBOARD_ID_ATTRIBUTE: &str = "_artboard_id";
pub const PREVIEW_URL_ATTRIBUTE: &str = "_preview_url";

/// Errors produced while staging or finalizing a line item.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The selection lacks a schematic or a usable vector.
    #[error("design selection is incomplete")]
    Incomplete,

    /// The staged payload could not be encoded or decoded.
    #[error("artboard payload encode failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The artboard backend call failed.
    #[error("artboard creation failed: {0}")]
    Api(#[from] ApiError),
}

/// A cart line-item attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemAttribute {
    pub key: String,
    pub value: String,
}

impl LineItemAttribute {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Final render payload. Title and subtitle default to empty strings.
///
/// # Errors
///
/// Returns [`CheckoutError::Incomplete`] without a schematic and vector.
pub fn final_payload(selection: &DesignSelection) -> Result<RenderPayload, CheckoutError> {
    selection
        .render_payload("", "")
        .ok_or(CheckoutError::Incomplete)
}

/// Attribute carrying the serialized configuration.
///
/// # Errors
///
/// Returns [`CheckoutError::Incomplete`] or [`CheckoutError::Encode`].
pub fn stage_line_item(selection: &DesignSelection) -> Result<LineItemAttribute, CheckoutError> {
    let payload = final_payload(selection)?;
    Ok(LineItemAttribute::new(PAYLOAD_ATTRIBUTE, serde_json::to_string(&payload)?))
}

/// Replace a staged payload attribute with the created artboard's id and
/// preview URL. Attributes without a payload are returned unchanged.
///
/// # Errors
///
/// Returns [`CheckoutError::Encode`] for an undecodable payload and
/// [`CheckoutError::Api`] if the backend call fails; the input is not
/// consumed in that case.
pub async fn finalize_line_item(
    attributes: &[LineItemAttribute],
    creator: &dyn ArtboardCreator,
) -> Result<Vec<LineItemAttribute>, CheckoutError> {
    let Some(staged) = attributes.iter().find(|a| a.key == PAYLOAD_ATTRIBUTE) else {
        return Ok(attributes.to_vec());
    };
    let payload: RenderPayload = serde_json::from_str(&staged.value)?;
    let created = creator.create_artboard(&payload).await?;
    info!(artboard_id = %created.id, "artboard created for line item");

    let mut out: Vec<LineItemAttribute> = attributes
        .iter()
        .filter(|a| {
            a.key != PAYLOAD_ATTRIBUTE && a.key != ARTBOARD_ID_ATTRIBUTE && a.key != PREVIEW_URL_ATTRIBUTE
        })
        .cloned()
        .collect();
    out.push(LineItemAttribute::new(ARTBOARD_ID_ATTRIBUTE, created.id));
    out.push(LineItemAttribute::new(PREVIEW_URL_ATTRIBUTE, created.preview_url));
    Ok(out)
}

#[cfg(test)]
#[path = "checkout_test.rs"]
mod tests;
