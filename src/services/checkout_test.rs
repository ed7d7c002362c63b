use super::*;
use crate::api::types::{CreatedArtboard, LegendItem};
use crate::state::test_helpers::schematic_s1;
use std::sync::Mutex;

#[derive(Default)]
struct RecordingCreator {
    seen: Mutex<Vec<RenderPayload>>,
    fail: bool,
}

#[async_trait::async_trait]
impl ArtboardCreator for RecordingCreator {
    async fn create_artboard(&self, payload: &RenderPayload) -> Result<CreatedArtboard, ApiError> {
        if self.fail {
            return Err(ApiError::Response { status: 500, body: "boom".into() });
        }
        self.seen.lock().unwrap().push(payload.clone());
        Ok(CreatedArtboard { id: "ab_42".into(), preview_url: "https://cdn.test/ab_42.png".into() })
    }
}

fn complete_selection() -> DesignSelection {
    let mut s = DesignSelection::seeded(Some("s1".into()));
    s.apply_schematic_detail(schematic_s1());
    s.set_color_scheme(None);
    s.set_legend(vec![LegendItem::new("LOA", "36 ft")]);
    s
}

#[test]
fn final_payload_uses_empty_text_and_fallback_palette() {
    let payload = final_payload(&complete_selection()).unwrap();
    assert_eq!(payload.title, "");
    assert_eq!(payload.subtitle, "");
    assert_eq!(payload.color_scheme, "blue_white");
    assert_eq!(payload.paper_color, "navy");
    assert_eq!(payload.pen_color, "white");
    assert_eq!(payload.legend.len(), 1);
}

#[test]
fn stage_requires_complete_selection() {
    let err = stage_line_item(&DesignSelection::default()).unwrap_err();
    assert!(matches!(err, CheckoutError::Incomplete));
}

#[test]
fn stage_serializes_payload_attribute() {
    let attr = stage_line_item(&complete_selection()).unwrap();
    assert_eq!(attr.key, "_artboard_payload");
    let decoded: RenderPayload = serde_json::from_str(&attr.value).unwrap();
    assert_eq!(decoded.schematic_url, "https://x/s1v1.dat");
}

#[tokio::test]
async fn finalize_swaps_payload_for_artboard_attributes() {
    let creator = RecordingCreator::default();
    let attrs = vec![LineItemAttribute::new("gift", "yes"), stage_line_item(&complete_selection()).unwrap()];

    let out = finalize_line_item(&attrs, &creator).await.unwrap();
    assert_eq!(
        out,
        vec![
            LineItemAttribute::new("gift", "yes"),
            LineItemAttribute::new("_artboard_id", "ab_42"),
            LineItemAttribute::new("_preview_url", "https://cdn.test/ab_42.png"),
        ]
    );
    assert_eq!(creator.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn finalize_without_payload_is_passthrough() {
    let creator = RecordingCreator::default();
    let attrs = vec![LineItemAttribute::new("gift", "yes")];
    let out = finalize_line_item(&attrs, &creator).await.unwrap();
    assert_eq!(out, attrs);
    assert!(creator.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn finalize_surfaces_backend_failure() {
    let creator = RecordingCreator { fail: true, ..Default::default() };
    let attrs = vec![stage_line_item(&complete_selection()).unwrap()];
    let err = finalize_line_item(&attrs, &creator).await.unwrap_err();
    assert!(matches!(err, CheckoutError::Api(ApiError::Response { status: 500, .. })));
}

#[tokio::test]
async fn finalize_rejects_garbled_payload() {
    let creator = RecordingCreator::default();
    let attrs = vec![LineItemAttribute::new(PAYLOAD_ATTRIBUTE, "{not json")];
    let err = finalize_line_item(&attrs, &creator).await.unwrap_err();
    assert!(matches!(err, CheckoutError::Encode(_)));
}
