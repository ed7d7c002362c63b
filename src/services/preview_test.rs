use super::*;
use crate::api::types::{ApiError, LegendItem, Orientation};
use crate::state::test_helpers::schematic_s1;
use std::collections::HashMap;
use std::time::Duration;

// =========================================================================
// FakeRenderer
// =========================================================================

#[derive(Clone)]
enum Reply {
    Body(&'static str),
    Status(u16),
}

/// Answers by payload title after an optional delay.
#[derive(Default)]
struct FakeRenderer {
    script: HashMap<String, (Duration, Reply)>,
    remote: HashMap<String, Reply>,
    calls: std::sync::Mutex<Vec<RenderPayload>>,
}

impl FakeRenderer {
    fn reply(mut self, title: &str, reply: Reply) -> Self {
        self.script.insert(title.into(), (Duration::ZERO, reply));
        self
    }

    fn delayed(mut self, title: &str, ms: u64, reply: Reply) -> Self {
        self.script
            .insert(title.into(), (Duration::from_millis(ms), reply));
        self
    }

    fn remote(mut self, url: &str, reply: Reply) -> Self {
        self.remote.insert(url.into(), reply);
        self
    }

    fn calls(&self) -> Vec<RenderPayload> {
        self.calls.lock().unwrap().clone()
    }
}

fn answer(reply: Reply) -> Result<String, ApiError> {
    match reply {
        Reply::Body(body) => Ok(body.to_string()),
        Reply::Status(status) => Err(ApiError::Response { status, body: String::new() }),
    }
}

#[async_trait::async_trait]
impl RenderService for FakeRenderer {
    async fn render(&self, payload: &RenderPayload) -> Result<String, ApiError> {
        self.calls.lock().unwrap().push(payload.clone());
        let Some((delay, reply)) = self.script.get(&payload.title).cloned() else {
            return Err(ApiError::Request("unscripted title".into()));
        };
        tokio::time::sleep(delay).await;
        answer(reply)
    }

    async fn fetch_markup(&self, url: &str) -> Result<String, ApiError> {
        self.remote
            .get(url)
            .cloned()
            .map_or_else(|| Err(ApiError::Response { status: 404, body: String::new() }), answer)
    }
}

fn selection(title: Option<&str>) -> DesignSelection {
    let mut s = DesignSelection::seeded(Some("s1".into()));
    s.apply_schematic_detail(schematic_s1());
    s.set_color_scheme(None);
    s.set_title(title.map(Into::into));
    s
}

fn controller(renderer: FakeRenderer) -> (PreviewController, Arc<FakeRenderer>, BlobStore) {
    let renderer = Arc::new(renderer);
    let blobs = BlobStore::new();
    let service: Arc<dyn RenderService> = renderer.clone();
    (PreviewController::new(service, blobs.clone()), renderer, blobs)
}

/// Let every scheduled render finish (time is paused, so this is instant).
async fn settle() {
    tokio::time::sleep(Duration::from_secs(5)).await;
}

// =========================================================================
// payload
// =========================================================================

#[test]
fn preview_payload_matches_documented_example() {
    let payload = preview_payload(&selection(None)).unwrap();
    let expected = RenderPayload {
        render_style: "blueprint".into(),
        title: "Preview Title".into(),
        subtitle: "Preview Subtitle".into(),
        schematic_url: "https://x/s1v1.dat".into(),
        color_scheme: "blue_white".into(),
        paper_color: "navy".into(),
        pen_color: "white".into(),
        orientation: Orientation::Portrait,
        legend: vec![],
    };
    assert_eq!(payload, expected);
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        serde_json::json!({
            "render_style": "blueprint",
            "title": "Preview Title",
            "subtitle": "Preview Subtitle",
            "schematic_url": "https://x/s1v1.dat",
            "color_scheme": "blue_white",
            "paper_color": "navy",
            "pen_color": "white",
            "orientation": "portrait",
            "legend": []
        })
    );
}

// =========================================================================
// request_preview
// =========================================================================

#[tokio::test(start_paused = true)]
async fn svg_envelope_yields_preview() {
    let (ctl, renderer, blobs) =
        controller(FakeRenderer::default().reply("Preview Title", Reply::Body(r#"{"svg":"<svg><g/></svg>"}"#)));

    ctl.request_preview(&selection(None));
    assert_eq!(ctl.state(), RenderState::Pending);
    settle().await;

    assert_eq!(ctl.state(), RenderState::Ready);
    assert!(ctl.has_preview());
    let markup = ctl.preview_markup().unwrap();
    assert!(markup.starts_with("<svg preserveAspectRatio=\"xMidYMid meet\">"));
    assert_eq!(blobs.get(&ctl.preview_url().unwrap()).unwrap().0, "image/svg+xml");
    assert_eq!(renderer.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn empty_envelope_clears_preview() {
    let (ctl, _renderer, blobs) = controller(
        FakeRenderer::default()
            .reply("first", Reply::Body("<svg/>"))
            .reply("second", Reply::Body("{}")),
    );

    ctl.request_preview(&selection(Some("first")));
    settle().await;
    assert!(ctl.has_preview());

    ctl.request_preview(&selection(Some("second")));
    settle().await;
    assert!(!ctl.has_preview());
    assert_eq!(ctl.state(), RenderState::Failed);
    assert_eq!(blobs.live_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn svg_url_is_followed() {
    let (ctl, _renderer, _blobs) = controller(
        FakeRenderer::default()
            .reply("Preview Title", Reply::Body(r#"{"svg_url":"https://cdn.test/r.svg"}"#))
            .remote("https://cdn.test/r.svg", Reply::Body("<svg id=\"remote\"></svg>")),
    );

    ctl.request_preview(&selection(None));
    settle().await;
    assert!(ctl.preview_markup().unwrap().contains("id=\"remote\""));
}

#[tokio::test(start_paused = true)]
async fn svg_url_without_markup_fails() {
    let (ctl, _renderer, _blobs) = controller(
        FakeRenderer::default()
            .reply("Preview Title", Reply::Body(r#"{"svg_url":"https://cdn.test/r.svg"}"#))
            .remote("https://cdn.test/r.svg", Reply::Body("<html/>")),
    );

    ctl.request_preview(&selection(None));
    settle().await;
    assert!(!ctl.has_preview());
    assert_eq!(ctl.state(), RenderState::Failed);
}

#[tokio::test(start_paused = true)]
async fn transport_failure_clears_previous_preview() {
    let (ctl, _renderer, blobs) = controller(
        FakeRenderer::default()
            .reply("ok", Reply::Body("<svg/>"))
            .reply("down", Reply::Status(503)),
    );

    ctl.request_preview(&selection(Some("ok")));
    settle().await;
    assert!(ctl.has_preview());

    ctl.request_preview(&selection(Some("down")));
    settle().await;
    assert!(!ctl.has_preview());
    assert_eq!(blobs.revoked_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn incomplete_selection_sends_nothing_and_clears() {
    let (ctl, renderer, blobs) = controller(FakeRenderer::default().reply("Preview Title", Reply::Body("<svg/>")));

    ctl.request_preview(&selection(None));
    settle().await;
    assert!(ctl.has_preview());

    let mut missing_vector = selection(None);
    missing_vector.select_vector(Some("gone".into()));
    ctl.request_preview(&missing_vector);

    assert!(!ctl.has_preview());
    assert_eq!(ctl.state(), RenderState::Idle);
    assert_eq!(renderer.calls().len(), 1);
    assert_eq!(blobs.live_count(), 0);
}

// =========================================================================
// last request wins
// =========================================================================

#[tokio::test(start_paused = true)]
async fn slower_earlier_request_never_shows() {
    let (ctl, _renderer, _blobs) = controller(
        FakeRenderer::default()
            .delayed("A", 500, Reply::Body("<svg id=\"a\"/>"))
            .delayed("B", 10, Reply::Body("<svg id=\"b\"/>")),
    );

    let a = ctl.request_preview(&selection(Some("A")));
    let b = ctl.request_preview(&selection(Some("B")));
    assert!(b > a);
    settle().await;

    assert!(ctl.preview_markup().unwrap().contains("id=\"b\""));
}

#[tokio::test(start_paused = true)]
async fn late_commit_for_superseded_token_is_discarded() {
    let (ctl, _renderer, blobs) = controller(FakeRenderer::default().reply("B", Reply::Body("<svg id=\"b\"/>")));

    let a = ctl.request_preview(&selection(Some("A")));
    let _b = ctl.request_preview(&selection(Some("B")));
    settle().await;

    assert!(!ctl.commit(a, Ok("<svg id=\"a\"/>".into())));
    assert!(ctl.preview_markup().unwrap().contains("id=\"b\""));
    assert_eq!(blobs.live_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn late_failure_for_superseded_token_does_not_clear() {
    let (ctl, _renderer, _blobs) = controller(FakeRenderer::default().reply("B", Reply::Body("<svg/>")));

    let a = ctl.request_preview(&selection(Some("A")));
    ctl.request_preview(&selection(Some("B")));
    settle().await;

    assert!(!ctl.commit(a, Err(ApiError::Request("reset".into()))));
    assert!(ctl.has_preview());
    assert_eq!(ctl.state(), RenderState::Ready);
}

// =========================================================================
// resources
// =========================================================================

#[tokio::test(start_paused = true)]
async fn sequential_renders_keep_one_live_resource() {
    let mut renderer = FakeRenderer::default();
    for i in 0..5 {
        renderer = renderer.reply(&format!("t{i}"), Reply::Body("<svg/>"));
    }
    let (ctl, _renderer, blobs) = controller(renderer);

    for i in 0..5 {
        ctl.request_preview(&selection(Some(format!("t{i}").as_str())));
        settle().await;
        assert_eq!(blobs.live_count(), 1);
    }
    assert_eq!(blobs.created_count(), 5);
    assert_eq!(blobs.revoked_count(), 4);

    ctl.teardown();
    assert_eq!(blobs.live_count(), 0);
    assert_eq!(blobs.revoked_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn dropping_controller_releases_preview() {
    let (ctl, _renderer, blobs) = controller(FakeRenderer::default().reply("Preview Title", Reply::Body("<svg/>")));
    ctl.request_preview(&selection(None));
    settle().await;
    assert_eq!(blobs.live_count(), 1);

    drop(ctl);
    assert_eq!(blobs.live_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn teardown_makes_in_flight_render_stale() {
    let (ctl, _renderer, blobs) =
        controller(FakeRenderer::default().delayed("Preview Title", 100, Reply::Body("<svg/>")));
    let token = ctl.request_preview(&selection(None));
    ctl.teardown();
    settle().await;

    assert!(!ctl.has_preview());
    assert!(ctl.latest_request_id() > token);
    assert_eq!(blobs.created_count(), 0);
}

// =========================================================================
// watch
// =========================================================================

#[tokio::test(start_paused = true)]
async fn watcher_follows_store_changes() {
    let (ctl, renderer, blobs) = controller(
        FakeRenderer::default()
            .reply("Preview Title", Reply::Body("<svg id=\"initial\"/>"))
            .reply("Spray", Reply::Body("<svg id=\"spray\"/>")),
    );
    let store = ArtboardStore::new(selection(None));
    let watcher = ctl.watch(&store);
    settle().await;
    assert!(ctl.preview_markup().unwrap().contains("initial"));

    store.set_title(Some("Spray".into()));
    settle().await;
    assert!(ctl.preview_markup().unwrap().contains("spray"));
    assert_eq!(renderer.calls().len(), 2);

    // Status alone is not a render input.
    store.batch(|s| s.status = crate::state::LoadStatus::Error);
    settle().await;
    assert_eq!(renderer.calls().len(), 2);

    // Explicit render re-issues an unchanged selection.
    store.render();
    settle().await;
    assert_eq!(renderer.calls().len(), 3);

    store.set_legend(vec![LegendItem::new("LOA", "27 ft")]);
    settle().await;
    assert_eq!(renderer.calls().last().unwrap().legend.len(), 1);

    drop(store);
    watcher.await.unwrap();
    assert!(!ctl.has_preview());
    assert_eq!(blobs.live_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn detail_resolving_preselected_vector_triggers_render() {
    let (ctl, renderer, _blobs) = controller(FakeRenderer::default().reply("Preview Title", Reply::Body("<svg/>")));
    let store = ArtboardStore::new(DesignSelection::seeded(Some("s1".into())));
    let _watcher = ctl.watch(&store);

    store.select_vector(Some("v1".into()));
    store.set_color_scheme(Some(crate::state::test_helpers::scheme("red_cream", "cream", "red")));
    settle().await;
    assert_eq!(renderer.calls().len(), 0);

    assert!(store.apply_schematic_detail(schematic_s1()));
    settle().await;
    assert!(store.snapshot().is_complete());
    assert_eq!(renderer.calls().len(), 1);
    assert!(ctl.has_preview());

    // Reloading the same schematic with a moved vector source re-renders.
    let mut moved = schematic_s1();
    moved.vectors[0].url = Some("https://x/s1v1-r2.dat".into());
    assert!(store.apply_schematic_detail(moved));
    settle().await;
    assert_eq!(renderer.calls().len(), 2);
    assert_eq!(renderer.calls()[1].schematic_url, "https://x/s1v1-r2.dat");
}
