use async_trait::async_trait;
use scrollect::{CatalogPage, FragmentCard, ProgressiveScroller, ScrollTiming, Viewport};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
enum ScrollEvent {
    By(f64),
    ToBottom,
}

/// A page that records scroll commands against fixed document geometry.
struct RecordingPage {
    viewport_height: f64,
    document_height: f64,
    offset: Mutex<f64>,
    events: Mutex<Vec<ScrollEvent>>,
}

impl RecordingPage {
    fn new(viewport_height: f64, document_height: f64, offset: f64) -> Self {
        Self {
            viewport_height,
            document_height,
            offset: Mutex::new(offset),
            events: Mutex::new(Vec::new()),
        }
    }

    fn events(&self) -> Vec<ScrollEvent> {
        self.events.lock().unwrap().clone()
    }

    fn max_offset(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }
}

#[async_trait]
impl CatalogPage for RecordingPage {
    async fn query_cards(&self, _selector: &str) -> Vec<FragmentCard> {
        Vec::new()
    }

    async fn viewport(&self) -> Viewport {
        Viewport {
            scroll_offset: *self.offset.lock().unwrap(),
            viewport_height: self.viewport_height,
            document_height: self.document_height,
        }
    }

    async fn scroll_by(&self, pixels: f64) {
        self.events.lock().unwrap().push(ScrollEvent::By(pixels));
        let mut offset = self.offset.lock().unwrap();
        *offset = (*offset + pixels).clamp(0.0, self.max_offset());
    }

    async fn scroll_to_bottom(&self) {
        self.events.lock().unwrap().push(ScrollEvent::ToBottom);
        *self.offset.lock().unwrap() = self.max_offset();
    }

    async fn current_url(&self) -> Url {
        Url::parse("https://www.ozon.ru/category/test/").unwrap()
    }
}

#[tokio::test(start_paused = true)]
async fn mid_page_step_scrolls_a_viewport_fraction_and_settles() {
    let page = RecordingPage::new(600.0, 10_000.0, 0.0);
    let scroller = ProgressiveScroller::new(ScrollTiming::default());

    let start = Instant::now();
    scroller.advance(&page).await;

    assert_eq!(page.events(), vec![ScrollEvent::By(540.0)]);
    // one step settle, viewport moved, so no grace period
    assert_eq!(start.elapsed(), Duration::from_millis(1100));
}

#[tokio::test(start_paused = true)]
async fn bottom_proximity_triggers_the_explicit_bottom_scroll() {
    // max offset 500; the step lands there, inside the 20px tolerance
    let page = RecordingPage::new(600.0, 1_100.0, 0.0);
    let scroller = ProgressiveScroller::new(ScrollTiming::default());

    let start = Instant::now();
    scroller.advance(&page).await;

    assert_eq!(
        page.events(),
        vec![ScrollEvent::By(540.0), ScrollEvent::ToBottom]
    );
    // step settle plus the longer bottom settle; the offset moved, so no
    // grace period
    assert_eq!(start.elapsed(), Duration::from_millis(1100 + 1200));
}

#[tokio::test(start_paused = true)]
async fn stalled_page_gets_the_grace_wait() {
    // already pinned at the bottom: nothing can move, nothing grows
    let page = RecordingPage::new(600.0, 1_100.0, 500.0);
    let scroller = ProgressiveScroller::new(ScrollTiming::default());

    let start = Instant::now();
    scroller.advance(&page).await;

    assert_eq!(
        page.events(),
        vec![ScrollEvent::By(540.0), ScrollEvent::ToBottom]
    );
    assert_eq!(start.elapsed(), Duration::from_millis(1100 + 1200 + 600));
}

#[tokio::test(start_paused = true)]
async fn timing_knobs_are_respected() {
    let page = RecordingPage::new(600.0, 10_000.0, 0.0);
    let scroller = ProgressiveScroller::new(ScrollTiming {
        step_fraction: 0.5,
        step_settle: Duration::from_millis(100),
        ..ScrollTiming::default()
    });

    let start = Instant::now();
    scroller.advance(&page).await;

    assert_eq!(page.events(), vec![ScrollEvent::By(300.0)]);
    assert_eq!(start.elapsed(), Duration::from_millis(100));
}
