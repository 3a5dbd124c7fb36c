//! Viewport advancement between collection cycles
//!
//! Lazy catalogs render in response to scroll position, so the scroller's
//! job is purely mechanical: move down a bit, give the page time to render,
//! and handle the loaders that only fire at the exact bottom of the
//! document. It knows nothing about targets or collected items.

use std::time::Duration;

use tokio::time::sleep;

use crate::CatalogPage;

/// Timing and geometry knobs for one scroll step
///
/// Defaults mirror the settle behavior lazy catalog pages need: about a
/// second for content scrolled into view, slightly longer for the bottom
/// sentinel case, and a short grace period when nothing appears to move.
#[derive(Debug, Clone)]
pub struct ScrollTiming {
    /// Fraction of the viewport height covered by one scroll step.
    pub step_fraction: f64,
    /// Wait after the regular scroll step.
    pub step_settle: Duration,
    /// Wait after the explicit scroll-to-bottom.
    pub bottom_settle: Duration,
    /// Extra wait when neither document height nor offset changed.
    pub grace: Duration,
    /// How close to the document end counts as "at the bottom", in pixels.
    pub bottom_tolerance: f64,
}

impl Default for ScrollTiming {
    fn default() -> Self {
        Self {
            step_fraction: 0.9,
            step_settle: Duration::from_millis(1100),
            bottom_settle: Duration::from_millis(1200),
            grace: Duration::from_millis(600),
            bottom_tolerance: 20.0,
        }
    }
}

/// Advances the viewport one step at a time and waits for content to settle
pub struct ProgressiveScroller {
    timing: ScrollTiming,
}

impl ProgressiveScroller {
    pub fn new(timing: ScrollTiming) -> Self {
        Self { timing }
    }

    /// One logical scroll step
    ///
    /// Scrolls by `step_fraction` of the viewport and settles. If that
    /// leaves the viewport within `bottom_tolerance` of the document end,
    /// issues an explicit scroll-to-bottom and settles again — some lazy
    /// loaders only trigger on the bottom sentinel. If neither the document
    /// height nor the offset moved versus the start of the step, waits one
    /// grace period before handing control back to the caller's re-measure.
    pub async fn advance<P: CatalogPage + ?Sized>(&self, page: &P) {
        let before = page.viewport().await;

        page.scroll_by(before.viewport_height * self.timing.step_fraction)
            .await;
        sleep(self.timing.step_settle).await;

        let settled = page.viewport().await;
        if settled.at_bottom(self.timing.bottom_tolerance) {
            page.scroll_to_bottom().await;
            sleep(self.timing.bottom_settle).await;
        }

        let after = page.viewport().await;
        if !after.moved_since(&before) {
            sleep(self.timing.grace).await;
        }
    }
}
