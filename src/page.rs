//! The live-document seam: where cards and scroll state come from
//!
//! [`CatalogPage`] is the one boundary between the collection loop and an
//! actual browser. The loop only ever asks a page four things: which cards
//! currently match a selector, where the viewport stands, to scroll, and
//! what URL it is on. Backends decide how those answers are produced — a
//! WebDriver session, a saved document, a test double.

use async_trait::async_trait;
use std::sync::Mutex;
use url::Url;

use crate::FragmentCard;

/// Scroll geometry of the page at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl Viewport {
    /// Whether the viewport bottom is within `tolerance` pixels of the end
    /// of the document.
    pub fn at_bottom(&self, tolerance: f64) -> bool {
        self.scroll_offset + self.viewport_height >= self.document_height - tolerance
    }

    /// Whether the document grew or the viewport moved since `earlier`.
    pub fn moved_since(&self, earlier: &Viewport) -> bool {
        self.document_height > earlier.document_height || self.scroll_offset > earlier.scroll_offset
    }
}

/// A catalog page the collector can read and scroll
///
/// `query_cards` is a snapshot: a read of the current document state at
/// call time, materialized into owned [`FragmentCard`]s. It has no error
/// outcomes — an empty or broken document yields an empty vec, and backend
/// irregularities are logged and absorbed per element.
#[async_trait]
pub trait CatalogPage: Send + Sync {
    /// All elements currently matching `selector`, in document order.
    async fn query_cards(&self, selector: &str) -> Vec<FragmentCard>;

    /// Current scroll geometry.
    async fn viewport(&self) -> Viewport;

    /// Scroll down by `pixels` (smooth where the backend supports it).
    async fn scroll_by(&self, pixels: f64);

    /// Jump to the very bottom of the document.
    async fn scroll_to_bottom(&self);

    /// The page URL, used to absolutize card links.
    async fn current_url(&self) -> Url;
}

/// A fixed document served as a catalog page
///
/// Backed by a raw HTML string that is re-parsed on every query, so each
/// snapshot is a genuine read of current state. Scrolling moves a simulated
/// offset and nothing else — useful for saved pages, which are already
/// fully rendered, and for tests. A run against a static page converges in
/// one pass and then ends through the stagnation budget.
pub struct StaticCatalog {
    html: String,
    page_url: Url,
    viewport_height: f64,
    document_height: f64,
    offset: Mutex<f64>,
}

impl StaticCatalog {
    pub fn new(html: impl Into<String>, page_url: Url) -> Self {
        Self {
            html: html.into(),
            page_url,
            viewport_height: 900.0,
            document_height: 900.0,
            offset: Mutex::new(0.0),
        }
    }

    /// Override the simulated viewport and document heights.
    pub fn with_heights(mut self, viewport_height: f64, document_height: f64) -> Self {
        self.viewport_height = viewport_height;
        self.document_height = document_height;
        self
    }

    fn max_offset(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }
}

#[async_trait]
impl CatalogPage for StaticCatalog {
    async fn query_cards(&self, selector: &str) -> Vec<FragmentCard> {
        let Ok(selector) = scraper::Selector::parse(selector) else {
            return Vec::new();
        };
        let document = scraper::Html::parse_document(&self.html);
        document
            .select(&selector)
            .map(|el| FragmentCard::capture(&el))
            .collect()
    }

    async fn viewport(&self) -> Viewport {
        Viewport {
            scroll_offset: *self.offset.lock().expect("offset lock"),
            viewport_height: self.viewport_height,
            document_height: self.document_height,
        }
    }

    async fn scroll_by(&self, pixels: f64) {
        let mut offset = self.offset.lock().expect("offset lock");
        *offset = (*offset + pixels).clamp(0.0, self.max_offset());
    }

    async fn scroll_to_bottom(&self) {
        *self.offset.lock().expect("offset lock") = self.max_offset();
    }

    async fn current_url(&self) -> Url {
        self.page_url.clone()
    }
}
