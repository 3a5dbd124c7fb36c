//! Simulated infinite-scroll catalog for integration tests
//!
//! The page is a sequence of HTML chunks. Only the first chunk is rendered
//! at the start; scrolling to within the lazy-load threshold of the bottom
//! reveals the next chunk and grows the document, the way a real catalog's
//! lazy loader behaves. All timing still flows through the collector's own
//! settle waits, so tests run under tokio's paused clock.

use async_trait::async_trait;
use scrollect::{CatalogPage, FragmentCard, Viewport};
use std::sync::Mutex;
use url::Url;

pub const VIEWPORT_HEIGHT: f64 = 600.0;
pub const CHUNK_HEIGHT: f64 = 1200.0;
const LAZY_LOAD_THRESHOLD: f64 = 20.0;

pub struct SimCatalog {
    chunks: Vec<String>,
    page_url: Url,
    state: Mutex<SimState>,
}

struct SimState {
    offset: f64,
    revealed: usize,
}

impl SimCatalog {
    pub fn new(chunks: Vec<String>) -> Self {
        let revealed = chunks.len().min(1);
        Self {
            chunks,
            page_url: Url::parse("https://www.ozon.ru/category/test/").expect("static url"),
            state: Mutex::new(SimState {
                offset: 0.0,
                revealed,
            }),
        }
    }

    fn document_height(revealed: usize) -> f64 {
        (revealed.max(1) as f64) * CHUNK_HEIGHT
    }

    fn advance_offset(&self, target_offset: f64) {
        let mut state = self.state.lock().expect("sim lock");
        let doc = Self::document_height(state.revealed);
        let max = (doc - VIEWPORT_HEIGHT).max(0.0);
        state.offset = target_offset.clamp(0.0, max);

        let near_bottom =
            state.offset + VIEWPORT_HEIGHT >= doc - LAZY_LOAD_THRESHOLD;
        if near_bottom && state.revealed < self.chunks.len() {
            state.revealed += 1;
        }
    }
}

#[async_trait]
impl CatalogPage for SimCatalog {
    async fn query_cards(&self, selector: &str) -> Vec<FragmentCard> {
        let revealed = self.state.lock().expect("sim lock").revealed;
        let html = self.chunks[..revealed.min(self.chunks.len())].join("\n");

        let Ok(selector) = scraper::Selector::parse(selector) else {
            return Vec::new();
        };
        let document = scraper::Html::parse_document(&html);
        document
            .select(&selector)
            .map(|el| FragmentCard::capture(&el))
            .collect()
    }

    async fn viewport(&self) -> Viewport {
        let state = self.state.lock().expect("sim lock");
        Viewport {
            scroll_offset: state.offset,
            viewport_height: VIEWPORT_HEIGHT,
            document_height: Self::document_height(state.revealed),
        }
    }

    async fn scroll_by(&self, pixels: f64) {
        let current = self.state.lock().expect("sim lock").offset;
        self.advance_offset(current + pixels);
    }

    async fn scroll_to_bottom(&self) {
        self.advance_offset(f64::MAX);
    }

    async fn current_url(&self) -> Url {
        self.page_url.clone()
    }
}

/// One product tile with a native identifier.
pub fn card(sku: &str, name: &str, price: &str) -> String {
    format!(
        r#"<div class="tile" data-sku="{sku}">
            <a href="/product/item-{sku}/"><span class="tile-title">{name}</span></a>
            <div class="tile-price">{price}</div>
        </div>"#
    )
}

/// A tile exposing neither an id attribute nor a usable link token.
pub fn anonymous_card(name: &str) -> String {
    format!(r#"<div class="tile"><h3>{name}</h3></div>"#)
}

/// Wrap tiles in the paginated-results container.
pub fn chunk(cards: &[String]) -> String {
    format!(
        r#"<div data-widget="megaPaginator">{}</div>"#,
        cards.join("\n")
    )
}

/// `count` unique cards with ids starting at `first_sku`.
pub fn unique_cards(first_sku: u64, count: usize) -> Vec<String> {
    (0..count as u64)
        .map(|i| {
            let sku = first_sku + i;
            card(&sku.to_string(), &format!("Product {sku}"), "1 299 ₽")
        })
        .collect()
}
