//! Live-browser catalog backend over a WebDriver session
//!
//! Materializes each snapshot by pulling the matching elements' outer HTML
//! out of the browser, so the rest of the pipeline works on owned
//! [`FragmentCard`]s and never holds a live node across a scroll. Scrolling
//! and viewport metrics go through injected JavaScript, matching what the
//! catalog's own lazy-loader reacts to.

use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use thirtyfour::prelude::*;
use url::Url;

use crate::{CatalogPage, FragmentCard, Viewport};

const VIEWPORT_SCRIPT: &str = r#"
    return [window.scrollY, window.innerHeight, document.documentElement.scrollHeight];
"#;

/// A [`CatalogPage`] served by a running WebDriver session
///
/// The session must already be navigated to the catalog page; the collector
/// scrolls it in place and never navigates.
///
/// # Examples
///
/// ```ignore
/// use thirtyfour::prelude::*;
///
/// let caps = DesiredCapabilities::chrome();
/// let driver = WebDriver::new("http://localhost:9515", caps).await?;
/// driver.goto("https://www.ozon.ru/category/kettles/").await?;
///
/// let page = WebDriverCatalog::new(driver);
/// let harvest = collector.collect(&page, 100).await?;
/// ```
pub struct WebDriverCatalog {
    driver: WebDriver,
    last_url: Mutex<Url>,
}

impl WebDriverCatalog {
    pub fn new(driver: WebDriver) -> Self {
        // placeholder until the first successful current_url read
        let last_url = Mutex::new(Url::parse("about:blank").expect("static url"));
        Self { driver, last_url }
    }

    /// Hand the session back, e.g. to quit it.
    pub fn into_driver(self) -> WebDriver {
        self.driver
    }

    async fn run_script(&self, script: &str, args: Vec<serde_json::Value>) {
        if let Err(error) = self.driver.execute(script, args).await {
            tracing::warn!(%error, "scroll script failed");
        }
    }
}

#[async_trait]
impl CatalogPage for WebDriverCatalog {
    async fn query_cards(&self, selector: &str) -> Vec<FragmentCard> {
        let elements = match self.driver.find_all(By::Css(selector)).await {
            Ok(elements) => elements,
            Err(error) => {
                tracing::warn!(selector, %error, "element query failed");
                return Vec::new();
            }
        };

        let mut cards = Vec::with_capacity(elements.len());
        for element in elements {
            // element references are stable per node within a session, so
            // hashing the id gives a within-snapshot node key
            let mut hasher = std::hash::DefaultHasher::new();
            format!("{:?}", element.element_id()).hash(&mut hasher);
            let key = hasher.finish();

            match element.outer_html().await {
                Ok(html) => cards.push(FragmentCard::new(html, key)),
                Err(error) => {
                    tracing::debug!(%error, "skipping element that vanished mid-snapshot");
                }
            }
        }
        cards
    }

    async fn viewport(&self) -> Viewport {
        let metrics = match self.driver.execute(VIEWPORT_SCRIPT, Vec::new()).await {
            Ok(ret) => ret.convert::<(f64, f64, f64)>().ok(),
            Err(error) => {
                tracing::warn!(%error, "viewport metrics read failed");
                None
            }
        };
        let (scroll_offset, viewport_height, document_height) =
            metrics.unwrap_or((0.0, 0.0, 0.0));
        Viewport {
            scroll_offset,
            viewport_height,
            document_height,
        }
    }

    async fn scroll_by(&self, pixels: f64) {
        self.run_script(
            "window.scrollBy({top: arguments[0], behavior: 'smooth'});",
            vec![json!(pixels)],
        )
        .await;
    }

    async fn scroll_to_bottom(&self) {
        self.run_script(
            "window.scrollTo({top: document.documentElement.scrollHeight, behavior: 'smooth'});",
            Vec::new(),
        )
        .await;
    }

    async fn current_url(&self) -> Url {
        match self.driver.current_url().await {
            Ok(url) => {
                *self.last_url.lock().expect("url lock") = url.clone();
                url
            }
            // stale reads still need an absolutization base
            Err(_) => self.last_url.lock().expect("url lock").clone(),
        }
    }
}
