//! Card-handle abstraction over the catalog DOM
//!
//! A snapshot hands the extractor opaque card handles. The [`CardElement`]
//! trait is the seam: scraper-backed handles serve parsed documents, and
//! [`FragmentCard`] carries an owned copy of one card subtree so async page
//! backends can materialize a snapshot once and let extraction stay
//! synchronous.

use std::hash::{Hash, Hasher};

use crate::CardError;

/// A handle to one candidate card element in the catalog
///
/// Access methods are fallible: a backend whose nodes can detach mid-run
/// (a live browser session) surfaces that as [`CardError`], and the
/// extractor responds by skipping the card rather than aborting the run.
/// An invalid CSS selector is not an error — it matches nothing.
pub trait CardElement {
    /// Select the first descendant matching the CSS selector.
    fn select_first(&self, selector: &str) -> Result<Option<Self>, CardError>
    where
        Self: Sized;

    /// Text content of this element, descendants included.
    fn text(&self) -> Result<String, CardError>;

    /// Value of an HTML attribute on this element, if present.
    fn attr(&self, name: &str) -> Result<Option<String>, CardError>;

    /// Identity of the underlying node, stable within one snapshot
    ///
    /// Used to drop a card that more than one container selector matched.
    fn node_key(&self) -> u64;
}

impl CardElement for scraper::ElementRef<'_> {
    fn select_first(&self, selector: &str) -> Result<Option<Self>, CardError> {
        let Ok(selector) = scraper::Selector::parse(selector) else {
            return Ok(None);
        };
        Ok(self.select(&selector).next())
    }

    fn text(&self) -> Result<String, CardError> {
        Ok(self.text().collect())
    }

    fn attr(&self, name: &str) -> Result<Option<String>, CardError> {
        Ok(self.value().attr(name).map(str::to_string))
    }

    fn node_key(&self) -> u64 {
        hash_of(&self.id())
    }
}

/// An owned snapshot of one card subtree
///
/// Holds the card's outer HTML and re-parses it on access. Backends that
/// read the document asynchronously (WebDriver, remote browsers) produce
/// these so the collection loop never suspends inside extraction.
#[derive(Debug, Clone)]
pub struct FragmentCard {
    html: String,
    key: u64,
}

impl FragmentCard {
    /// Wrap a card's outer HTML under a caller-chosen node key.
    pub fn new(html: impl Into<String>, key: u64) -> Self {
        Self {
            html: html.into(),
            key,
        }
    }

    /// Capture a parsed element as an owned fragment.
    pub fn capture(element: &scraper::ElementRef<'_>) -> Self {
        Self {
            html: element.html(),
            key: hash_of(&element.id()),
        }
    }

    /// The raw outer HTML this card was captured with.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Run `f` against the card element of the re-parsed fragment.
    fn with_element<T>(
        &self,
        f: impl FnOnce(&scraper::ElementRef<'_>) -> T,
    ) -> Result<T, CardError> {
        let fragment = scraper::Html::parse_fragment(&self.html);
        let root = fragment.root_element();
        // parse_fragment wraps the card in a synthetic root; the card is its
        // first element child
        let card = root
            .child_elements()
            .next()
            .ok_or_else(|| CardError("fragment holds no element".to_string()))?;
        Ok(f(&card))
    }
}

impl CardElement for FragmentCard {
    fn select_first(&self, selector: &str) -> Result<Option<Self>, CardError> {
        let key = self.key;
        self.with_element(|card| {
            let Ok(selector) = scraper::Selector::parse(selector) else {
                return None;
            };
            card.select(&selector).next().map(|el| Self {
                html: el.html(),
                key: hash_of(&(key, el.id())),
            })
        })
    }

    fn text(&self) -> Result<String, CardError> {
        self.with_element(|card| card.text().collect())
    }

    fn attr(&self, name: &str) -> Result<Option<String>, CardError> {
        self.with_element(|card| card.value().attr(name).map(str::to_string))
    }

    fn node_key(&self) -> u64 {
        self.key
    }
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
