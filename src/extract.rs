//! Per-card field resolution: fallback chains, pattern rescue, sentinels
//!
//! Extraction never fails a run. Every field degrades independently — a
//! missing name becomes a sentinel, a missing price falls back to a text
//! pattern and then a sentinel, a missing identifier is synthesized — and
//! only a card whose backend refuses to be read at all is skipped.

use url::Url;

use crate::item::{CollectedItem, UNKNOWN_NAME, UNKNOWN_PRICE, synthetic_id};
use crate::{CardElement, CardError, SiteProfile};

/// Maps one card element to a normalized [`CollectedItem`]
pub struct ItemExtractor<'p> {
    profile: &'p SiteProfile,
}

impl<'p> ItemExtractor<'p> {
    pub fn new(profile: &'p SiteProfile) -> Self {
        Self { profile }
    }

    /// Extract a card, or `None` if its backend failed mid-read
    ///
    /// `fallback_ordinal` seeds the synthesized identifier when the card
    /// exposes no native one; the caller hands out a fresh ordinal per card
    /// so synthesized ids never collide within a run.
    pub fn extract<E: CardElement>(
        &self,
        card: &E,
        fallback_ordinal: u64,
        page_url: &Url,
    ) -> Option<CollectedItem> {
        match self.try_extract(card, fallback_ordinal, page_url) {
            Ok(item) => Some(item),
            Err(error) => {
                tracing::debug!(%error, fallback_ordinal, "skipping unreadable card");
                None
            }
        }
    }

    fn try_extract<E: CardElement>(
        &self,
        card: &E,
        fallback_ordinal: u64,
        page_url: &Url,
    ) -> Result<CollectedItem, CardError> {
        let link = card.select_first("a[href]")?;
        let href = match &link {
            Some(link) => link.attr("href")?,
            None => None,
        };

        Ok(CollectedItem {
            id: self.resolve_id(card, href.as_deref(), fallback_ordinal)?,
            name: self.resolve_name(card)?,
            price: self.resolve_price(card)?,
            url: resolve_url(href.as_deref(), page_url),
        })
    }

    /// Native attribute, then a long numeric token in the link URL, then a
    /// synthesized placeholder.
    fn resolve_id<E: CardElement>(
        &self,
        card: &E,
        href: Option<&str>,
        fallback_ordinal: u64,
    ) -> Result<String, CardError> {
        if let Some(native) = card.attr(&self.profile.id_attribute)? {
            let native = native.trim();
            if !native.is_empty() {
                return Ok(native.to_string());
            }
        }

        if let Some(href) = href
            && let Some(captures) = self.profile.id_url_pattern.captures(href)
            && let Some(token) = captures.get(1)
        {
            return Ok(token.as_str().to_string());
        }

        Ok(synthetic_id(fallback_ordinal))
    }

    fn resolve_name<E: CardElement>(&self, card: &E) -> Result<String, CardError> {
        for selector in &self.profile.name_selectors {
            if let Some(el) = card.select_first(selector)? {
                let text = el.text()?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Ok(trimmed.to_string());
                }
            }
        }
        Ok(UNKNOWN_NAME.to_string())
    }

    fn resolve_price<E: CardElement>(&self, card: &E) -> Result<String, CardError> {
        for selector in &self.profile.price_selectors {
            if let Some(el) = card.select_first(selector)? {
                let text = collapse_whitespace(&el.text()?);
                if !text.is_empty() {
                    return Ok(text);
                }
            }
        }

        // No dedicated price node; scan the card's full text for a
        // currency-suffixed amount
        let full_text = card.text()?;
        if let Some(found) = self.profile.price_text_pattern.find(&full_text) {
            return Ok(collapse_whitespace(found.as_str()));
        }

        Ok(UNKNOWN_PRICE.to_string())
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn resolve_url(href: Option<&str>, page_url: &Url) -> String {
    match href {
        Some(href) => page_url
            .join(href)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| page_url.to_string()),
        None => page_url.to_string(),
    }
}
