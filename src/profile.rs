//! Site knowledge: which selectors and patterns describe a catalog layout
//!
//! The collection loop itself knows nothing about any site. Everything
//! layout-specific — where the cards live, where a card keeps its name and
//! price, how a native identifier looks — is data carried by a
//! [`SiteProfile`], so another catalog layout in the same family is a new
//! profile, not new code.

use regex::Regex;

use crate::ConfigError;

/// Ordered selector lists and patterns for one catalog layout
///
/// Each selector list is a fallback chain tried in priority order: the
/// first hit wins and later, broader selectors are only consulted when the
/// specific ones miss. Profiles are validated when a
/// [`Collector`](crate::Collector) is built, so a selector typo fails fast
/// instead of silently matching nothing for a whole run.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Card containers, most specific first (spec'd paginator container
    /// down to the generic card class).
    pub container_selectors: Vec<String>,
    /// Name sources within a card, most specific first.
    pub name_selectors: Vec<String>,
    /// Price sources within a card, most specific first.
    pub price_selectors: Vec<String>,
    /// Attribute on the card carrying the site-native identifier.
    pub id_attribute: String,
    /// Fallback: pattern whose first capture group extracts an identifier
    /// from the card's primary link URL.
    pub id_url_pattern: Regex,
    /// Last-resort price match against the card's full text.
    pub price_text_pattern: Regex,
}

impl SiteProfile {
    /// Profile for the Ozon catalog family
    ///
    /// Covers the paginated search-results widget layouts and plain tile
    /// grids; identifiers are the `data-sku` attribute or a 5+ digit token
    /// in the product URL, prices are rouble-suffixed display strings.
    pub fn ozon() -> Self {
        Self {
            container_selectors: vec![
                r#"[data-widget="megaPaginator"] .tile"#.to_string(),
                r#"[data-widget^="searchResults"] .tile"#.to_string(),
                ".widget-search-result .tile".to_string(),
                ".tile".to_string(),
            ],
            name_selectors: vec![
                ".tile-title".to_string(),
                ".title".to_string(),
                ".tile-name".to_string(),
                r#"[data-widget="webProductHeading"] span"#.to_string(),
                "a span".to_string(),
                "h2".to_string(),
                "h3".to_string(),
            ],
            price_selectors: vec![
                r#"[data-widget="webPrice"]"#.to_string(),
                r#"[data-widget="price"]"#.to_string(),
                ".tile-price".to_string(),
                ".price".to_string(),
                ".widget-price".to_string(),
                r#"[class*="price"]"#.to_string(),
            ],
            id_attribute: "data-sku".to_string(),
            id_url_pattern: Regex::new(r"(?:/|sku=)(\d{5,})").expect("static pattern"),
            price_text_pattern: Regex::new(r"\d[\d\s\x{00A0}]*\s?₽").expect("static pattern"),
        }
    }

    /// Check that every selector list is usable
    ///
    /// Rejects empty chains and CSS that scraper cannot parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lists = [
            ("container_selectors", &self.container_selectors),
            ("name_selectors", &self.name_selectors),
            ("price_selectors", &self.price_selectors),
        ];
        for (name, selectors) in lists {
            if selectors.is_empty() {
                return Err(ConfigError::EmptySelectorList(name));
            }
            for selector in selectors {
                if let Err(e) = scraper::Selector::parse(selector) {
                    return Err(ConfigError::InvalidSelector {
                        selector: selector.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::ozon()
    }
}
