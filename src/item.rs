use serde::{Deserialize, Serialize};

/// Name used when no name selector matches a card.
pub const UNKNOWN_NAME: &str = "unknown product";

/// Price used when neither the price selectors nor the textual price
/// pattern match a card.
pub const UNKNOWN_PRICE: &str = "price unknown";

/// One harvested catalog listing
///
/// `id` is the dedup key for a run: the site-native identifier when one was
/// extractable, otherwise a synthesized `unknown-{ordinal}` placeholder that
/// is unique within the run but not stable across runs. `price` is kept as
/// display text (currency suffix included) — the catalog formats it for
/// humans and downstream consumers re-export it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedItem {
    pub id: String,
    pub name: String,
    pub price: String,
    /// Absolute listing URL, or the catalog page URL when the card had no link.
    pub url: String,
}

impl CollectedItem {
    /// Whether the id was synthesized rather than read off the site.
    pub fn has_synthetic_id(&self) -> bool {
        self.id.starts_with("unknown-")
    }
}

/// Placeholder id for a card that exposed no native identifier.
pub(crate) fn synthetic_id(ordinal: u64) -> String {
    format!("unknown-{ordinal}")
}
