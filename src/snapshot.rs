//! One read of every candidate card currently in the document

use std::collections::HashSet;

use crate::{CardElement, CatalogPage, FragmentCard, SiteProfile};

/// Reads deduplicated card snapshots according to a profile's container
/// chain
///
/// Container selectors run in priority order; a card matched by an earlier,
/// more specific selector is not re-collected when a broader one matches it
/// again. The resulting order — selector priority, then document order — is
/// the within-cycle discovery order the collector preserves.
pub struct SnapshotReader<'p> {
    profile: &'p SiteProfile,
}

impl<'p> SnapshotReader<'p> {
    pub fn new(profile: &'p SiteProfile) -> Self {
        Self { profile }
    }

    /// Snapshot the page: all candidate cards, each appearing once.
    pub async fn snapshot<P: CatalogPage + ?Sized>(&self, page: &P) -> Vec<FragmentCard> {
        let mut seen_nodes = HashSet::new();
        let mut cards = Vec::new();
        for selector in &self.profile.container_selectors {
            for card in page.query_cards(selector).await {
                if seen_nodes.insert(card.node_key()) {
                    cards.push(card);
                }
            }
        }
        cards
    }
}
