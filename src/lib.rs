//! Incremental harvester for infinite-scroll catalog pages
//!
//! Drives a catalog page that renders lazily as it is scrolled: snapshot
//! the currently-visible product cards, extract and dedup them by a stable
//! identifier, scroll, wait for the page to settle, and repeat until a
//! target count is met or the run stops making progress. Site knowledge
//! (selectors, identifier patterns) is configuration, and where the cards
//! come from — a live WebDriver session, a saved document — is a trait.

// Core modules
mod collector;
mod element;
mod error;
mod extract;
mod item;
mod page;
mod profile;
mod scroll;
mod session;
mod snapshot;

#[cfg(feature = "webdriver")]
mod webdriver;

// Public exports
pub use collector::{
    CollectObserver, CollectStats, Collector, CollectorBuilder, Harvest, ObserverRegistry,
    ProgressFn, StopReason,
};
pub use element::{CardElement, FragmentCard};
pub use error::{CardError, CollectError, ConfigError};
pub use extract::ItemExtractor;
pub use item::{CollectedItem, UNKNOWN_NAME, UNKNOWN_PRICE};
pub use page::{CatalogPage, StaticCatalog, Viewport};
pub use profile::SiteProfile;
pub use scroll::{ProgressiveScroller, ScrollTiming};
pub use session::{MAX_DESIRED_COUNT, RunSettings, normalize_url, same_url};
pub use snapshot::SnapshotReader;

#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverCatalog;
