//! Error types for configuration, collection runs, and card access
//!
//! The one fatal collection outcome is an empty result: a run that never
//! finds a single card fails with [`CollectError::NoItemsFound`]. Everything
//! smaller — a card that cannot be read, a cycle that discovers nothing —
//! is absorbed and reflected only in the size of the partial result.

/// Errors raised while building a [`Collector`](crate::Collector) or
/// validating a [`SiteProfile`](crate::SiteProfile)
///
/// Configuration problems surface at build time, never mid-run. A profile
/// with a selector that does not parse is rejected before the first cycle.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A selector list in the profile is empty
    ///
    /// Every fallback chain needs at least one selector to try.
    #[error("Selector list '{0}' must not be empty")]
    EmptySelectorList(&'static str),

    /// A CSS selector in the profile failed to parse
    #[error("Failed to parse selector '{selector}': {error}")]
    InvalidSelector { selector: String, error: String },

    /// The stagnation budget must allow at least one no-progress cycle
    #[error("Stagnation budget must be greater than 0, got {0}")]
    InvalidStagnationBudget(usize),
}

/// Errors surfaced by a collection run
///
/// # Examples
///
/// ```ignore
/// match collector.collect(&page, 50).await {
///     Ok(harvest) => println!("collected {}", harvest.items.len()),
///     Err(CollectError::NoItemsFound { attempts }) => {
///         eprintln!("nothing matched after {attempts} attempts — wrong page?");
///     }
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The page never yielded a single card across the whole run
    ///
    /// Distinguishable from a small-but-valid partial result: zero items
    /// usually means the wrong page or a dead selector set.
    #[error(
        "No items found on the page after {attempts} scroll attempts; check that the page matches the configured selectors"
    )]
    NoItemsFound { attempts: usize },

    /// A run is already active on this collector
    ///
    /// Runs are strictly one at a time; the losing invocation gets this
    /// error and the active run is unaffected.
    #[error("A collection run is already in progress")]
    RunInProgress,

    /// The requested target count was zero
    #[error("Target count must be greater than 0")]
    InvalidTarget,
}

/// A failure while reading a single card element
///
/// Raised by [`CardElement`](crate::CardElement) implementations whose
/// backing store can disappear under them (a detached live node, a dropped
/// session). The extractor converts it into a skipped card.
#[derive(Debug, thiserror::Error)]
#[error("Card access failed: {0}")]
pub struct CardError(pub String);

impl CardError {
    pub fn detached() -> Self {
        Self("element is no longer attached to the document".to_string())
    }
}
