//! The collection state machine
//!
//! A run is a sequential loop of cycles — snapshot the page, extract and
//! merge every candidate card, report progress, then scroll and settle —
//! bounded by three budgets: the target count, an attempt ceiling derived
//! from it, and a stagnation allowance for consecutive cycles that discover
//! nothing new. Exhausting a budget is not an error; it ends the run with
//! whatever was gathered. Only a run that never finds a single card fails.
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```ignore
//! use scrollect::{Collector, SiteProfile, StaticCatalog};
//!
//! let collector = Collector::builder()
//!     .profile(SiteProfile::ozon())
//!     .build()?;
//!
//! let harvest = collector.collect(&page, 100).await?;
//! println!("collected {} of 100", harvest.items.len());
//! ```
//!
//! ## With a progress callback
//!
//! ```ignore
//! use scrollect::ProgressFn;
//! use std::sync::Arc;
//!
//! let collector = Collector::builder()
//!     .observe_with(Arc::new(ProgressFn(|collected, target| {
//!         println!("{collected} / {target}");
//!     })))
//!     .build()?;
//! ```
//!
//! ## With cancellation
//!
//! ```ignore
//! use tokio_util::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let harvest = collector
//!     .collect_with_cancellation(&page, 100, token.clone())
//!     .await?;
//! ```

use std::collections::HashSet;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    CatalogPage, CollectError, CollectedItem, ConfigError, ItemExtractor, ProgressiveScroller,
    ScrollTiming, SiteProfile, SnapshotReader,
};

const DEFAULT_MAX_STAGNATION: usize = 20;
const DEFAULT_INITIAL_SETTLE: Duration = Duration::from_millis(400);
const MIN_ATTEMPT_BUDGET: usize = 80;
const MAX_ATTEMPT_BUDGET: usize = 600;

/// Scroll-attempt ceiling for a run: twice the target, kept within fixed
/// bounds so tiny targets still get room and huge ones cannot run forever.
fn attempt_budget(target: usize) -> usize {
    target
        .saturating_mul(2)
        .clamp(MIN_ATTEMPT_BUDGET, MAX_ATTEMPT_BUDGET)
}

/// Why a run stopped
///
/// Every variant except the caller seeing [`CollectError`] carries a valid
/// (possibly partial) result. Callers distinguish "met target" from "gave
/// up early" through this reason and the returned count, not through
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The target count was reached.
    TargetReached,
    /// Too many consecutive cycles discovered no new identifier.
    Stagnated,
    /// The scroll-attempt budget ran out.
    AttemptsExhausted,
    /// The caller's cancellation token fired mid-run.
    Cancelled,
}

/// Terminal result of a collection run
#[derive(Debug, Clone)]
pub struct Harvest {
    /// Collected items in discovery order, truncated to the target count.
    pub items: Vec<CollectedItem>,
    pub stop: StopReason,
    /// Scroll attempts spent.
    pub attempts_used: usize,
    /// Snapshot/extract cycles run.
    pub cycles: usize,
}

impl Harvest {
    /// Whether the run gathered as many items as requested.
    pub fn met_target(&self) -> bool {
        self.stop == StopReason::TargetReached
    }
}

/// Observer trait for receiving collection events
///
/// All methods default to no-ops; implement the ones you care about.
///
/// # Example
///
/// ```ignore
/// struct LoggingObserver;
///
/// #[async_trait::async_trait]
/// impl CollectObserver for LoggingObserver {
///     async fn on_cycle(&self, collected: usize, target: usize) {
///         println!("{collected} / {target}");
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait CollectObserver: Send + Sync {
    /// Called after every cycle with the running total and the target.
    async fn on_cycle(&self, _collected: usize, _target: usize) {}

    /// Called when a new unique item enters the collection.
    async fn on_item_collected(&self, _item: &CollectedItem) {}

    /// Called once with the terminal harvest of a successful run.
    async fn on_run_complete(&self, _harvest: &Harvest) {}
}

/// Adapts a plain closure to the per-cycle progress callback.
pub struct ProgressFn<F>(pub F)
where
    F: Fn(usize, usize) + Send + Sync;

#[async_trait::async_trait]
impl<F> CollectObserver for ProgressFn<F>
where
    F: Fn(usize, usize) + Send + Sync,
{
    async fn on_cycle(&self, collected: usize, target: usize) {
        (self.0)(collected, target)
    }
}

/// Registry for managing multiple collect observers
pub struct ObserverRegistry {
    observers: Vec<Arc<dyn CollectObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn register(&mut self, observer: Arc<dyn CollectObserver>) {
        self.observers.push(observer);
    }

    pub async fn notify_cycle(&self, collected: usize, target: usize) {
        for observer in &self.observers {
            observer.on_cycle(collected, target).await;
        }
    }

    pub async fn notify_item_collected(&self, item: &CollectedItem) {
        for observer in &self.observers {
            observer.on_item_collected(item).await;
        }
    }

    pub async fn notify_run_complete(&self, harvest: &Harvest) {
        for observer in &self.observers {
            observer.on_run_complete(harvest).await;
        }
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters for one collection run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub cycles: usize,
    /// Candidate cards seen across all snapshots, duplicates included.
    pub cards_seen: usize,
    pub items_collected: usize,
    pub duplicates_skipped: usize,
    /// Cards skipped because their backend failed mid-read.
    pub extraction_failures: usize,
}

/// Thread-safe run counters with watch-channel broadcasting
struct StatsTracker {
    cycles: AtomicUsize,
    cards_seen: AtomicUsize,
    items_collected: AtomicUsize,
    duplicates_skipped: AtomicUsize,
    extraction_failures: AtomicUsize,
    tx: watch::Sender<CollectStats>,
}

impl StatsTracker {
    fn new() -> Self {
        Self {
            cycles: AtomicUsize::new(0),
            cards_seen: AtomicUsize::new(0),
            items_collected: AtomicUsize::new(0),
            duplicates_skipped: AtomicUsize::new(0),
            extraction_failures: AtomicUsize::new(0),
            tx: watch::channel(CollectStats::default()).0,
        }
    }

    fn reset(&self) {
        // counters are informational; relaxed ordering is enough
        self.cycles.store(0, Ordering::Relaxed);
        self.cards_seen.store(0, Ordering::Relaxed);
        self.items_collected.store(0, Ordering::Relaxed);
        self.duplicates_skipped.store(0, Ordering::Relaxed);
        self.extraction_failures.store(0, Ordering::Relaxed);
        self.broadcast();
    }

    fn cycle_finished(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.broadcast();
    }

    fn card_seen(&self) {
        self.cards_seen.fetch_add(1, Ordering::Relaxed);
        self.broadcast();
    }

    fn item_collected(&self) {
        self.items_collected.fetch_add(1, Ordering::Relaxed);
        self.broadcast();
    }

    fn duplicate_skipped(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
        self.broadcast();
    }

    fn extraction_failed(&self) {
        self.extraction_failures.fetch_add(1, Ordering::Relaxed);
        self.broadcast();
    }

    fn broadcast(&self) {
        self.tx.send_replace(self.snapshot());
    }

    fn snapshot(&self) -> CollectStats {
        CollectStats {
            cycles: self.cycles.load(Ordering::Relaxed),
            cards_seen: self.cards_seen.load(Ordering::Relaxed),
            items_collected: self.items_collected.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
        }
    }

    fn subscribe(&self) -> watch::Receiver<CollectStats> {
        self.tx.subscribe()
    }
}

/// Drops the run-in-progress flag when a run ends, however it ends.
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, CollectError> {
        if flag.swap(true, Ordering::SeqCst) {
            return Err(CollectError::RunInProgress);
        }
        Ok(Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Runs collection cycles against a [`CatalogPage`] until a budget or the
/// target ends the run
///
/// A collector is reusable: each `collect` call starts from fresh state.
/// Runs are strictly one at a time per collector.
pub struct Collector {
    profile: SiteProfile,
    timing: ScrollTiming,
    initial_settle: Duration,
    max_stagnation: usize,
    observers: Arc<ObserverRegistry>,
    stats: Arc<StatsTracker>,
    running: AtomicBool,
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("profile", &self.profile)
            .field("timing", &self.timing)
            .field("initial_settle", &self.initial_settle)
            .field("max_stagnation", &self.max_stagnation)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Collector {
    /// Create a collector with the default profile and timing.
    pub fn new() -> Self {
        Self::builder()
            .build()
            .expect("Default configuration should be valid")
    }

    /// Create a collector builder for custom configuration.
    pub fn builder() -> CollectorBuilder {
        CollectorBuilder::default()
    }

    /// Counters of the current (or most recent) run.
    pub fn stats(&self) -> CollectStats {
        self.stats.snapshot()
    }

    /// Subscribe to live counter updates.
    pub fn subscribe_stats(&self) -> watch::Receiver<CollectStats> {
        self.stats.subscribe()
    }

    /// Collect up to `target` unique items from `page`
    ///
    /// Returns the harvest in discovery order, truncated to `target`.
    /// Partial results are successes; see [`StopReason`]. Fails with
    /// [`CollectError::NoItemsFound`] only when the whole run produced
    /// nothing.
    pub async fn collect<P>(&self, page: &P, target: usize) -> Result<Harvest, CollectError>
    where
        P: CatalogPage + ?Sized,
    {
        self.collect_inner(page, target, None).await
    }

    /// Collect with a cancellation token
    ///
    /// Cancellation short-circuits the settle waits and returns the partial
    /// harvest with [`StopReason::Cancelled`] (or `NoItemsFound` when
    /// nothing had been collected yet).
    pub async fn collect_with_cancellation<P>(
        &self,
        page: &P,
        target: usize,
        cancel: CancellationToken,
    ) -> Result<Harvest, CollectError>
    where
        P: CatalogPage + ?Sized,
    {
        self.collect_inner(page, target, Some(cancel)).await
    }

    async fn collect_inner<P>(
        &self,
        page: &P,
        target: usize,
        cancel: Option<CancellationToken>,
    ) -> Result<Harvest, CollectError>
    where
        P: CatalogPage + ?Sized,
    {
        if target == 0 {
            return Err(CollectError::InvalidTarget);
        }
        let _guard = RunGuard::acquire(&self.running)?;
        self.stats.reset();

        let reader = SnapshotReader::new(&self.profile);
        let extractor = ItemExtractor::new(&self.profile);
        let scroller = ProgressiveScroller::new(self.timing.clone());

        let max_attempts = attempt_budget(target);
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut items: Vec<CollectedItem> = Vec::new();
        let mut attempts_used = 0;
        let mut stagnant_cycles = 0;
        let mut cycles = 0;
        let mut next_ordinal: u64 = 0;

        tracing::debug!(target, max_attempts, "starting collection run");

        // let the page finish its own initial load before the first read
        let cancelled = cancellable(sleep(self.initial_settle), &cancel).await;

        let stop = loop {
            if cancelled || cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                break StopReason::Cancelled;
            }
            if attempts_used >= max_attempts {
                break StopReason::AttemptsExhausted;
            }

            cycles += 1;
            let page_url = page.current_url().await;
            let cards = reader.snapshot(page).await;

            let mut added = 0;
            for card in &cards {
                self.stats.card_seen();
                let ordinal = next_ordinal;
                next_ordinal += 1;

                let Some(item) = extractor.extract(card, ordinal, &page_url) else {
                    self.stats.extraction_failed();
                    continue;
                };
                if seen_ids.insert(item.id.clone()) {
                    self.observers.notify_item_collected(&item).await;
                    self.stats.item_collected();
                    items.push(item);
                    added += 1;
                } else {
                    self.stats.duplicate_skipped();
                }
            }

            self.stats.cycle_finished();
            self.observers.notify_cycle(items.len(), target).await;
            tracing::debug!(cycle = cycles, collected = items.len(), added, "cycle finished");

            if items.len() >= target {
                break StopReason::TargetReached;
            }

            if added == 0 {
                stagnant_cycles += 1;
            } else {
                stagnant_cycles = 0;
            }
            if stagnant_cycles >= self.max_stagnation {
                tracing::debug!(stagnant_cycles, "no new items after repeated scrolls, stopping");
                break StopReason::Stagnated;
            }

            if cancellable(scroller.advance(page), &cancel).await {
                break StopReason::Cancelled;
            }
            attempts_used += 1;
        };

        if items.is_empty() {
            return Err(CollectError::NoItemsFound {
                attempts: attempts_used,
            });
        }

        items.truncate(target);
        let harvest = Harvest {
            items,
            stop,
            attempts_used,
            cycles,
        };
        self.observers.notify_run_complete(&harvest).await;
        Ok(harvest)
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `work` to completion unless `cancel` fires first; true means
/// cancelled.
async fn cancellable<F>(work: F, cancel: &Option<CancellationToken>) -> bool
where
    F: std::future::Future<Output = ()>,
{
    match cancel {
        Some(token) => {
            tokio::select! {
                _ = token.cancelled() => true,
                _ = work => false,
            }
        }
        None => {
            work.await;
            false
        }
    }
}

/// Builder for configuring a [`Collector`]
pub struct CollectorBuilder {
    profile: SiteProfile,
    timing: ScrollTiming,
    initial_settle: Duration,
    max_stagnation: usize,
    observers: Vec<Arc<dyn CollectObserver>>,
}

impl Default for CollectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectorBuilder {
    pub fn new() -> Self {
        Self {
            profile: SiteProfile::default(),
            timing: ScrollTiming::default(),
            initial_settle: DEFAULT_INITIAL_SETTLE,
            max_stagnation: DEFAULT_MAX_STAGNATION,
            observers: Vec::new(),
        }
    }

    /// Set the site profile (default: the Ozon catalog family).
    pub fn profile(mut self, profile: SiteProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the scroll timing knobs.
    pub fn scroll_timing(mut self, timing: ScrollTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Set the wait before the first cycle (default: 400ms).
    pub fn initial_settle(mut self, settle: Duration) -> Self {
        self.initial_settle = settle;
        self
    }

    /// Set how many consecutive no-progress cycles end a run (default: 20).
    pub fn max_stagnation(mut self, cycles: usize) -> Self {
        self.max_stagnation = cycles;
        self
    }

    /// Register an observer to receive collection events.
    pub fn observe_with(mut self, observer: Arc<dyn CollectObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Build the collector, validating the profile and budgets.
    pub fn build(self) -> Result<Collector, ConfigError> {
        self.profile.validate()?;
        if self.max_stagnation == 0 {
            return Err(ConfigError::InvalidStagnationBudget(0));
        }

        let mut registry = ObserverRegistry::new();
        for observer in self.observers {
            registry.register(observer);
        }

        Ok(Collector {
            profile: self.profile,
            timing: self.timing,
            initial_settle: self.initial_settle,
            max_stagnation: self.max_stagnation,
            observers: Arc::new(registry),
            stats: Arc::new(StatsTracker::new()),
            running: AtomicBool::new(false),
        })
    }
}
