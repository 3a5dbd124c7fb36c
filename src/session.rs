//! The resumability boundary: what a host persists between navigations
//!
//! A collection run dies with its process, but the page it was driving may
//! come back after a navigation. [`RunSettings`] is the small record a host
//! keeps in its own store to decide whether to resume; the collector never
//! reads or writes that store itself. URL comparison is deliberately loose —
//! fragments and trailing slashes don't make a different page.

use serde::{Deserialize, Serialize};
use url::Url;

/// Largest target a host is allowed to ask for in one run.
pub const MAX_DESIRED_COUNT: usize = 5000;

/// Persisted description of an intended or interrupted run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    pub target_url: String,
    pub desired_count: usize,
    /// True while a run the host started has not reported a terminal state.
    pub collecting: bool,
}

impl RunSettings {
    /// New settings for a run about to start; the count is clamped to
    /// 1..=[`MAX_DESIRED_COUNT`].
    pub fn new(target_url: impl Into<String>, desired_count: usize) -> Self {
        Self {
            target_url: target_url.into(),
            desired_count: desired_count.clamp(1, MAX_DESIRED_COUNT),
            collecting: false,
        }
    }

    /// Whether `current_url` is the page these settings refer to.
    pub fn matches_page(&self, current_url: &str) -> bool {
        same_url(&self.target_url, current_url)
    }

    /// Whether an interrupted run should pick back up on `current_url`.
    pub fn should_resume(&self, current_url: &str) -> bool {
        self.collecting && self.matches_page(current_url)
    }
}

/// Normalize a URL for page-identity comparison
///
/// Drops the fragment and trims trailing path slashes (the root path keeps
/// its single slash). Strings that don't parse as URLs normalize to
/// themselves.
pub fn normalize_url(value: &str) -> String {
    let Ok(mut url) = Url::parse(value) else {
        return value.to_string();
    };
    url.set_fragment(None);
    if url.path() != "/" {
        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(if trimmed.is_empty() { "/" } else { &trimmed });
    }
    url.to_string()
}

/// Whether two URLs name the same page under [`normalize_url`].
pub fn same_url(a: &str, b: &str) -> bool {
    normalize_url(a) == normalize_url(b)
}
