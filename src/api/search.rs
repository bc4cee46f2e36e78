//! Paging within the search index's result window.
//!
//! The index refuses any request whose `from + size` exceeds its
//! `max_result_window`. Browse views therefore clamp the last page and stop
//! offering pages past the window, even when the hit count is larger.

/// Default `index.max_result_window` of the search index.
pub const DEFAULT_MAX_RESULT_WINDOW: u64 = 10_000;

/// A `from`/`size` pair that the index will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Offset of the first hit.
    pub from: u64,
    /// Number of hits requested.
    pub size: u64,
}

/// Result-window limits for one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultWindow {
    max_window: u64,
}

impl Default for ResultWindow {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESULT_WINDOW)
    }
}

impl ResultWindow {
    /// Create a window capped at `max_window` hits.
    #[must_use]
    pub const fn new(max_window: u64) -> Self {
        Self { max_window }
    }

    /// Largest `from + size` the index accepts.
    #[must_use]
    pub const fn max_window(&self) -> u64 {
        self.max_window
    }

    /// Request for the 1-based `page` of `size` hits.
    ///
    /// The last reachable page is shortened to end at the window. Returns
    /// `None` for page 0, a zero size, or a page starting past the window.
    #[must_use]
    pub fn page(&self, page: u64, size: u64) -> Option<PageRequest> {
        if page == 0 || size == 0 {
            return None;
        }
        let from = (page - 1).checked_mul(size)?;
        if from >= self.max_window {
            return None;
        }
        Some(PageRequest { from, size: size.min(self.max_window - from) })
    }

    /// Number of hits that can actually be paged through.
    #[must_use]
    pub fn reachable_total(&self, total: u64) -> u64 {
        total.min(self.max_window)
    }

    /// Last page number worth offering for `total` hits, 0 when there are none.
    #[must_use]
    pub fn last_page(&self, total: u64, size: u64) -> u64 {
        if size == 0 {
            return 0;
        }
        self.reachable_total(total).div_ceil(size)
    }

    /// Whether `total` hits exceed what paging can reach.
    #[must_use]
    pub fn is_truncated(&self, total: u64) -> bool {
        total > self.max_window
    }
}
