//! Infinite-scroll paging over a [`PagedLister`].
//!
//! The pager is `IDLE -> FETCHING -> IDLE` per page.  While a fetch is in
//! flight further `next_page` calls return [`PageOutcome::Busy`] without any
//! I/O, so a burst of scroll events loads one page, not several.

use crate::onedrive::error::ListFailure;
use crate::onedrive::lister::PagedLister;
use crate::onedrive::types::FilesPage;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Scroll position (percent) past which the next page is requested.
pub const SCROLL_FETCH_THRESHOLD: f64 = 98.0;

/// Result of a `next_page` call.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// A page was fetched.
    Page(FilesPage),
    /// Another fetch is still in flight; nothing was requested.
    Busy,
    /// The previous page carried no continuation cursor.
    Exhausted,
}

#[derive(Debug, Default)]
struct PagerState {
    cursor: Option<String>,
    exhausted: bool,
    pages_loaded: usize,
    /// Bumped by `reset`; a fetch started under an older value is stale.
    generation: u64,
}

/// Caller-side paging state for one folder view.
pub struct ScrollPager<'a> {
    lister: PagedLister<'a>,
    library_name: String,
    folder_path: Option<String>,
    accepted_extensions: Option<Vec<String>>,
    in_flight: AtomicBool,
    state: Mutex<PagerState>,
}

/// Clears the in-flight flag on every exit path.
struct InFlight<'g>(&'g AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<'a> ScrollPager<'a> {
    pub fn new(
        lister: PagedLister<'a>,
        library_name: &str,
        folder_path: Option<&str>,
        accepted_extensions: Option<Vec<String>>,
    ) -> Self {
        Self {
            lister,
            library_name: library_name.to_string(),
            folder_path: folder_path.map(String::from),
            accepted_extensions,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(PagerState::default()),
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Whether another page may exist.
    pub async fn has_more(&self) -> bool {
        !self.state.lock().await.exhausted
    }

    pub async fn pages_loaded(&self) -> usize {
        self.state.lock().await.pages_loaded
    }

    /// Fetch the next page.  A failed fetch leaves the cursor untouched so
    /// the same page can be requested again.
    ///
    /// A page whose fetch straddles a `reset` is still returned, but it does
    /// not move the cursor of the restarted view.
    pub async fn next_page(&self) -> Result<PageOutcome, ListFailure> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Page fetch for '{}' already in flight", self.library_name);
            return Ok(PageOutcome::Busy);
        }
        let _guard = InFlight(&self.in_flight);

        let (cursor, generation) = {
            let state = self.state.lock().await;
            if state.exhausted {
                return Ok(PageOutcome::Exhausted);
            }
            (state.cursor.clone(), state.generation)
        };

        let extensions: Option<Vec<&str>> = self
            .accepted_extensions
            .as_ref()
            .map(|exts| exts.iter().map(String::as_str).collect());

        let page = self
            .lister
            .list_page(
                &self.library_name,
                self.folder_path.as_deref(),
                extensions.as_deref(),
                cursor.as_deref(),
            )
            .await?;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(
                "Pager for '{}' was reset during fetch, cursor not advanced",
                self.library_name
            );
            return Ok(PageOutcome::Page(page));
        }
        state.pages_loaded += 1;
        state.cursor = page.next_href.clone();
        state.exhausted = page.next_href.is_none();
        Ok(PageOutcome::Page(page))
    }

    /// Forget the cursor so the next call starts from the first page.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = PagerState {
            generation: state.generation.wrapping_add(1),
            ..PagerState::default()
        };
    }
}

/// How far down a scroll container is, in percent (0–100).
pub fn scroll_percent(scroll_top: f64, scroll_height: f64, client_height: f64) -> f64 {
    let scrollable = scroll_height - client_height;
    if scrollable <= 0.0 {
        return 100.0;
    }
    ((scroll_top / scrollable) * 100.0).clamp(0.0, 100.0)
}

pub fn should_fetch_more(percent: f64) -> bool {
    percent > SCROLL_FETCH_THRESHOLD
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_percent() {
        assert_eq!(scroll_percent(0.0, 1000.0, 500.0), 0.0);
        assert_eq!(scroll_percent(250.0, 1000.0, 500.0), 50.0);
        assert_eq!(scroll_percent(500.0, 1000.0, 500.0), 100.0);
        assert_eq!(scroll_percent(600.0, 1000.0, 500.0), 100.0);
    }

    #[test]
    fn test_scroll_percent_not_scrollable() {
        assert_eq!(scroll_percent(0.0, 400.0, 500.0), 100.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!should_fetch_more(98.0));
        assert!(should_fetch_more(98.5));
        assert!(!should_fetch_more(50.0));
    }

    #[test]
    fn test_guard_clears_flag() {
        let flag = AtomicBool::new(true);
        {
            let _g = InFlight(&flag);
        }
        assert!(!flag.load(Ordering::Acquire));
    }
}
