//! Paginated retrieval of the full directory roster.

use std::sync::Arc;

use tracing::debug;

use super::Roster;
use super::ports::{PageRequest, RosterSource, RosterSourceError};

/// Page size requested from the directory service.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Fetches every directory entry by walking the listing page by page.
pub struct RosterClient {
    source: Arc<dyn RosterSource>,
    page_size: usize,
}

impl RosterClient {
    /// Build a client requesting [`DEFAULT_PAGE_SIZE`] entries per page.
    #[must_use]
    pub fn new(source: Arc<dyn RosterSource>) -> Self {
        Self::with_page_size(source, DEFAULT_PAGE_SIZE)
    }

    /// Build a client with an explicit page size (minimum one).
    #[must_use]
    pub fn with_page_size(source: Arc<dyn RosterSource>, page_size: usize) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
        }
    }

    /// Configured page size.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetch the complete roster.
    ///
    /// Pages are requested from offset zero until one comes back shorter than
    /// the page size. There are no retries.
    ///
    /// # Errors
    ///
    /// Returns the first page failure; entries from earlier pages are
    /// discarded so a partial roster never escapes.
    pub async fn fetch_all(&self) -> Result<Roster, RosterSourceError> {
        let mut roster = Roster::new();
        let mut start_index = 0_usize;

        loop {
            let page = self
                .source
                .fetch_page(PageRequest {
                    start_index,
                    max_results: self.page_size,
                })
                .await?;
            let fetched = page.len();
            debug!(start_index, fetched, "fetched roster page");
            roster.extend(page);

            if fetched < self.page_size {
                break;
            }
            start_index = start_index.saturating_add(self.page_size);
        }

        Ok(roster)
    }
}
