//! # Team Selector
//!
//! Lazily pages through the teams that qualify for cache warming.
//!
//! Each page is a fresh `LIMIT/OFFSET` query ordered by team id. Paging stops
//! on an empty page, or right after yielding a page shorter than the page
//! size. The offset is not snapshot-isolated: teams crossing the threshold
//! mid-run may be skipped or seen twice, and the next run picks them up.

use futures::stream::{self, Stream};
use std::sync::Arc;
use tracing::debug;

use super::types::Page;
use crate::database::TeamStore;
use crate::error::Result;

/// Selects teams with at least `min_cohort_count` non-deleted cohorts
#[derive(Clone)]
pub struct TeamSelector {
    store: Arc<dyn TeamStore>,
    min_cohort_count: i64,
}

impl TeamSelector {
    pub fn new(store: Arc<dyn TeamStore>, min_cohort_count: i64) -> Self {
        Self {
            store,
            min_cohort_count,
        }
    }

    pub fn min_cohort_count(&self) -> i64 {
        self.min_cohort_count
    }

    /// Start a new pass over the qualifying teams from offset zero
    pub fn select_pages(&self, page_size: usize) -> TeamPager {
        TeamPager {
            store: Arc::clone(&self.store),
            min_cohort_count: self.min_cohort_count,
            page_size,
            offset: 0,
            exhausted: false,
        }
    }
}

/// One pass over the qualifying teams. Not resumable: a new pass starts over.
pub struct TeamPager {
    store: Arc<dyn TeamStore>,
    min_cohort_count: i64,
    page_size: usize,
    offset: usize,
    exhausted: bool,
}

impl TeamPager {
    /// Fetch the next page, or `None` once the pass is over
    pub async fn next_page(&mut self) -> Result<Option<Page>> {
        if self.exhausted || self.page_size == 0 {
            return Ok(None);
        }

        let page = self
            .store
            .fetch_qualifying_team_ids(self.min_cohort_count, self.offset, self.page_size)
            .await?;

        if page.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        debug!(
            offset = self.offset,
            page_size = self.page_size,
            teams_in_page = page.len(),
            "Fetched page of qualifying teams"
        );

        self.offset += self.page_size;
        // A short page is the last one
        if page.len() < self.page_size {
            self.exhausted = true;
        }

        Ok(Some(page))
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Adapt the pager into a stream of pages
    pub fn into_stream(self) -> impl Stream<Item = Result<Page>> + Send {
        stream::try_unfold(self, |mut pager| async move {
            let page = pager.next_page().await?;
            Ok(page.map(|page| (page, pager)))
        })
    }
}
