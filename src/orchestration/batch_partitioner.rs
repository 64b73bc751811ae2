//! # Batch Partitioner
//!
//! Splits a page into the contiguous batches that become chains. Pure; no
//! reordering, and only the last batch may be short.

use crate::error::{Result, WarmerError};
use crate::TeamId;

/// Split `page` into chunks of at most `batch_size` teams.
///
/// A batch size of zero is treated as one.
pub fn partition(page: &[TeamId], batch_size: usize) -> Vec<&[TeamId]> {
    page.chunks(batch_size.max(1)).collect()
}

/// Number of batches `partition` produces for `team_count` teams
pub fn batch_count(team_count: usize, batch_size: usize) -> usize {
    team_count.div_ceil(batch_size.max(1))
}

/// Partitioner bound to the configured batch size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPartitioner {
    batch_size: usize,
}

impl BatchPartitioner {
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(WarmerError::validation(
                "batch_size",
                "must be greater than zero",
            ));
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn partition<'a>(&self, page: &'a [TeamId]) -> Vec<&'a [TeamId]> {
        partition(page, self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_batch_may_be_short() {
        let page = [1, 2, 3, 4, 5];
        assert_eq!(
            partition(&page, 2),
            vec![&[1, 2][..], &[3, 4][..], &[5][..]]
        );
    }

    #[test]
    fn test_batch_larger_than_page() {
        let page = [7];
        assert_eq!(partition(&page, 50), vec![&[7][..]]);
    }

    #[test]
    fn test_empty_page_has_no_batches() {
        assert!(partition(&[], 5).is_empty());
        assert_eq!(batch_count(0, 5), 0);
    }

    #[test]
    fn test_batch_counts() {
        for (teams, batch_size, expected) in [(10, 5, 2), (25, 10, 3), (1, 50, 1), (100, 25, 4)] {
            let page: Vec<i64> = (0..teams as i64).collect();
            assert_eq!(partition(&page, batch_size).len(), expected);
            assert_eq!(batch_count(teams, batch_size), expected);
        }
    }

    #[test]
    fn test_order_is_preserved() {
        let page = [9, 3, 7, 1];
        let flattened: Vec<i64> = partition(&page, 3).concat();
        assert_eq!(flattened, page.to_vec());
    }

    #[test]
    fn test_zero_batch_size_rejected_by_partitioner() {
        assert!(BatchPartitioner::new(0).is_err());
        assert_eq!(partition(&[1, 2], 0).len(), 2);
    }
}
