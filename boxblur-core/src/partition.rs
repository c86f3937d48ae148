use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Contiguous band of image rows `[start, end)` owned by one worker rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpan {
    pub start: usize,
    pub end: usize,
}

impl RowSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Rows assigned to `rank` when `height` rows are split over `workers` ranks.
    ///
    /// Every rank gets `height / workers` rows and the lowest `height % workers`
    /// ranks get one more, so spans are contiguous and ordered by rank.
    ///
    /// # Panics
    ///
    /// Panics if `workers == 0` or `rank >= workers`.
    pub fn for_rank(height: usize, workers: usize, rank: usize) -> Self {
        assert!(workers > 0, "row partition needs at least one worker");
        assert!(rank < workers, "rank {rank} out of range for {workers} workers");

        let base = height / workers;
        let extra = height % workers;
        let start_of = |r: usize| base * r + r.min(extra);

        Self::new(start_of(rank), start_of(rank + 1))
    }

    /// Number of rows in the span.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, row: usize) -> bool {
        row >= self.start && row < self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Split `height` rows over `workers` ranks; element `r` is the span of rank `r`.
///
/// # Panics
///
/// Panics if `workers == 0`.
pub fn partition_rows(height: usize, workers: usize) -> Vec<RowSpan> {
    (0..workers)
        .map(|rank| RowSpan::for_rank(height, workers, rank))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let spans = partition_rows(20, 4);

        assert_eq!(
            spans,
            vec![
                RowSpan::new(0, 5),
                RowSpan::new(5, 10),
                RowSpan::new(10, 15),
                RowSpan::new(15, 20),
            ]
        );
    }

    #[test]
    fn test_remainder_goes_to_lowest_ranks() {
        // 23 = 3 * 7 + 2: ranks 0 and 1 get 4 rows, the rest get 3
        let spans = partition_rows(23, 7);
        let lens: Vec<usize> = spans.iter().map(RowSpan::len).collect();

        assert_eq!(lens, vec![4, 4, 3, 3, 3, 3, 3]);
        assert_eq!(spans[1], RowSpan::new(4, 8));
        assert_eq!(spans[2], RowSpan::new(8, 11));
    }

    #[test]
    fn test_more_workers_than_rows() {
        let spans = partition_rows(3, 10);

        assert_eq!(spans[0], RowSpan::new(0, 1));
        assert_eq!(spans[2], RowSpan::new(2, 3));
        assert!(spans[3..].iter().all(RowSpan::is_empty));
        assert!(spans[3..].iter().all(|s| s.start == 3));
    }

    #[test]
    fn test_span_contains() {
        let span = RowSpan::new(4, 8);

        assert!(span.contains(4));
        assert!(span.contains(7));
        assert!(!span.contains(8));
        assert!(!span.contains(3));
        assert_eq!(span.range(), 4..8);
    }

    #[test]
    fn test_single_worker_owns_everything() {
        assert_eq!(partition_rows(17, 1), vec![RowSpan::new(0, 17)]);
    }

    #[test]
    #[should_panic(expected = "at least one worker")]
    fn test_zero_workers_panics() {
        let _ = RowSpan::for_rank(10, 0, 0);
    }
}
