//! HeightIndex - prefix sums of row heights over a Fenwick tree
//!
//! Backs the dynamic-height mode of [`OffsetIndex`](super::OffsetIndex):
//! offsets are prefix sums, and the row under a scroll position is found by
//! binary search over those sums.
//!
//! # Complexity
//!
//! - `set`: O(log n)
//! - `offset_of`: O(log n)
//! - `index_at_offset`: O(log² n)
//! - `get`, `len`: O(1)
//! - `reset`: O(n)

/// Fixed-length sequence of row heights with logarithmic prefix sums.
///
/// The tree is sized once per row count. Growing a Fenwick array in place
/// would leave interior nodes missing earlier sums, so a new row count
/// always rebuilds through [`HeightIndex::reset`].
#[derive(Debug, Clone, Default)]
pub struct HeightIndex {
    /// Fenwick tree backing storage (1-indexed internally, 0-indexed API).
    tree: Vec<i64>,
    /// Plain copy of each height, used to compute update deltas.
    heights: Vec<usize>,
}

impl HeightIndex {
    /// Creates an index of `len` rows, all of height zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use panegrid::virtual_scroll::height_index::HeightIndex;
    /// let index = HeightIndex::with_len(4);
    /// assert_eq!(index.len(), 4);
    /// assert_eq!(index.total(), 0);
    /// ```
    pub fn with_len(len: usize) -> Self {
        Self {
            tree: vec![0; len],
            heights: vec![0; len],
        }
    }

    /// Sets the height of one row. Out-of-range indices are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use panegrid::virtual_scroll::height_index::HeightIndex;
    /// let mut index = HeightIndex::with_len(3);
    /// index.set(0, 10);
    /// index.set(1, 20);
    /// index.set(0, 15);
    /// assert_eq!(index.offset_of(2), 35);
    /// ```
    pub fn set(&mut self, index: usize, height: usize) {
        let Some(current) = self.heights.get_mut(index) else {
            return;
        };
        let delta = height as i64 - *current as i64;
        *current = height;
        if delta != 0 {
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Height stored for `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<usize> {
        self.heights.get(index).copied()
    }

    /// Sum of the heights of every row before `index`.
    ///
    /// `offset_of(0)` is 0 and `offset_of(len())` is the total height.
    /// Indices past the end clamp to the total.
    ///
    /// # Examples
    ///
    /// ```
    /// # use panegrid::virtual_scroll::height_index::HeightIndex;
    /// let mut index = HeightIndex::with_len(3);
    /// index.set(0, 3);
    /// index.set(1, 4);
    /// index.set(2, 5);
    /// assert_eq!(index.offset_of(0), 0);
    /// assert_eq!(index.offset_of(1), 3);
    /// assert_eq!(index.offset_of(3), 12);
    /// ```
    pub fn offset_of(&self, index: usize) -> usize {
        let end = index.min(self.len());
        if end == 0 {
            return 0;
        }
        let sum = fenwick::array::prefix_sum(&self.tree, end - 1);
        sum.max(0) as usize
    }

    /// Greatest row index whose offset does not exceed `offset`.
    ///
    /// Returns 0 for an empty index. Positions past the end resolve to the
    /// last row.
    ///
    /// # Examples
    ///
    /// ```
    /// # use panegrid::virtual_scroll::height_index::HeightIndex;
    /// let mut index = HeightIndex::with_len(3);
    /// index.set(0, 10); // [0..10)
    /// index.set(1, 20); // [10..30)
    /// index.set(2, 15); // [30..45)
    ///
    /// assert_eq!(index.index_at_offset(0), 0);
    /// assert_eq!(index.index_at_offset(9), 0);
    /// assert_eq!(index.index_at_offset(10), 1);
    /// assert_eq!(index.index_at_offset(30), 2);
    /// assert_eq!(index.index_at_offset(1000), 2);
    /// ```
    pub fn index_at_offset(&self, offset: usize) -> usize {
        if self.is_empty() {
            return 0;
        }

        // Invariant: offset_of(low) <= offset, answer in [low, high]
        let mut low = 0;
        let mut high = self.len() - 1;
        while low < high {
            let mid = low + (high - low + 1) / 2;
            if self.offset_of(mid) <= offset {
                low = mid;
            } else {
                high = mid - 1;
            }
        }
        low
    }

    /// Total height of all rows.
    pub fn total(&self) -> usize {
        self.offset_of(self.len())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// True if the index holds no rows.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Discards every height and resizes to `len` zero-height rows.
    pub fn reset(&mut self, len: usize) {
        self.tree.clear();
        self.tree.resize(len, 0);
        self.heights.clear();
        self.heights.resize(len, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn index_from(heights: &[usize]) -> HeightIndex {
        let mut index = HeightIndex::with_len(heights.len());
        for (i, &h) in heights.iter().enumerate() {
            index.set(i, h);
        }
        index
    }

    #[test]
    fn empty_index_answers_zero() {
        let index = HeightIndex::with_len(0);
        assert_eq!(index.total(), 0);
        assert_eq!(index.offset_of(5), 0);
        assert_eq!(index.index_at_offset(100), 0);
    }

    #[test]
    fn set_updates_following_offsets() {
        let mut index = index_from(&[3, 4, 5]);
        index.set(1, 10);

        assert_eq!(index.offset_of(1), 3);
        assert_eq!(index.offset_of(2), 13);
        assert_eq!(index.total(), 18);
        assert_eq!(index.get(1), Some(10));
    }

    #[test]
    fn set_out_of_range_is_ignored() {
        let mut index = index_from(&[3]);
        index.set(5, 10);
        assert_eq!(index.total(), 3);
    }

    #[test]
    fn index_at_offset_on_exact_boundaries() {
        let index = index_from(&[5, 5, 5]);
        assert_eq!(index.index_at_offset(4), 0);
        assert_eq!(index.index_at_offset(5), 1);
        assert_eq!(index.index_at_offset(10), 2);
        assert_eq!(index.index_at_offset(15), 2);
    }

    #[test]
    fn zero_height_rows_resolve_to_the_last_one_at_that_offset() {
        let index = index_from(&[5, 0, 0, 5]);
        assert_eq!(index.index_at_offset(5), 3);
    }

    #[test]
    fn reset_resizes_and_clears() {
        let mut index = index_from(&[5, 6, 7]);
        index.reset(5);
        assert_eq!(index.len(), 5);
        assert_eq!(index.total(), 0);
        index.set(4, 2);
        assert_eq!(index.total(), 2);
    }

    proptest! {
        #[test]
        fn prop_offset_matches_naive_sum(heights in prop::collection::vec(0usize..=100, 0..60)) {
            let index = index_from(&heights);
            let mut expected = 0;
            for i in 0..=heights.len() {
                prop_assert_eq!(index.offset_of(i), expected);
                if let Some(h) = heights.get(i) {
                    expected += h;
                }
            }
        }

        #[test]
        fn prop_index_at_offset_is_greatest_row_not_past_position(
            heights in prop::collection::vec(1usize..=50, 1..60),
            position in 0usize..4000,
        ) {
            let index = index_from(&heights);
            let found = index.index_at_offset(position);
            prop_assert!(found < heights.len());
            prop_assert!(index.offset_of(found) <= position);
            if found + 1 < heights.len() {
                prop_assert!(index.offset_of(found + 1) > position);
            }
        }
    }
}
