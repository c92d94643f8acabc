//! PageIndex - prefix sums of visible pages per root field via Fenwick tree
//!
//! Maps a flat display page index to the root field that owns it and the
//! sub-item within that field.
//!
//! # Complexity
//!
//! - `prefix_sum`: O(log n)
//! - `lower_bound`: O(log² n)
//! - `total`: O(log n)

use crate::model::{ParserError, RootField};

/// Visible page counts of the root fields, in page order.
///
/// Fields with zero pages occupy an empty range and are never returned by
/// [`PageIndex::lower_bound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIndex {
    /// Fenwick tree backing storage, one slot per root field.
    tree: [isize; RootField::COUNT],
}

impl PageIndex {
    /// Creates an index with every field at zero pages.
    pub fn new() -> Self {
        Self {
            tree: [0; RootField::COUNT],
        }
    }

    /// Builds an index from per-field page counts.
    ///
    /// # Examples
    ///
    /// ```
    /// # use txdisplay::display::page_index::PageIndex;
    /// let index = PageIndex::from_counts([0, 0, 0, 1, 0, 1, 0]);
    /// assert_eq!(index.total(), 2);
    /// ```
    pub fn from_counts(counts: [usize; RootField::COUNT]) -> Self {
        let mut index = Self::new();
        for (position, count) in counts.into_iter().enumerate() {
            if count > 0 {
                fenwick::array::update(&mut index.tree[..], position, count as isize);
            }
        }
        index
    }

    /// Pages of the field at `position`.
    pub fn pages_at(&self, position: usize) -> usize {
        if position == 0 {
            self.prefix_sum(0)
        } else {
            self.prefix_sum(position) - self.prefix_sum(position - 1)
        }
    }

    /// Pages of all fields up to and including `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position >= RootField::COUNT`.
    pub fn prefix_sum(&self, position: usize) -> usize {
        assert!(
            position < RootField::COUNT,
            "position {} out of bounds (fields: {})",
            position,
            RootField::COUNT
        );

        let sum = fenwick::array::prefix_sum(&self.tree[..], position);
        sum.max(0) as usize
    }

    /// First field position whose prefix sum exceeds `page`, i.e. the field that
    /// owns display page `page`.
    ///
    /// Returns `None` if `page >= total()`.
    pub fn lower_bound(&self, page: usize) -> Option<usize> {
        let mut left = 0;
        let mut right = RootField::COUNT;

        while left < right {
            let mid = left + (right - left) / 2;
            if self.prefix_sum(mid) > page {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        (left < RootField::COUNT).then_some(left)
    }

    /// Total number of display pages.
    pub fn total(&self) -> usize {
        self.prefix_sum(RootField::COUNT - 1)
    }

    /// Resolves display page `page` to its field and sub-item.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::NoData` if `page` is not below [`PageIndex::total`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use txdisplay::display::page_index::PageIndex;
    /// # use txdisplay::model::RootField;
    /// let index = PageIndex::from_counts([0, 0, 0, 1, 0, 3, 0]);
    /// assert_eq!(index.resolve(0).unwrap(), (RootField::Fee, 0));
    /// assert_eq!(index.resolve(3).unwrap(), (RootField::Msgs, 2));
    /// assert!(index.resolve(4).is_err());
    /// ```
    pub fn resolve(&self, page: usize) -> Result<(RootField, usize), ParserError> {
        let position = self.lower_bound(page).ok_or(ParserError::NoData)?;
        let before = if position == 0 {
            0
        } else {
            self.prefix_sum(position - 1)
        };
        Ok((RootField::ALL[position], page - before))
    }
}

impl Default for PageIndex {
    fn default() -> Self {
        Self::new()
    }
}
