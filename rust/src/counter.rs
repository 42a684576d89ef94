//! Fenwick tree (binary indexed tree) over 1-based integer indices.
//!
//! `update` and `query` are O(log n). Index 0 is reserved as the empty
//! prefix: `query(0)` is always 0 and `update(0, _)` is rejected.
//!
//! Deltas are `i64`; sums are accumulated as [`Mass`] (`i128`), which holds
//! any total of fewer than 2^64 deltas exactly.

use crate::error::{checked_size, KernelError, KernelResult};

/// Accumulated sum of `i64` deltas.
pub type Mass = i128;

/// Prefix-sum structure over indices `1..=size`.
#[derive(Clone, Debug, Default)]
pub struct IndexedCounter {
    /// `tree[i]` holds the sum over `(i - lowbit(i), i]`; `tree[0]` is unused.
    tree: Vec<Mass>,
}

#[inline]
fn lowbit(i: usize) -> usize {
    i & i.wrapping_neg()
}

impl IndexedCounter {
    /// Create a counter over `1..=size` with every value at 0.
    pub fn new(size: usize) -> Self {
        Self {
            tree: vec![0; size + 1],
        }
    }

    /// Create a counter from a signed size.
    pub fn checked_new(size: i64) -> KernelResult<Self> {
        Ok(Self::new(checked_size(size)?))
    }

    /// Number of addressable indices.
    pub fn len(&self) -> usize {
        self.tree.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add `delta` to the value at `index` (1-based).
    ///
    /// # Errors
    /// * `OutOfRange` unless `1 <= index <= len()`
    pub fn update(&mut self, index: usize, delta: i64) -> KernelResult<()> {
        if index == 0 || index > self.len() {
            return Err(KernelError::out_of_range(index, self.len()));
        }
        self.apply(index, delta);
        Ok(())
    }

    /// `update` without the range check; `index` must be in `1..=len()`.
    #[inline]
    pub(crate) fn apply(&mut self, index: usize, delta: i64) {
        let mut i = index;
        while i < self.tree.len() {
            self.tree[i] += Mass::from(delta);
            i += lowbit(i);
        }
    }

    /// Sum of all values at indices `1..=index`. `query(0)` is 0.
    ///
    /// # Errors
    /// * `OutOfRange` if `index > len()`
    pub fn query(&self, index: usize) -> KernelResult<Mass> {
        if index > self.len() {
            return Err(KernelError::out_of_range(index, self.len()));
        }
        Ok(self.prefix(index))
    }

    #[inline]
    fn prefix(&self, index: usize) -> Mass {
        let mut sum = 0;
        let mut i = index;
        while i > 0 {
            sum += self.tree[i];
            i -= lowbit(i);
        }
        sum
    }

    /// The value at `index` alone: `query(index) - query(index - 1)`.
    pub fn point_value(&self, index: usize) -> KernelResult<Mass> {
        if index == 0 || index > self.len() {
            return Err(KernelError::out_of_range(index, self.len()));
        }
        Ok(self.prefix(index) - self.prefix(index - 1))
    }

    /// Sum over the inclusive range `lo..=hi`. Empty ranges (`lo > hi`) sum to 0.
    ///
    /// # Errors
    /// * `OutOfRange` if `lo == 0` or `hi > len()`
    pub fn range_sum(&self, lo: usize, hi: usize) -> KernelResult<Mass> {
        if lo == 0 {
            return Err(KernelError::out_of_range(lo, self.len()));
        }
        if hi > self.len() {
            return Err(KernelError::out_of_range(hi, self.len()));
        }
        if lo > hi {
            return Ok(0);
        }
        Ok(self.prefix(hi) - self.prefix(lo - 1))
    }

    /// Sum of every delta applied so far.
    pub fn total(&self) -> Mass {
        self.prefix(self.len())
    }

    /// Smallest index whose prefix sum is at least `target`.
    ///
    /// Binary descent over the tree, O(log n). Only meaningful while every
    /// point value is non-negative. Returns `Some(0)` for `target <= 0` and
    /// `None` if the total is below `target`.
    pub fn lower_bound(&self, target: Mass) -> Option<usize> {
        if target <= 0 {
            return Some(0);
        }
        if self.total() < target {
            return None;
        }
        let n = self.len();
        // Highest power of two <= n; n >= 1 here because total() >= target > 0
        let mut step = 1usize << (usize::BITS - 1 - n.leading_zeros());
        let mut pos = 0usize;
        let mut remaining = target;
        while step > 0 {
            let next = pos + step;
            if next <= n && self.tree[next] < remaining {
                pos = next;
                remaining -= self.tree[next];
            }
            step >>= 1;
        }
        Some(pos + 1)
    }
}
