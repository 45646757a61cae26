use std::fmt;
use std::ops::Range;

/// One callback invocation: `size` items starting at offset `pos`.
///
/// Batches of one run are contiguous and never overlap: each batch's `pos`
/// is the previous batch's [`end`](Batch::end).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Batch {
    /// Number of items to attempt.
    pub size: usize,
    /// Number of items attempted by earlier batches of the same run.
    pub pos: usize,
}

impl Batch {
    /// Creates a batch of `size` items at offset `pos`.
    #[inline]
    pub const fn new(size: usize, pos: usize) -> Self {
        Self { size, pos }
    }

    /// Offset one past the last item of this batch.
    #[inline]
    pub const fn end(&self) -> usize {
        self.pos + self.size
    }

    /// Item offsets covered by this batch.
    ///
    /// ```rust
    /// use slowstart::Batch;
    ///
    /// assert_eq!(Batch::new(4, 3).range(), 3..7);
    /// ```
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.pos..self.end()
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.pos, self.end())
    }
}
