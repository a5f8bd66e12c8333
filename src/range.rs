use std::fmt;

use smallvec::{SmallVec, smallvec};
use thiserror::Error;

/// Result of a set operation: zero, one or two disjoint ranges.
pub type Ranges = SmallVec<[Range; 2]>;

/// Half-open index interval `[from, to)` over the flat list.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Range {
    pub from: usize,
    pub to: usize,
}

/// Raised when an operation that must produce a single interval would split it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("ranges are not contiguous: existing {existing}, other {other}")]
    NotContiguous { existing: Range, other: Range },
}

impl Range {
    pub const EMPTY: Self = Self { from: 0, to: 0 };

    /// Creates `[from, to)`; an inverted pair collapses to an empty range at `from`.
    pub const fn new(from: usize, to: usize) -> Self {
        if to < from {
            Self { from, to: from }
        } else {
            Self { from, to }
        }
    }

    #[inline]
    pub const fn size(&self) -> usize {
        self.to - self.from
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.to <= self.from
    }

    #[inline]
    pub const fn contains(&self, index: usize) -> bool {
        index >= self.from && index < self.to
    }

    /// Shifts both bounds by `delta` rows.
    pub const fn shifted(&self, delta: usize) -> Self {
        Self {
            from: self.from + delta,
            to: self.to + delta,
        }
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.from..self.to
    }

    /// Union of two ranges. Touching or overlapping ranges merge into one,
    /// otherwise both are returned in ascending order.
    pub fn union(&self, other: &Self) -> Ranges {
        if self.is_empty() {
            return if other.is_empty() {
                SmallVec::new()
            } else {
                smallvec![*other]
            };
        }
        if other.is_empty() {
            return smallvec![*self];
        }
        if self.to < other.from {
            return smallvec![*self, *other];
        }
        if other.to < self.from {
            return smallvec![*other, *self];
        }
        smallvec![Self::new(self.from.min(other.from), self.to.max(other.to))]
    }

    /// Overlap of two ranges, [`Range::EMPTY`] if they do not overlap.
    pub fn intersect(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() || self.to <= other.from || other.to <= self.from {
            return Self::EMPTY;
        }
        Self::new(self.from.max(other.from), self.to.min(other.to))
    }

    /// `self` without `other`: nothing, one remaining part, or a before and an after part.
    pub fn subtract(&self, other: &Self) -> Ranges {
        if self.is_empty() {
            return SmallVec::new();
        }
        let overlap = self.intersect(other);
        if overlap.is_empty() {
            return smallvec![*self];
        }
        let mut parts = Ranges::new();
        if self.from < overlap.from {
            parts.push(Self::new(self.from, overlap.from));
        }
        if overlap.to < self.to {
            parts.push(Self::new(overlap.to, self.to));
        }
        parts
    }

    /// Union that must yield a single interval.
    pub fn union_contiguous(&self, other: &Self) -> Result<Self, RangeError> {
        let parts = self.union(other);
        match parts.as_slice() {
            [] => Ok(Self::EMPTY),
            [single] => Ok(*single),
            _ => Err(RangeError::NotContiguous {
                existing: *self,
                other: *other,
            }),
        }
    }

    /// Subtraction that must not split `self` in two.
    pub fn subtract_contiguous(&self, other: &Self) -> Result<Self, RangeError> {
        let parts = self.subtract(other);
        match parts.as_slice() {
            [] => Ok(Self::new(self.from, self.from)),
            [single] => Ok(*single),
            _ => Err(RangeError::NotContiguous {
                existing: *self,
                other: *other,
            }),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(value: std::ops::Range<usize>) -> Self {
        Self::new(value.start, value.end)
    }
}
