use std::fmt;

/// A list position counted from the front or from the back.
///
/// `Index::from_end(1)` is the last element. Used by list-slice path
/// components and by direct list addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    pub value: i32,
    pub from_end: bool,
}

impl Index {
    pub fn new(value: i32) -> Self {
        Index { value, from_end: false }
    }

    pub fn from_end(value: i32) -> Self {
        Index { value, from_end: true }
    }

    /// Resolve to a concrete offset into a list of `len` elements.
    /// Returns `None` when the index falls outside `0..=len`.
    pub fn offset(&self, len: usize) -> Option<usize> {
        if self.value < 0 {
            return None;
        }
        let value = self.value as usize;
        if self.from_end {
            len.checked_sub(value)
        } else if value <= len {
            Some(value)
        } else {
            None
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from_end {
            write!(f, "^{}", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// A slice of list positions. `exclusive` distinguishes the `...` range
/// marker (end excluded) from `..` (end included).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Index,
    pub end: Index,
    pub exclusive: bool,
}

impl Range {
    pub fn inclusive(start: Index, end: Index) -> Self {
        Range { start, end, exclusive: false }
    }

    pub fn exclusive(start: Index, end: Index) -> Self {
        Range { start, end, exclusive: true }
    }

    /// Concrete offset of the first element for a list of `len` elements.
    pub fn offset(&self, len: usize) -> Option<usize> {
        self.start.offset(len)
    }

    /// Concrete element count for a list of `len` elements.
    pub fn length(&self, len: usize) -> Option<usize> {
        let start = self.start.offset(len)?;
        let end = self.end.offset(len)?;
        if self.exclusive {
            end.checked_sub(start)
        } else {
            end.checked_sub(start).map(|n| n + 1)
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.exclusive { "..." } else { ".." };
        write!(f, "{}{}{}", self.start, marker, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_offsets() {
        assert_eq!(Index::new(0).offset(5), Some(0));
        assert_eq!(Index::new(4).offset(5), Some(4));
        assert_eq!(Index::new(6).offset(5), None);
        assert_eq!(Index::from_end(1).offset(5), Some(4));
        assert_eq!(Index::from_end(5).offset(5), Some(0));
        assert_eq!(Index::from_end(6).offset(5), None);
        assert_eq!(Index::new(-1).offset(5), None);
    }

    #[test]
    fn test_range_resolution() {
        let range = Range::inclusive(Index::new(1), Index::new(3));
        assert_eq!(range.offset(5), Some(1));
        assert_eq!(range.length(5), Some(3));

        let range = Range::exclusive(Index::new(1), Index::new(3));
        assert_eq!(range.length(5), Some(2));

        let range = Range::inclusive(Index::new(0), Index::from_end(1));
        assert_eq!(range.length(4), Some(4));
    }

    #[test]
    fn test_range_display() {
        let range = Range::exclusive(Index::new(0), Index::from_end(2));
        assert_eq!(range.to_string(), "0...^2");
    }
}
