/// Limit applied when a caller omits it or passes zero.
pub const DEFAULT_LIMIT: u64 = 10;

/// An `[offset, offset + limit)` window over an ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    offset: u64,
    limit: u64,
}

impl Page {
    pub fn new(offset: Option<u64>, limit: Option<u64>) -> Self {
        let limit = match limit {
            Some(0) | None => DEFAULT_LIMIT,
            Some(limit) => limit,
        };
        Self {
            offset: offset.unwrap_or(0),
            limit,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Index range of this window inside a sequence of `len` items, or `None`
    /// when the window starts past the end.
    pub fn bounds(&self, len: usize) -> Option<(usize, usize)> {
        let start = usize::try_from(self.offset).ok()?;
        if start > len {
            return None;
        }
        let end = start
            .saturating_add(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .min(len);
        Some((start, end))
    }

    /// Copy this window out of `items`.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        match self.bounds(items.len()) {
            Some((start, end)) => items[start..end].to_vec(),
            None => Vec::new(),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_uses_default() {
        assert_eq!(Page::new(None, Some(0)), Page::new(None, None));
        assert_eq!(Page::new(Some(3), Some(0)).limit(), DEFAULT_LIMIT);
        assert_eq!(Page::new(Some(3), Some(25)).limit(), 25);
    }

    #[test]
    fn test_bounds() {
        let page = Page::new(Some(2), Some(5));
        assert_eq!(page.bounds(10), Some((2, 7)));
        assert_eq!(page.bounds(4), Some((2, 4)));
        assert_eq!(page.bounds(2), Some((2, 2)));
        assert_eq!(page.bounds(1), None);
    }

    #[test]
    fn test_huge_values_do_not_overflow() {
        let page = Page::new(Some(1), Some(u64::MAX));
        assert_eq!(page.bounds(3), Some((1, 3)));
        assert_eq!(Page::new(Some(u64::MAX), None).slice(&[1, 2, 3]), Vec::<i32>::new());
    }
}
