pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// A page request after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// `page < 1` becomes 1; a size outside `1..=100` falls back to the default.
    pub fn clamped(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let page_size = match page_size {
            Some(n) if (1..=MAX_PAGE_SIZE).contains(&n) => n,
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.page_size - 1) / self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::clamped(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_page_and_size() {
        let cases = [
            ((None, None), (1, 10)),
            ((Some(0), Some(0)), (1, 10)),
            ((Some(-5), Some(1000)), (1, 10)),
            ((Some(3), Some(100)), (3, 100)),
            ((Some(2), Some(101)), (2, 10)),
            ((Some(1), Some(1)), (1, 1)),
        ];
        for ((page, size), (want_page, want_size)) in cases {
            let req = PageRequest::clamped(page, size);
            assert_eq!((req.page, req.page_size), (want_page, want_size), "{page:?} {size:?}");
        }
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::clamped(Some(1), Some(2)).offset(), 0);
        assert_eq!(PageRequest::clamped(Some(3), Some(25)).offset(), 50);
        assert_eq!(PageRequest::clamped(Some(i64::MAX), Some(100)).offset(), i64::MAX);
    }

    #[test]
    fn total_pages_is_ceiling() {
        let req = PageRequest::clamped(None, Some(2));
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(1), 1);
        assert_eq!(req.total_pages(2), 1);
        assert_eq!(req.total_pages(3), 2);
        assert_eq!(PageRequest::default().total_pages(101), 11);
    }
}
