//! Pagination math

use crate::core::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};

/// Normalized page request: `page >= 1`, `page_size` in `[1, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl PageRequest {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Page metadata derived from a row count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub offset: i64,
    pub total_pages: u64,
}

/// Clamp the request and compute offset and page count for `total_rows`
pub fn paginate(page: i64, page_size_requested: i64, total_rows: u64) -> Pagination {
    let request = PageRequest::new(Some(page), Some(page_size_requested));
    Pagination {
        page: request.page,
        page_size: request.page_size,
        offset: request.offset(),
        total_pages: total_rows.div_ceil(request.page_size as u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 20);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(PageRequest::new(Some(1), Some(500)).page_size, 100);
        assert_eq!(PageRequest::new(Some(1), Some(0)).page_size, 1);
        assert_eq!(PageRequest::new(Some(1), Some(-5)).page_size, 1);
    }

    #[test]
    fn page_is_normalized() {
        assert_eq!(PageRequest::new(Some(0), None).page, 1);
        assert_eq!(PageRequest::new(Some(-3), None).page, 1);
    }

    #[test]
    fn offset_math() {
        assert_eq!(PageRequest::new(Some(3), Some(10)).offset(), 20);
        assert_eq!(PageRequest::new(Some(i64::MAX), Some(100)).offset(), i64::MAX);
    }

    #[test]
    fn paginate_counts_pages() {
        assert_eq!(
            paginate(2, 20, 45),
            Pagination {
                page: 2,
                page_size: 20,
                offset: 20,
                total_pages: 3
            }
        );
        assert_eq!(paginate(1, 20, 40).total_pages, 2);
        assert_eq!(paginate(1, 20, 0).total_pages, 0);
        assert_eq!(paginate(0, 500, 1000).total_pages, 10);
    }
}
