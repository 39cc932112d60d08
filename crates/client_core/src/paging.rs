//! Page requests, page results and the pagination state a list view holds.

use crate::error::ApiError;

pub const ALLOWED_PAGE_SIZES: [u32; 3] = [10, 30, 50];
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Size used when loading whole collections as picker options.
pub const REFERENCE_PAGE_SIZE: u32 = 999;

pub fn is_allowed_page_size(size: u32) -> bool {
    ALLOWED_PAGE_SIZES.contains(&size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size: page_size.max(1),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// One fetched page plus the server's pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<R> {
    pub items: Vec<R>,
    pub total_records: u64,
    pub page_number: u32,
    pub page_size: u32,
}

impl<R> PageResult<R> {
    pub fn new(
        items: Vec<R>,
        total_records: u64,
        page_number: u32,
        page_size: u32,
    ) -> Result<Self, ApiError> {
        if page_size == 0 {
            return Err(ApiError::UnexpectedShape("page size is zero".into()));
        }
        if items.len() > page_size as usize {
            return Err(ApiError::UnexpectedShape(format!(
                "page holds {} items but page size is {page_size}",
                items.len()
            )));
        }
        Ok(Self {
            items,
            total_records,
            page_number,
            page_size,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page_number: u32,
    pub page_size: u32,
    pub total_records: u64,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page_number: 0,
            page_size: DEFAULT_PAGE_SIZE,
            total_records: 0,
        }
    }
}

impl PageState {
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page_number, self.page_size)
    }

    pub fn page_count(&self) -> u32 {
        let size = u64::from(self.page_size.max(1));
        self.total_records.div_ceil(size) as u32
    }

    /// Index of the first record on the current page (`page * size`).
    pub fn first_record_index(&self) -> u64 {
        u64::from(self.page_number) * u64::from(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page_number + 1 < self.page_count()
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 0
    }

    pub fn is_within_bounds(&self) -> bool {
        self.page_number == 0 || self.page_number < self.page_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        let state = PageState {
            page_number: 0,
            page_size: 10,
            total_records: 25,
        };
        assert_eq!(state.page_count(), 3);
        assert!(state.has_next());
        assert!(!state.has_previous());
    }

    #[test]
    fn last_page_has_no_next() {
        let state = PageState {
            page_number: 2,
            page_size: 10,
            total_records: 25,
        };
        assert!(!state.has_next());
        assert!(state.is_within_bounds());
        assert_eq!(state.first_record_index(), 20);
    }

    #[test]
    fn empty_collection_is_in_bounds_on_first_page() {
        let state = PageState::default();
        assert_eq!(state.page_count(), 0);
        assert!(state.is_within_bounds());
        assert!(!state.has_next());
    }

    #[test]
    fn rejects_oversized_pages() {
        let err = PageResult::new(vec![1, 2, 3], 3, 0, 2).expect_err("must fail");
        assert!(matches!(err, ApiError::UnexpectedShape(_)));
    }

    #[test]
    fn only_known_sizes_are_allowed() {
        assert!(is_allowed_page_size(30));
        assert!(!is_allowed_page_size(20));
        assert!(!is_allowed_page_size(REFERENCE_PAGE_SIZE));
    }
}
