//! Page slicing shared by search results and feeds.
//!
//! Pages are 1-indexed and fixed-size. Page `n` of a list is the slice
//! `[(n-1)*size, (n-1)*size + size)` clipped to the list length, so a page
//! past the end is empty rather than an error and `total` always reports
//! the full length. Page 0 lies before the start and is always empty.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

/// Result type for page construction.
pub type PageResult<T> = Result<T, PageError>;

/// Errors from an invalid page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageError {
    /// The page size was zero.
    #[error("page size must be greater than zero")]
    InvalidPageSize,
}

/// A validated request for one page of an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Creates a page request, rejecting a zero page size.
    ///
    /// Page 0 is accepted and selects nothing.
    pub fn new(page: u32, page_size: u32) -> PageResult<Self> {
        if page_size == 0 {
            return Err(PageError::InvalidPageSize);
        }
        Ok(Self { page, page_size })
    }

    /// The first page at the given size.
    pub fn first(page_size: u32) -> PageResult<Self> {
        Self::new(1, page_size)
    }

    /// The 1-indexed page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The number of items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Index of the first item on this page. Zero for page 0.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page as usize)
            .saturating_sub(1)
            .saturating_mul(self.page_size as usize)
    }

    /// Index one past the last item this page can hold. Zero for page 0.
    #[must_use]
    pub fn end(&self) -> usize {
        (self.page as usize).saturating_mul(self.page_size as usize)
    }

    /// The slice of a list of `len` items covered by this page.
    ///
    /// Empty (but in bounds) when the page lies past the end or is page 0.
    #[must_use]
    pub fn range(&self, len: usize) -> Range<usize> {
        if self.page == 0 {
            return 0..0;
        }
        let start = self.offset().min(len);
        let end = start.saturating_add(self.page_size as usize).min(len);
        start..end
    }

    /// Slices a fully ordered list down to this page.
    pub fn slice<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let range = self.range(total);
        let items = items
            .into_iter()
            .skip(range.start)
            .take(range.len())
            .collect();
        Page::from_parts(items, total, *self)
    }

    /// The request for the following page.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            page_size: self.page_size,
        }
    }
}

/// One page of an ordered list, plus the length of the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in list order.
    pub items: Vec<T>,
    /// Length of the full list the page was cut from.
    pub total: usize,
    request: PageRequest,
}

impl<T> Page<T> {
    /// Assembles a page whose items were sliced elsewhere (for example by
    /// the index with `LIMIT`/`OFFSET`).
    pub fn from_parts(items: Vec<T>, total: usize, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    /// The request this page answers.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.request.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.request.page_size
    }

    /// Number of non-empty pages in the full list.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.request.page_size as usize)
    }

    /// True when a later page holds items.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.request.end() < self.total
    }

    /// True when this is not the first page.
    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.request.page > 1
    }

    /// The next page number, if it holds items.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then(|| self.request.page + 1)
    }

    /// The previous page number, if any.
    #[must_use]
    pub fn prev_page(&self) -> Option<u32> {
        self.has_prev().then(|| self.request.page - 1)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps every item, keeping `total` and the request.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}
