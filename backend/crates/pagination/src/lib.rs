//! Page-number pagination primitives shared by listing endpoints.
//!
//! Listing endpoints accept a one-based `page` query parameter and return a
//! [`Page`] envelope carrying the items plus enough metadata for clients to
//! render pagination controls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest page size any endpoint may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Page numbers are one-based.
    #[error("page must be at least 1")]
    ZeroPage,
    /// Page sizes must be between 1 and [`MAX_PAGE_SIZE`].
    #[error("page size must be between 1 and {max}, got {size}")]
    InvalidSize {
        /// Requested size.
        size: u32,
        /// Upper bound.
        max: u32,
    },
}

/// Validated request for one page of results.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(3, 12).expect("valid page request");
/// assert_eq!(request.offset(), 24);
/// assert_eq!(request.limit(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Build a request for `page` (one-based) holding `size` items.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when `page` is zero or `size` is out of
    /// range.
    pub const fn new(page: u32, size: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(PageRequestError::InvalidSize {
                size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self { page, size })
    }

    /// Build a request from an optional page number, defaulting to the first
    /// page.
    ///
    /// # Errors
    /// Same conditions as [`PageRequest::new`].
    pub fn from_optional(page: Option<u32>, size: u32) -> Result<Self, PageRequestError> {
        Self::new(page.unwrap_or(1), size)
    }

    /// First page with the given size.
    ///
    /// # Errors
    /// Returns [`PageRequestError::InvalidSize`] when `size` is out of range.
    pub const fn first(size: u32) -> Result<Self, PageRequestError> {
        Self::new(1, size)
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of items to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.size as u64
    }

    /// Number of items to fetch.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.size as u64
    }

    /// Slice an in-memory collection down to this page.
    #[must_use]
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit()).unwrap_or(usize::MAX);
        items.iter().skip(offset).take(limit).cloned().collect()
    }
}

/// One page of results plus pagination metadata.
///
/// Serialises with camelCase keys:
/// `{"items": [...], "page": 1, "pageSize": 12, "totalItems": 30, "totalPages": 3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// One-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Total number of matching items across all pages.
    pub total_items: u64,
    /// Total number of pages; zero when there are no items.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Assemble a page from the fetched items and the total match count.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page(),
            page_size: request.size(),
            total_items,
            total_pages: total_items.div_ceil(request.limit()),
        }
    }

    /// Whether a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Transform each item while keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
