//! Offset pagination over in-memory result sets.
//!
//! Filtering and scoping run over the full record set first; a page is cut
//! from the already-filtered vector, so `total` always counts what the caller
//! is allowed to see.

use serde::Serialize;

/// Requested page window. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: u32 = 10;
    pub const MAX_PER_PAGE: u32 = 100;

    /// Build a window from raw query input, clamping out-of-range values.
    pub fn from_query(page: Option<u32>, per_page: Option<u32>, default_per_page: u32) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page
            .unwrap_or(default_per_page)
            .clamp(1, Self::MAX_PER_PAGE);
        Self { page, per_page }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.per_page as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::from_query(None, None, Self::DEFAULT_PER_PAGE)
    }
}

/// One page of results plus the paginator envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
    pub last_page: u32,
}

impl<T> Page<T> {
    /// Cut the requested window out of an already-filtered, already-sorted set.
    pub fn paginate(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len() as u64;
        let per_page = request.per_page();
        let last_page = (total.div_ceil(per_page as u64) as u32).max(1);
        let data = items
            .into_iter()
            .skip(request.offset())
            .take(per_page as usize)
            .collect();
        Self {
            data,
            total,
            per_page,
            current_page: request.page(),
            last_page,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            per_page: self.per_page,
            current_page: self.current_page,
            last_page: self.last_page,
        }
    }
}
