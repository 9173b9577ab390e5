//! List-endpoint paging.
//!
//! Collection endpoints take `?limit=&offset=` and answer with one window
//! plus the total row count, so the frontend can draw page controls
//! without a second request.

use serde::{Deserialize, Serialize};

/// Hard cap on window size. Oversized requests are clamped, not rejected.
pub const MAX_PAGE_SIZE: i64 = 100;

const DEFAULT_PAGE_SIZE: i64 = 50;

/// Raw `?limit=&offset=` query parameters. The fields stay private so the
/// clamped accessors are the only way to read them.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    limit: Option<i64>,
    offset: Option<i64>,
}

impl PageParams {
    /// Requested window size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Rows to skip. Negative values read as zero.
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// One window of a collection plus the count of everything that matched.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    /// Wrap a query result in the window that produced it.
    pub fn new(params: &PageParams, items: Vec<T>, total: i64) -> Self {
        Self {
            items,
            total,
            limit: params.limit(),
            offset: params.offset(),
        }
    }
}
