//! Pagination types

use serde::Serialize;

/// A 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    /// Documents skipped before this page
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Skip/limit as stored in a compiled plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Pagination {
    pub skip: u64,
    /// `None` = no limit
    pub limit: Option<u64>,
}

impl Pagination {
    pub fn is_bounded(&self) -> bool {
        self.limit.is_some()
    }

    /// 1-based page number this skip/limit corresponds to
    pub fn page(&self) -> u64 {
        match self.limit {
            Some(limit) if limit > 0 => self.skip / limit + 1,
            _ => 1,
        }
    }
}

impl From<PageRequest> for Pagination {
    fn from(request: PageRequest) -> Self {
        Self {
            skip: request.skip(),
            limit: Some(request.limit),
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    /// Documents matching the predicates, ignoring pagination
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Build a page from the returned slice, the full match count and the
    /// pagination that produced the slice. Unbounded plans report the
    /// whole result as a single page.
    pub fn new(data: Vec<T>, total: u64, pagination: &Pagination) -> Self {
        let limit = pagination.limit.unwrap_or(total);
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            data,
            total,
            page: pagination.page(),
            limit,
            total_pages,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
