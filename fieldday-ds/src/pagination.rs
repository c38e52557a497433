//! Pagination utilities for roster listings

use serde::Serialize;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 20;

/// Pagination metadata returned alongside a page slice.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Calculate pagination metadata from the total count and the (possibly
/// out-of-bounds) requested page and page size.
///
/// Page size is clamped into `[1, MAX_PAGE_SIZE]`; the page number into
/// `[1, total_pages]` when there are any pages, else 1. Returns the metadata
/// and the slice offset.
pub fn paginate(total_count: i64, requested_page: i64, requested_size: i64) -> (PageInfo, i64) {
    let page_size = requested_size.max(1).min(MAX_PAGE_SIZE);
    let total_pages = (total_count + page_size - 1) / page_size;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    let info = PageInfo {
        current_page: page,
        page_size,
        total_pages,
        total_count,
        has_next: page < total_pages,
        has_prev: page > 1,
    };
    (info, offset)
}
