//! Paging for the aggregate previews
//!
//! The page embeds page 1 of each aggregate collection (its first rows in
//! count-descending order); `/api/preview/:dimension?page=N` walks the rest.

/// Rows per preview page
pub const PAGE_SIZE: i64 = 50;

/// One window over an aggregate collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewWindow {
    /// Page actually served (1-indexed, after clamping)
    pub page: i64,
    /// Pages needed for the whole collection; 0 when it is empty
    pub total_pages: i64,
    /// First rank in the window
    pub offset: i64,
    /// Rows in the window (never more than [`PAGE_SIZE`])
    pub rows: i64,
}

/// Window for `requested_page` over a collection of `total_rows`
///
/// Pages before the first or after the last are served as the first or
/// last page, so a stale link still shows data.
///
/// # Examples
/// ```
/// use review_dash::pagination::preview_window;
///
/// // 120 city groups: pages of 50, 50 and 20
/// let w = preview_window(120, 3);
/// assert_eq!((w.page, w.total_pages, w.offset, w.rows), (3, 3, 100, 20));
///
/// // Past the end clamps to the last page
/// assert_eq!(preview_window(120, 99), w);
/// ```
pub fn preview_window(total_rows: i64, requested_page: i64) -> PreviewWindow {
    let total_rows = total_rows.max(0);
    let total_pages = (total_rows + PAGE_SIZE - 1) / PAGE_SIZE;
    let page = requested_page.clamp(1, total_pages.max(1));
    let offset = (page - 1) * PAGE_SIZE;

    PreviewWindow {
        page,
        total_pages,
        offset,
        rows: (total_rows - offset).clamp(0, PAGE_SIZE),
    }
}
