//! Page arithmetic shared by every list endpoint.

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// One page of results plus the counters the list envelope carries.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

/// Slices `items` into the requested page.
///
/// Pages are 1-based. A page past the end yields an empty item list with the
/// counters intact; a zero page or limit falls back to the defaults.
pub fn paginate<T>(items: Vec<T>, page: Option<u64>, limit: Option<u64>) -> Page<T> {
    let page = match page {
        Some(0) | None => DEFAULT_PAGE,
        Some(p) => p,
    };
    let limit = match limit {
        Some(0) | None => DEFAULT_LIMIT,
        Some(l) => l,
    };

    let total = items.len() as u64;
    let total_pages = total.div_ceil(limit);
    // page and limit come straight from the query string; saturate rather
    // than trust their product to fit.
    let start = page.saturating_sub(1).saturating_mul(limit);

    let items = items
        .into_iter()
        .skip(usize::try_from(start).unwrap_or(usize::MAX))
        .take(limit as usize)
        .collect();

    Page {
        items,
        total,
        total_pages,
        current_page: page,
    }
}
