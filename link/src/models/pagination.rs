use serde::{Deserialize, Serialize};

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub per_page: u64,
    pub total_count: u64,
    pub total_page: u64,
    pub current_page: u64,
    /// Number of items on the current page
    #[serde(default)]
    pub current_page_count: u64,
    #[serde(default)]
    pub next_page: Option<u64>,
    #[serde(default)]
    pub previous_page: Option<u64>,
}

impl Pagination {
    /// Derive the metadata for `current_page` (1-based) of a collection.
    ///
    /// A page past the end is valid and simply holds nothing.
    pub fn compute(total_count: u64, per_page: u64, current_page: u64) -> Self {
        let current_page = current_page.max(1);
        let total_page = if per_page == 0 {
            0
        } else {
            total_count.div_ceil(per_page)
        };
        let skipped = per_page.saturating_mul(current_page - 1);
        let current_page_count = total_count.saturating_sub(skipped).min(per_page);
        Self {
            per_page,
            total_count,
            total_page,
            current_page,
            current_page_count,
            next_page: (current_page < total_page).then_some(current_page + 1),
            previous_page: (current_page > 1).then_some(current_page - 1),
        }
    }

    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }
}

/// One page of decoded records.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slice a full collection into one page, computing metadata the same way
/// the backend does. Used for fixtures and client-side paging of small lists.
pub fn paginate<T: Clone>(items: &[T], per_page: u64, page: u64) -> Paginated<T> {
    let pagination = Pagination::compute(items.len() as u64, per_page, page);
    let start = per_page.saturating_mul(pagination.current_page - 1) as usize;
    let items = items
        .iter()
        .skip(start)
        .take(pagination.current_page_count as usize)
        .cloned()
        .collect();
    Paginated { items, pagination }
}
