use serde::{Deserialize, Serialize};

/// Collection pages are fixed at 10 items.
pub const PAGE_SIZE: i64 = 10;

fn default_page() -> i64 {
    1
}

/// `?page=N` query parameter, 1-based.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * PAGE_SIZE
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub items_per_page: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(page: i64, total_items: i64) -> Self {
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + PAGE_SIZE - 1) / PAGE_SIZE
        };
        Self {
            page,
            items_per_page: PAGE_SIZE,
            total_items,
            total_pages,
        }
    }
}

/// Collection response envelope: one page of data plus pagination state.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}
