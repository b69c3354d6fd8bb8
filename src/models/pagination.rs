// src/models/pagination.rs

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Raw query parameters for paginated listings.
/// Kept as strings so malformed numbers become a `params_invalid` body instead of a
/// framework-level rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

/// Pagination block of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_items: u64,
    /// Items expected on the current page.
    pub item_count: u64,
    pub items_per_page: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

impl Pagination {
    /// A zero `items_per_page` yields no pages.
    pub fn new(total_items: u64, current_page: u64, items_per_page: u64) -> Self {
        let total_pages = match items_per_page {
            0 => 0,
            size => total_items.div_ceil(size),
        };
        let item_count = if current_page < total_pages {
            items_per_page
        } else {
            total_items.saturating_sub(items_per_page * total_pages.saturating_sub(1))
        };

        Self {
            total_items,
            item_count,
            items_per_page,
            total_pages,
            current_page,
        }
    }
}

/// Success envelope for paginated listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub total_items: u64,
    pub pagination: Pagination,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            total_items: pagination.total_items,
            pagination,
        }
    }
}
