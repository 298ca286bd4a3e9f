//! Pagination utilities shared by the service and HTTP layers
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

use serde::Deserialize;

/// Pagination parameters
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_per_page() -> u32 { 20 }

impl Pagination {
    /// Clamp to sane defaults and convert to `u64`
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }

    /// Build from optional query values; `None` when no page was requested.
    pub fn from_query(page: Option<u32>, per_page: Option<u32>) -> Option<Self> {
        page.map(|page| Self { page, per_page: per_page.unwrap_or_else(default_per_page) })
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: default_per_page() } }
}
