use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Query parameters shared by paginated list endpoints.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    /// Page number (1-indexed, at most 1000000).
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page (1-100).
    #[param(example = 20)]
    pub per_page: Option<u64>,
}

/// Highest page number a list endpoint accepts.
pub const MAX_PAGE: u64 = 1_000_000;

impl PageQuery {
    /// Resolve to `(page, per_page)`, clamping `per_page` and a zero page.
    /// Pages past [`MAX_PAGE`] are rejected.
    pub fn resolve(&self, default_per_page: u64) -> Result<(u64, u64), AppError> {
        let page = Ord::max(self.page.unwrap_or(1), 1);
        if page > MAX_PAGE {
            return Err(AppError::Validation(format!(
                "page must be at most {}",
                MAX_PAGE
            )));
        }
        let per_page = self.per_page.unwrap_or(default_per_page).clamp(1, 100);
        Ok((page, per_page))
    }
}

/// Row offset of the first item on `page`.
pub fn page_offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(per_page)
}

/// Validate a trimmed display name (1-255 Unicode characters).
pub fn validate_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 255 {
        return Err(AppError::Validation("Name must be 1-255 characters".into()));
    }
    Ok(())
}
