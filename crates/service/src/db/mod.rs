//! Business CRUD over the sea-orm entities. Free functions taking a
//! connection, one module per resource.

pub mod catalog_service;
pub mod staff_service;
pub mod client_service;
pub mod booking_service;
pub mod schedule_service;
pub mod session_service;
pub mod package_service;
pub mod intake_service;
pub mod disclaimer_service;

use common::pagination::Pagination;
use sea_orm::{
    sea_query::{Expr, Func, IntoColumnRef, SimpleExpr},
    ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, Select,
};

pub(crate) fn default_true() -> bool { true }

/// `LOWER(col) LIKE '%term%'`, portable across Postgres and SQLite.
pub(crate) fn lower_like(col: impl IntoColumnRef, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", term.trim().to_lowercase());
    Expr::expr(Func::lower(Expr::col(col))).like(pattern)
}

/// Whole result set, or one page when the caller asked for a page.
pub(crate) async fn fetch_page<E, C>(select: Select<E>, db: &C, page: Option<Pagination>) -> Result<Vec<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    match page {
        Some(p) => {
            let (idx, per_page) = p.normalize();
            select.paginate(db, per_page).fetch_page(idx).await
        }
        None => select.all(db).await,
    }
}

/// Trimmed, non-empty search term.
pub(crate) fn search_term(search: &Option<String>) -> Option<&str> {
    search.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
