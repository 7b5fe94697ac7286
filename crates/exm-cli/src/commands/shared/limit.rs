use exm_core::paging::Pagination;

use crate::cli::GlobalFlags;
use crate::context::AppContext;

/// Page size from `--limit`, or `fallback`. A zero limit also falls back.
#[must_use]
pub fn effective_limit(flag: Option<u32>, fallback: u32) -> u32 {
    flag.filter(|&limit| limit > 0).unwrap_or(fallback)
}

/// Page request from `--page`/`--limit`, falling back to `query.page_size`.
#[must_use]
pub fn pagination(ctx: &AppContext, flags: &GlobalFlags) -> Pagination {
    let size = effective_limit(flags.limit, ctx.config.query.page_size);
    Pagination::new(flags.page, size)
}
