use std::path::Path;

use anyhow::Context;
use exm_api::pages::{Page, PageRequest, PrefetchedPage};
use exm_query::PrefetchReport;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PageArgs;
use crate::commands::shared::limit::pagination;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct SnapshotWritten<'a> {
    page: Page,
    path: String,
    queries: usize,
    report: &'a PrefetchReport,
}

/// Handle `exm page`.
pub async fn handle(args: &PageArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut request = PageRequest::new(args.name);
    request.pagination = pagination(ctx, flags);
    if let Some(id) = &args.id {
        request = request.with_id(id);
    }

    let prefetched = ctx.api.prefetch_page(&request).await?;
    if !prefetched.report.is_complete() {
        tracing::warn!(
            page = %prefetched.page,
            failed = prefetched.report.failed.len(),
            "page prefetched partially"
        );
    }

    match &args.out {
        Some(path) => {
            write_snapshot(path, &prefetched)?;
            output(
                &SnapshotWritten {
                    page: prefetched.page,
                    path: path.display().to_string(),
                    queries: prefetched.state.len(),
                    report: &prefetched.report,
                },
                flags.format,
            )
        }
        None => output(&prefetched, flags.format),
    }
}

/// Only the dehydrated state is written; `--hydrate` reads it back.
fn write_snapshot(path: &Path, prefetched: &PrefetchedPage) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&prefetched.state)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
