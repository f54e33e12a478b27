use scrap_core::responses::OverallStatus;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::success;

/// Handle `scrap health`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = ctx.scrapbook.health().await;
    let message = match report.status {
        OverallStatus::Ok => "All systems operational",
        OverallStatus::Degraded => "Running degraded",
    };
    success(message, report, flags.format)
}
