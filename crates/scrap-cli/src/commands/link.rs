use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use scrap_lifecycle::SharedLinkManager;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LinkCommands;
use crate::context::AppContext;
use crate::output::success;

#[derive(Debug, Serialize)]
struct SweepResponse {
    removed: u64,
}

/// Handle `scrap link`.
pub async fn handle(
    action: &LinkCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let links = ctx.scrapbook.links();
    match action {
        LinkCommands::Create {
            project_id,
            expires_in_hours,
            expires_at,
        } => {
            let expires_at = match (expires_at, expires_in_hours) {
                (Some(at), _) => Some(*at),
                (None, Some(hours)) => Some(expiry_after_hours(Utc::now(), *hours)?),
                (None, None) => None,
            };
            let link = links.issue(*project_id, expires_at).await?;
            success("Shared link created successfully", link, flags.format)
        }
        LinkCommands::List { project_id } => {
            let list = links.list(*project_id).await?;
            success("Shared links fetched successfully", list, flags.format)
        }
        LinkCommands::Revoke { token } => {
            let link = links.revoke(token).await?;
            success("Shared link revoked successfully", link, flags.format)
        }
        LinkCommands::Resolve { token } => {
            let shared = links.resolve(token).await?;
            success("Shared project fetched successfully", shared, flags.format)
        }
        LinkCommands::Sweep { watch: false } => {
            let removed = links.sweep_expired().await?;
            success("Expired links removed", SweepResponse { removed }, flags.format)
        }
        LinkCommands::Sweep { watch: true } => {
            let every = Duration::from_secs(ctx.config.general.sweep_interval_secs.max(1));
            watch_sweep(links, every, flags).await
        }
    }
}

/// Sweep on a fixed interval until Ctrl-C. A failed pass is logged and retried
/// on the next tick.
async fn watch_sweep(
    links: &SharedLinkManager,
    every: Duration,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tracing::info!(interval_secs = every.as_secs(), "watching for expired links");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match links.sweep_expired().await {
                    Ok(removed) => {
                        success("Expired links removed", SweepResponse { removed }, flags.format)?;
                    }
                    Err(e) => tracing::warn!(error = %e, "expired link sweep failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("sweep watcher stopped");
                return Ok(());
            }
        }
    }
}

/// `now + hours`, or a usage error when the result is not representable.
fn expiry_after_hours(now: DateTime<Utc>, hours: i64) -> anyhow::Result<DateTime<Utc>> {
    TimeDelta::try_hours(hours)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| anyhow::anyhow!("--expires-in-hours {hours} is out of range"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn expiry_adds_whole_hours() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let at = expiry_after_hours(now, 24).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn huge_expiry_is_a_usage_error() {
        let now = Utc::now();
        for hours in [i64::MAX, i64::MIN, 1_000_000_000_000] {
            let err = expiry_after_hours(now, hours).unwrap_err();
            assert!(err.to_string().contains("out of range"), "{hours}: {err}");
        }
    }
}
