//! Log rotation checks
//!
//! The stemcell's cron-driven logrotate normally runs on a schedule; the
//! checks rewrite the cron entry to fire every minute, grow the target file
//! past its rotation threshold, and wait for the size to drop.

use std::time::Duration;

use crate::matchers;
use crate::poll::RotationCheck;

use super::CheckContext;
use crate::common::Result;

/// Force the cron logrotate entry to run every minute
async fn enable_every_minute_logrotate(ctx: &CheckContext) -> Result<()> {
    ctx.bosh
        .ssh_ok(
            ctx.instance(),
            r#"sudo sed -E -i "s/[0-9,]+/\*/" /etc/cron.d/logrotate"#,
        )
        .await?;
    Ok(())
}

/// Append ~10MB of random alphanumeric data to a remote file
async fn fill_up_file(ctx: &CheckContext, path: &str) -> Result<()> {
    let command = format!(
        r#"sudo bash -c "dd if=<(tr -cd '[:alnum:]' < /dev/urandom) count=10000 bs=1024 >> {path}""#
    );
    ctx.bosh.ssh_ok(ctx.instance(), &command).await?;
    Ok(())
}

async fn wait_rotated(ctx: &CheckContext, path: &str) -> Result<()> {
    let check = RotationCheck::baseline(&ctx.bosh, ctx.instance(), path).await?;
    check
        .wait_rotated(
            &ctx.bosh,
            ctx.instance(),
            Duration::from_secs(ctx.config.timeouts.rotation_poll_secs),
            Duration::from_secs(ctx.config.timeouts.rotation_timeout_secs),
        )
        .await
}

/// wtmp and btmp are rotated once they grow past the threshold
pub async fn wtmp_btmp(ctx: &CheckContext) -> Result<()> {
    enable_every_minute_logrotate(ctx).await?;

    fill_up_file(ctx, "/var/log/wtmp").await?;
    wait_rotated(ctx, "/var/log/wtmp").await?;

    fill_up_file(ctx, "/var/log/btmp").await?;
    wait_rotated(ctx, "/var/log/btmp").await?;

    Ok(())
}

/// syslog rotates at its size threshold and keeps accepting new messages
///
/// Pre-rotation content must be archived away; post-rotation messages must
/// land in the fresh file.
pub async fn syslog(ctx: &CheckContext) -> Result<()> {
    enable_every_minute_logrotate(ctx).await?;

    ctx.bosh
        .ssh_ok(ctx.instance(), r#"logger "old syslog content""#)
        .await?;

    fill_up_file(ctx, "/var/log/syslog").await?;
    // /var/log is a bind mount; the rotated file lives at the device source.
    wait_rotated(ctx, "/var/vcap/data/root_log/syslog").await?;

    ctx.bosh
        .ssh_ok(ctx.instance(), r#"logger "new syslog content""#)
        .await?;

    let stdout = ctx
        .bosh
        .ssh_ok(
            ctx.instance(),
            r#"sudo grep "[n]ew syslog content\|[o]ld syslog content" /var/vcap/data/root_log/syslog"#,
        )
        .await?;

    matchers::contains(&stdout, "new syslog content")?;
    matchers::not_contains(&stdout, "old syslog content")?;

    Ok(())
}
