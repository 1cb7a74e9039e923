//! Bind mount checks
//!
//! The stemcell bind-mounts /var/log, /tmp and /var/tmp onto sub-paths of
//! the ephemeral data disk. These checks verify the mount table and that
//! writes actually flow through to the device source.

use crate::matchers;

use super::CheckContext;
use crate::common::Result;

/// Expected files exist under /var/log
pub async fn var_log_files(ctx: &CheckContext) -> Result<()> {
    // daemon.log only appears after something logs at daemon.*, so seed it.
    ctx.bosh
        .ssh_ok(
            ctx.instance(),
            r#"logger -p daemon.error "Line in daemon.log"; sudo ls /var/log/{audit,auth.log,btmp,daemon.log,kern.log,lastlog,syslog,sysstat,wtmp}"#,
        )
        .await?;
    Ok(())
}

/// /var/log, /tmp and /var/tmp are bind-mounted to the data disk
pub async fn bind_mount_sources(ctx: &CheckContext) -> Result<()> {
    for (target, subdir) in [
        ("/var/log", "root_log"),
        ("/tmp", "root_tmp"),
        ("/var/tmp", "root_tmp"),
    ] {
        let command =
            format!(r#"sudo findmnt -n -T {target} | awk '{{print $1 " " $2}}'"#);
        let stdout = ctx.bosh.ssh_ok(ctx.instance(), &command).await?;
        matchers::is_bind_mounted(&stdout, target, subdir)?;
    }
    Ok(())
}

/// A file written through the bind mount appears at the device source, and
/// one written at the source appears through the mount
pub async fn write_through(ctx: &CheckContext) -> Result<()> {
    ctx.bosh
        .ssh_ok(
            ctx.instance(),
            "sudo touch /var/{log/1,vcap/data/root_log/2}; sudo ls /var/{log,vcap/data/root_log}/{1,2}",
        )
        .await?;
    // Leave no droppings behind.
    ctx.bosh
        .ssh_ok(ctx.instance(), "sudo rm -f /var/log/1 /var/log/2")
        .await?;
    Ok(())
}

/// An unprivileged user can write to the system log
pub async fn syslog_user_write(ctx: &CheckContext) -> Result<()> {
    ctx.bosh
        .ssh_ok(
            ctx.instance(),
            r#"sudo adduser --disabled-password --gecos "" --quiet testuser && sudo -u testuser logger syslog-line && sudo userdel testuser"#,
        )
        .await?;
    Ok(())
}
