//! System-level checks: networking, time sync, logging formats, sysstat

use super::{CheckContext, CheckOutcome};
use crate::common::{Error, Result};
use crate::matchers;

/// auth.log carries no "No such file or directory" errors
///
/// The file is copied off the instance via scp and inspected locally, which
/// also exercises the scp path end to end.
pub async fn auth_log_clean(ctx: &CheckContext) -> Result<()> {
    ctx.bosh
        .ssh_ok(
            ctx.instance(),
            "sudo cp /var/log/auth.log /tmp/ && sudo chmod 777 /tmp/auth.log",
        )
        .await?;

    let local_dir = tempfile::tempdir()?;
    let local_path = local_dir.path().join("auth.log");
    let local = local_path.to_string_lossy();

    let remote = format!("{}:/tmp/auth.log", ctx.instance());
    ctx.bosh.scp(&remote, &local).await?.checked("scp")?;

    let contents = std::fs::read_to_string(&local_path).map_err(|e| Error::FileRead {
        path: local.to_string(),
        error: e.to_string(),
    })?;
    matchers::not_contains(&contents, "No such file or directory")
}

/// sshd listens on IPv4 only (IPv6 disabled in the kernel)
pub async fn ipv6_disabled(ctx: &CheckContext) -> Result<()> {
    let stdout = ctx
        .bosh
        .ssh_ok(
            ctx.instance(),
            r#"sudo netstat -lnp | grep sshd | awk '{ print $4 }'"#,
        )
        .await?;

    let listeners: Vec<&str> = stdout.trim().lines().map(str::trim).collect();
    if listeners != ["0.0.0.0:22"] {
        return Err(Error::assertion(
            "sshd listeners",
            r#"["0.0.0.0:22"]"#,
            &format!("{listeners:?}"),
        ));
    }
    Ok(())
}

/// sysstat collects samples and sar reports an average over them
pub async fn sysstat_enabled(ctx: &CheckContext) -> Result<()> {
    // Collect at least two samples so sar can compute an average.
    ctx.bosh
        .ssh_ok(
            ctx.instance(),
            "sudo /usr/lib/sysstat/debian-sa1 && sudo /usr/lib/sysstat/debian-sa1 1 1 && sleep 2 && sudo /usr/lib/sysstat/debian-sa1 1 1",
        )
        .await?;

    let stdout = ctx.bosh.ssh_ok(ctx.instance(), "sudo sar").await?;
    matchers::matches(&stdout, "^Linux")?;
    matchers::matches(&stdout, r"\nAverage:\s+")?;
    Ok(())
}

/// rsyslog writes fractional-seconds ISO-8601 timestamps
pub async fn precision_timestamps(ctx: &CheckContext) -> Result<()> {
    let token = "smoke-precision-ts";
    let command = format!("logger {token} && sleep 1 && sudo grep {token} /var/log/syslog");
    let stdout = ctx.bosh.ssh_ok(ctx.instance(), &command).await?;
    matchers::has_precision_timestamp(&stdout, token)
}

/// Network interface eth0 exists
pub async fn eth0_present(ctx: &CheckContext) -> Result<()> {
    let stdout = ctx
        .bosh
        .ssh_ok(ctx.instance(), "sudo ip addr show dev eth0")
        .await?;
    matchers::contains(&stdout, "eth0")
}

/// chrony keeps system time within a second of its reference
///
/// Only meaningful on ubuntu-xenial; other target OSes skip.
pub async fn ntp_sync(ctx: &CheckContext) -> Result<CheckOutcome> {
    match ctx.config.os_name.as_deref() {
        Some("ubuntu-xenial") => {}
        other => {
            return Ok(CheckOutcome::Skipped(format!(
                "chrony check applies to ubuntu-xenial only (target OS: {})",
                other.unwrap_or("unset")
            )))
        }
    }

    let tracking = ctx
        .bosh
        .ssh_ok(ctx.instance(), "sudo chronyc -a tracking")
        .await?;

    let reference = matchers::chrony_reference_id(&tracking)?;
    if reference == "0.0.0.0" {
        return Err(Error::assertion(
            "chrony reference server",
            "a reachable NTP server",
            "0.0.0.0 (unsynchronised)",
        ));
    }

    let drift = matchers::chrony_system_time_drift(&tracking)?;
    matchers::below("system time drift (seconds)", drift, 1.0)?;

    // The agent's sync-time script must also succeed.
    ctx.bosh
        .ssh_ok(ctx.instance(), "sudo /var/vcap/bosh/bin/sync-time")
        .await?;

    Ok(CheckOutcome::Passed)
}
