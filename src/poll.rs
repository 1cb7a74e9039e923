//! Fixed-interval polling with a timeout
//!
//! The suite's only retry mechanism. A probe is re-run at a fixed interval
//! until a pure predicate accepts its value or the timeout elapses; the
//! timed-out case keeps the last observed value for diagnostics.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::bosh::BoshCli;
use crate::common::{Error, Result};

/// Outcome of a poll loop
#[derive(Debug)]
pub enum Poll<T> {
    /// The predicate accepted a probed value before the timeout
    Satisfied(T),
    /// The timeout elapsed first
    TimedOut { last_observed: T, elapsed: Duration },
}

impl<T: Debug> Poll<T> {
    /// Convert a timed-out poll into [`Error::PollTimeout`]
    pub fn satisfied(self, what: &str) -> Result<T> {
        match self {
            Poll::Satisfied(value) => Ok(value),
            Poll::TimedOut {
                last_observed,
                elapsed,
            } => Err(Error::PollTimeout {
                what: what.to_string(),
                elapsed,
                last_observed: format!("{last_observed:?}"),
            }),
        }
    }
}

/// Re-run `probe` every `interval` until `predicate` accepts its value or
/// `timeout` elapses
///
/// The first probe runs immediately, so a timed-out poll always carries an
/// observed value. Probe errors propagate; the predicate must not mutate
/// anything.
pub async fn poll_until<T, F, Fut, P>(
    mut probe: F,
    predicate: P,
    interval: Duration,
    timeout: Duration,
) -> Result<Poll<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    let start = Instant::now();
    let mut value = probe().await?;

    loop {
        if predicate(&value) {
            return Ok(Poll::Satisfied(value));
        }
        if start.elapsed() + interval > timeout {
            return Ok(Poll::TimedOut {
                last_observed: value,
                elapsed: start.elapsed(),
            });
        }
        tokio::time::sleep(interval).await;
        value = probe().await?;
    }
}

/// Rotation detection for one remote file
///
/// Captures a baseline size at construction; the file counts as rotated on
/// the first observation strictly smaller than the baseline (truncated or
/// replaced by the housekeeping job).
#[derive(Debug)]
pub struct RotationCheck {
    path: String,
    baseline: u64,
}

impl RotationCheck {
    /// Probe the current size of `path` on the instance and record it as
    /// the baseline
    pub async fn baseline(cli: &BoshCli, instance: &str, path: &str) -> Result<Self> {
        let baseline = probe_size(cli, instance, path).await?;
        tracing::debug!(path, baseline, "captured rotation baseline");
        Ok(Self {
            path: path.to_string(),
            baseline,
        })
    }

    /// The rotation predicate: strictly smaller than the baseline
    pub fn is_rotated(&self, size: u64) -> bool {
        size < self.baseline
    }

    /// Poll the remote file size until it rotates or the timeout elapses
    pub async fn wait_rotated(
        &self,
        cli: &BoshCli,
        instance: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<()> {
        let outcome = poll_until(
            || probe_size(cli, instance, &self.path),
            |size| self.is_rotated(*size),
            interval,
            timeout,
        )
        .await?;

        outcome
            .satisfied(&format!("{} to be rotated (baseline {} bytes)", self.path, self.baseline))
            .map(|_| ())
    }
}

/// Size of a remote file in bytes, via a read-only `stat` over SSH
async fn probe_size(cli: &BoshCli, instance: &str, path: &str) -> Result<u64> {
    let command = format!("sudo stat -c %s {path}");
    let stdout = cli.ssh_ok(instance, &command).await?;
    let trimmed = stdout.trim();
    trimmed.parse::<u64>().map_err(|_| {
        Error::Assertion(format!(
            "stat output for '{path}' was not a size: '{trimmed}'"
        ))
    })
}
