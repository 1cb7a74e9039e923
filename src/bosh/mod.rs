//! bosh CLI invocation
//!
//! Thin client over the external bosh CLI. Every check constructs (or is
//! handed) an explicit [`BoshCli`] value; there is no process-wide fixture,
//! so checks stay independently runnable and parallel-safe.
//!
//! The CLI's subcommand surface (`ssh`, `scp`, `deploy`, `logs`) is a fixed
//! external contract; this module only spawns it and captures output.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

use crate::common::{Error, Result, SuiteConfig};

/// Result of one bosh CLI invocation
///
/// Immutable once produced and owned solely by the calling check. Nothing
/// is cached or shared across checks.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

impl InvocationResult {
    /// Check if the invocation succeeded (exit status 0)
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Convert a non-zero exit into an error, keeping both streams for
    /// diagnosis
    pub fn checked(self, subcommand: &str) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::CommandFailed {
                subcommand: subcommand.to_string(),
                exit_status: self.exit_status,
                stdout: self.stdout,
                stderr: self.stderr,
            })
        }
    }
}

/// Client for the external bosh CLI, bound to one deployment
#[derive(Debug, Clone)]
pub struct BoshCli {
    binary: PathBuf,
    deployment: String,
    manifest: PathBuf,
}

impl BoshCli {
    pub fn new(binary: PathBuf, deployment: impl Into<String>, manifest: PathBuf) -> Self {
        Self {
            binary,
            deployment: deployment.into(),
            manifest,
        }
    }

    /// Build a client from suite configuration, resolving the binary on PATH
    pub fn from_config(config: &SuiteConfig) -> Result<Self> {
        Ok(Self::new(
            config.resolve_bosh_binary()?,
            config.deployment.clone(),
            config.manifest_path("smoke.yml")?,
        ))
    }

    /// Path to the underlying CLI binary
    pub fn binary(&self) -> &PathBuf {
        &self.binary
    }

    /// Invoke a bosh subcommand and capture both streams and the exit status
    ///
    /// A non-zero exit is reported in the result, not as an error; only a
    /// failure to launch or await the child process is an `Err`.
    pub async fn run(&self, subcommand: &str, args: &[&str]) -> Result<InvocationResult> {
        self.run_with_flags(&[], subcommand, args).await
    }

    /// Like [`run`](Self::run), with extra global flags placed before the
    /// subcommand (e.g. `--column=stdout`)
    pub async fn run_with_flags(
        &self,
        global_flags: &[&str],
        subcommand: &str,
        args: &[&str],
    ) -> Result<InvocationResult> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-n")
            .arg("-d")
            .arg(&self.deployment)
            .args(global_flags)
            .arg(subcommand)
            .args(args)
            .stdin(Stdio::null());

        tracing::debug!(
            binary = %self.binary.display(),
            subcommand,
            ?args,
            "invoking bosh"
        );

        let output = cmd.output().await.map_err(|e| Error::Exec {
            binary: self.binary.display().to_string(),
            subcommand: subcommand.to_string(),
            source: e,
        })?;

        let exit_status = output.status.code().ok_or_else(|| Error::Exec {
            binary: self.binary.display().to_string(),
            subcommand: subcommand.to_string(),
            source: std::io::Error::other("child terminated by signal"),
        })?;

        tracing::debug!(subcommand, exit_status, "bosh exited");

        Ok(InvocationResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_status,
        })
    }

    /// Run a shell command on the instance via `bosh ssh`
    pub async fn ssh(&self, instance: &str, remote_command: &str) -> Result<InvocationResult> {
        self.run_with_flags(
            &["--column=stdout"],
            "ssh",
            &[instance, "-r", "-c", remote_command],
        )
        .await
    }

    /// Run a remote command and require exit status 0, returning stdout
    pub async fn ssh_ok(&self, instance: &str, remote_command: &str) -> Result<String> {
        let result = self.ssh(instance, remote_command).await?.checked("ssh")?;
        Ok(result.stdout)
    }

    /// Copy a file between the instance and the local host via `bosh scp`
    pub async fn scp(&self, src: &str, dst: &str) -> Result<InvocationResult> {
        self.run("scp", &[src, dst]).await
    }

    /// Fetch instance logs into a local directory via `bosh logs`
    pub async fn logs(&self, instance: &str, dir: &str) -> Result<InvocationResult> {
        let dir_flag = format!("--dir={dir}");
        self.run("logs", &[instance, &dir_flag]).await
    }

    /// Deploy the suite manifest, failing the calling check on any error
    ///
    /// Used to converge or restore environment state in setup/teardown.
    pub async fn deploy(&self, extra_flags: &[&str]) -> Result<InvocationResult> {
        self.try_deploy(extra_flags).await?.checked("deploy")
    }

    /// Deploy the suite manifest, returning the result even on failure
    ///
    /// Used by checks that deliberately deploy a broken configuration and
    /// assert on the expected failure. Only a launch failure is an `Err`.
    pub async fn try_deploy(&self, extra_flags: &[&str]) -> Result<InvocationResult> {
        let manifest = self.manifest.display().to_string();
        let mut args: Vec<&str> = vec![&manifest];
        args.extend_from_slice(extra_flags);
        self.run("deploy", &args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_cli() -> BoshCli {
        // `echo` stands in for the bosh binary: it prints its argv, which
        // lets us assert on argument ordering without a director.
        BoshCli::new(
            PathBuf::from("/bin/echo"),
            "smoke-deployment",
            PathBuf::from("/tmp/smoke.yml"),
        )
    }

    #[tokio::test]
    async fn test_run_captures_stdout_and_exit_status() {
        let result = echo_cli().run("ssh", &["default/0", "uptime"]).await.unwrap();
        assert_eq!(result.exit_status, 0);
        assert!(result.success());
        // echo swallows the leading `-n` as its own flag; the rest of the
        // argv comes back verbatim.
        assert_eq!(
            result.stdout.trim(),
            "-d smoke-deployment ssh default/0 uptime"
        );
        assert!(result.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_global_flags_precede_subcommand() {
        let result = echo_cli()
            .ssh("default/0", "sudo sar")
            .await
            .unwrap();
        assert_eq!(
            result.stdout.trim(),
            "-d smoke-deployment --column=stdout ssh default/0 -r -c sudo sar"
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_exec_error() {
        let cli = BoshCli::new(
            PathBuf::from("/nonexistent/bosh-smoke-binary"),
            "d",
            PathBuf::from("/tmp/smoke.yml"),
        );
        let err = cli.run("ssh", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Exec { .. }));
        assert!(!err.is_command_failure());
    }

    #[tokio::test]
    async fn test_nonzero_exit_reported_in_result_not_error() {
        let cli = BoshCli::new(
            PathBuf::from("/bin/sh"),
            // `sh -n -d ...` is nonsense, but sh still runs and exits
            // non-zero, which is exactly the shape we need.
            "x",
            PathBuf::from("/tmp/smoke.yml"),
        );
        let result = cli.run("-c", &["exit 3"]).await.unwrap();
        assert_ne!(result.exit_status, 0);
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_checked_converts_failure() {
        let result = InvocationResult {
            stdout: "out".to_string(),
            stderr: "err".to_string(),
            exit_status: 1,
        };
        let err = result.checked("deploy").unwrap_err();
        assert!(err.is_command_failure());
        let msg = err.to_string();
        assert!(msg.contains("deploy"));
        assert!(msg.contains("out"));
        assert!(msg.contains("err"));
    }
}
