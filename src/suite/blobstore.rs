//! Targeted blobstore checks
//!
//! Both checks capture the live blobstore configuration from the agent's
//! settings document, then redeploy with an ops file that points one of the
//! agent's blobstores at an invalid config path. Either way the instance is
//! restored with a plain deploy before the check returns.

use crate::matchers;
use crate::settings::{AgentSettings, BlobstoreVars, SETTINGS_PATH};

use super::CheckContext;
use crate::common::{Error, Result};

/// Output every broken blobstore invocation must mention
const INVALID_BLOBSTORE_PATTERN: &str =
    "bosh-blobstore-dav -c /var/vcap/bosh/etc/invalid/blobstore-dav.json";

/// Read and parse the agent settings document off the instance
async fn read_agent_settings(ctx: &CheckContext) -> Result<AgentSettings> {
    let command = format!("sudo cat {SETTINGS_PATH}");
    let stdout = ctx.bosh.ssh_ok(ctx.instance(), &command).await?;
    AgentSettings::parse(&stdout)
}

/// An invalid logs blobstore breaks `bosh logs` while the deploy succeeds
pub async fn invalid_logs_blobstore(ctx: &CheckContext) -> Result<()> {
    let settings = read_agent_settings(ctx).await?;
    let vars = BlobstoreVars::from_settings(&settings)?;
    let vars_file = vars.write_temp_file()?;
    let vars_flag = vars_file.path().display().to_string();

    let ops_file = ctx.config.manifest_path("add-invalid-logs-blobstore.yml")?;
    let ops_flag = ops_file.display().to_string();

    let result = async {
        // Only the logs blobstore is broken, so the deploy itself converges.
        ctx.bosh
            .deploy(&["-o", &ops_flag, "--vars-file", &vars_flag])
            .await?;

        let logs_dir = tempfile::tempdir()?;
        let logs = ctx
            .bosh
            .logs(ctx.instance(), &logs_dir.path().to_string_lossy())
            .await?;

        if logs.exit_status != 1 {
            return Err(Error::assertion(
                "bosh logs against a broken logs blobstore",
                "exit status 1",
                &format!("exit status {}\nstdout: {}", logs.exit_status, logs.stdout),
            ));
        }
        matchers::matches(logs.stdout.trim(), INVALID_BLOBSTORE_PATTERN)
    }
    .await;

    // Restore a working deployment whether or not the assertions held.
    let restore = ctx.bosh.deploy(&[]).await.map(|_| ());
    result.and(restore)
}

/// An invalid packages blobstore fails the deploy itself
pub async fn invalid_packages_blobstore(ctx: &CheckContext) -> Result<()> {
    let settings = read_agent_settings(ctx).await?;
    let vars = BlobstoreVars::from_settings(&settings)?;
    let vars_file = vars.write_temp_file()?;
    let vars_flag = vars_file.path().display().to_string();

    let ops_file = ctx
        .config
        .manifest_path("add-invalid-packages-blobstore.yml")?;
    let ops_flag = ops_file.display().to_string();

    let result = async {
        // Failure is the expected outcome here, so use the unchecked deploy.
        let deploy = ctx
            .bosh
            .try_deploy(&["-o", &ops_flag, "--vars-file", &vars_flag])
            .await?;

        if deploy.success() {
            return Err(Error::assertion(
                "deploy with a broken packages blobstore",
                "a failing deploy (exit status 1)",
                "exit status 0",
            ));
        }
        if deploy.exit_status != 1 {
            return Err(Error::assertion(
                "deploy with a broken packages blobstore",
                "exit status 1",
                &format!(
                    "exit status {}\nstdout: {}\nstderr: {}",
                    deploy.exit_status, deploy.stdout, deploy.stderr
                ),
            ));
        }
        matchers::matches(&deploy.stdout, INVALID_BLOBSTORE_PATTERN)
    }
    .await;

    let restore = ctx.bosh.deploy(&[]).await.map(|_| ());
    result.and(restore)
}
