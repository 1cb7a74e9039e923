//! Hardening checks

use crate::matchers;

use super::CheckContext;
use crate::common::Result;

/// After redeploying with the removal ops file, no path from the dev-tools
/// or static-libraries manifests remains on disk
///
/// The remote probe prints `found file <path>` for every survivor, so a
/// clean instance produces only the `-` placeholder.
pub async fn dev_tools_removed(ctx: &CheckContext) -> Result<()> {
    let ops_file = ctx
        .config
        .manifest_path("remove_dev_tools_and_static_libraries.yml")?;
    let ops_flag = ops_file.display().to_string();

    ctx.bosh.deploy(&["--recreate", "-o", &ops_flag]).await?;

    let stdout = ctx
        .bosh
        .ssh_ok(
            ctx.instance(),
            r#"sudo cat /var/vcap/bosh/etc/dev_tools_file_list | xargs -n1 -I {} /bin/bash -c '[ ! -e % ] || echo found file %'"#,
        )
        .await?;
    matchers::equals_trimmed(&stdout, "-")?;

    let stdout = ctx
        .bosh
        .ssh_ok(
            ctx.instance(),
            r#"sudo cat /var/vcap/bosh/etc/static_libraries_list | xargs -n1 -I % /bin/bash -c '[ ! -e % ] || echo found library %'"#,
        )
        .await?;
    matchers::equals_trimmed(&stdout, "-")?;

    Ok(())
}
