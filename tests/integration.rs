//! End-to-end tests for the bosh invocation plumbing
//!
//! These run the real child-process path against the `fake-bosh` test
//! binary, whose behavior is scripted per test through a JSON responses
//! file. No director or deployed stemcell is needed.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;

use smoke::poll::RotationCheck;
use smoke::{matchers, BoshCli, Error};
use tempfile::TempDir;

/// Per-test sandbox wiring a BoshCli to the fake-bosh binary
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Script the fake CLI with a JSON responses document and return a
    /// client pointed at it
    ///
    /// The fake binary reads its script from the environment, so each test
    /// gets a wrapper shell script carrying its own settings; tests stay
    /// parallel-safe.
    fn bosh_with_responses(&self, responses: &str) -> BoshCli {
        let responses_path = self.path("responses.json");
        fs::write(&responses_path, responses).expect("write responses");

        let wrapper = self.path("bosh");
        let script = format!(
            "#!/bin/sh\nexport FAKE_BOSH_RESPONSES={}\nexport FAKE_BOSH_STATE={}\nexport FAKE_BOSH_LOG={}\nexec {} \"$@\"\n",
            responses_path.display(),
            self.temp_dir.path().display(),
            self.path("invocations.log").display(),
            fake_bosh_binary().display(),
        );
        fs::write(&wrapper, script).expect("write wrapper");
        fs::set_permissions(&wrapper, fs::Permissions::from_mode(0o755))
            .expect("chmod wrapper");

        BoshCli::new(wrapper, "smoke-deployment", self.path("smoke.yml"))
    }

    /// Everything the fake CLI was invoked with, one argv per line
    fn invocations(&self) -> String {
        fs::read_to_string(self.path("invocations.log")).unwrap_or_default()
    }
}

fn fake_bosh_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_fake_bosh"))
}

#[tokio::test]
async fn test_streams_are_captured_byte_for_byte() {
    let ctx = TestContext::new();
    let bosh = ctx.bosh_with_responses(
        r#"{"ssh": {"stdout": "line one\nline two\n", "stderr": "warning: x\n", "exit": 0}}"#,
    );

    let result = bosh.ssh("default/0", "uptime").await.unwrap();
    assert_eq!(result.exit_status, 0);
    assert_eq!(result.stdout, "line one\nline two\n");
    assert_eq!(result.stderr, "warning: x\n");
}

#[tokio::test]
async fn test_ssh_argv_shape() {
    let ctx = TestContext::new();
    let bosh = ctx.bosh_with_responses("{}");

    bosh.ssh("default/0", "sudo sar").await.unwrap();

    let log = ctx.invocations();
    assert_eq!(
        log.trim(),
        "-n -d smoke-deployment --column=stdout ssh default/0 -r -c sudo sar"
    );
}

#[tokio::test]
async fn test_missing_binary_is_exec_error_with_no_output() {
    let bosh = BoshCli::new(
        PathBuf::from("/nonexistent/fake-bosh"),
        "smoke-deployment",
        PathBuf::from("/tmp/smoke.yml"),
    );
    let err = bosh.run("deploy", &[]).await.unwrap_err();
    assert!(matches!(err, Error::Exec { .. }));
}

#[tokio::test]
async fn test_safe_deploy_aborts_on_failure() {
    let ctx = TestContext::new();
    let bosh = ctx.bosh_with_responses(
        r#"{"deploy": {"stdout": "Task 42 error", "stderr": "deploy failed", "exit": 1}}"#,
    );

    let err = bosh.deploy(&[]).await.unwrap_err();
    assert!(err.is_command_failure());
    assert!(err.to_string().contains("deploy failed"));
}

#[tokio::test]
async fn test_unsafe_deploy_returns_expected_failure() {
    // The blobstore check's shape: the deploy is expected to fail with a
    // diagnostic pointing at the invalid blobstore config, and the caller
    // still gets to assert on stdout.
    let ctx = TestContext::new();
    let bosh = ctx.bosh_with_responses(
        r#"{"deploy": {"stdout": "Task 43 | error: running bosh-blobstore-dav -c /var/vcap/bosh/etc/invalid/blobstore-dav.json\n", "exit": 1}}"#,
    );

    let result = bosh
        .try_deploy(&["-o", "/tmp/ops.yml", "--vars-file", "/tmp/vars.yml"])
        .await
        .unwrap();

    assert_eq!(result.exit_status, 1);
    matchers::contains(
        &result.stdout,
        "bosh-blobstore-dav -c /var/vcap/bosh/etc/invalid/blobstore-dav.json",
    )
    .unwrap();

    // The same invocation through the checked path must abort instead.
    let err = bosh.deploy(&[]).await.unwrap_err();
    assert!(err.is_command_failure());
}

#[tokio::test]
async fn test_deploy_argv_carries_manifest_and_flags() {
    let ctx = TestContext::new();
    let bosh = ctx.bosh_with_responses("{}");

    bosh.try_deploy(&["--recreate", "-o", "/tmp/ops.yml"])
        .await
        .unwrap();

    let log = ctx.invocations();
    let expected = format!(
        "-n -d smoke-deployment deploy {} --recreate -o /tmp/ops.yml",
        ctx.path("smoke.yml").display()
    );
    assert_eq!(log.trim(), expected);
}

#[tokio::test]
async fn test_logs_failure_keeps_stdout_for_assertions() {
    let ctx = TestContext::new();
    let bosh = ctx.bosh_with_responses(
        r#"{"logs": {"stdout": "bosh-blobstore-dav -c /var/vcap/bosh/etc/invalid/blobstore-dav.json\n", "exit": 1}}"#,
    );

    let result = bosh.logs("default/0", "/tmp/bosh-logs").await.unwrap();
    assert_eq!(result.exit_status, 1);
    matchers::matches(
        result.stdout.trim(),
        "bosh-blobstore-dav -c /var/vcap/bosh/etc/invalid/blobstore-dav.json",
    )
    .unwrap();
}

#[tokio::test]
async fn test_rotation_check_end_to_end() {
    // The stat probe runs over ssh; script the probed sizes to grow past
    // the baseline, then drop. The wait must return once the drop lands.
    let ctx = TestContext::new();
    let bosh = ctx.bosh_with_responses(
        r#"{"ssh": [
            {"stdout": "1000\n"},
            {"stdout": "1500\n"},
            {"stdout": "2500\n"},
            {"stdout": "12\n"}
        ]}"#,
    );

    let check = RotationCheck::baseline(&bosh, "default/0", "/var/log/wtmp")
        .await
        .unwrap();

    check
        .wait_rotated(
            &bosh,
            "default/0",
            Duration::from_millis(5),
            Duration::from_secs(10),
        )
        .await
        .unwrap();

    // Baseline probe plus three polls.
    assert_eq!(ctx.invocations().lines().count(), 4);
}

#[tokio::test]
async fn test_rotation_times_out_without_a_drop() {
    let ctx = TestContext::new();
    let bosh = ctx.bosh_with_responses(r#"{"ssh": [{"stdout": "1000\n"}, {"stdout": "1500\n"}]}"#);

    let check = RotationCheck::baseline(&bosh, "default/0", "/var/log/btmp")
        .await
        .unwrap();

    let err = check
        .wait_rotated(
            &bosh,
            "default/0",
            Duration::from_millis(20),
            Duration::from_millis(80),
        )
        .await
        .unwrap_err();

    match err {
        Error::PollTimeout { last_observed, .. } => assert_eq!(last_observed, "1500"),
        other => panic!("expected PollTimeout, got {other}"),
    }
}

#[tokio::test]
async fn test_ssh_ok_surfaces_remote_failure() {
    let ctx = TestContext::new();
    let bosh = ctx.bosh_with_responses(
        r#"{"ssh": {"stdout": "", "stderr": "grep: no match", "exit": 2}}"#,
    );

    let err = bosh
        .ssh_ok("default/0", "sudo grep marker /var/log/syslog")
        .await
        .unwrap_err();
    assert!(err.is_command_failure());
    assert!(err.to_string().contains("grep: no match"));
}
