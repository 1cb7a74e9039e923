//! Configuration file and environment handling
//!
//! The suite targets one director/deployment at a time. Settings come from
//! an optional TOML file, overlaid by environment variables so CI pipelines
//! can retarget the suite without a config file.

use serde::Deserialize;
use std::path::PathBuf;

use super::{Error, Result};

/// Environment variable naming the target OS (used to skip OS-specific checks)
pub const OS_NAME_ENV: &str = "BOSH_os_name";

/// Main configuration structure
#[derive(Debug, Deserialize)]
pub struct SuiteConfig {
    /// Name of (or path to) the bosh CLI binary
    #[serde(default = "default_bosh_binary")]
    pub bosh_binary: String,

    /// Deployment name passed to every bosh invocation
    #[serde(default = "default_deployment")]
    pub deployment: String,

    /// Instance addressed by job/index
    #[serde(default = "default_instance")]
    pub instance: String,

    /// Directory holding the deployment manifest and ops files
    #[serde(default = "default_manifests_dir")]
    pub manifests_dir: PathBuf,

    /// Target OS identifier, normally taken from `BOSH_os_name`
    #[serde(default)]
    pub os_name: Option<String>,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            bosh_binary: default_bosh_binary(),
            deployment: default_deployment(),
            instance: default_instance(),
            manifests_dir: default_manifests_dir(),
            os_name: None,
            timeouts: Timeouts::default(),
        }
    }
}

fn default_bosh_binary() -> String {
    "bosh".to_string()
}

fn default_deployment() -> String {
    "bosh-stemcell-smoke-tests".to_string()
}

fn default_instance() -> String {
    "default/0".to_string()
}

fn default_manifests_dir() -> PathBuf {
    PathBuf::from("manifests")
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// How long to wait for a log file to rotate
    #[serde(default = "default_rotation_timeout")]
    pub rotation_timeout_secs: u64,

    /// Interval between rotation probes
    #[serde(default = "default_rotation_poll")]
    pub rotation_poll_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            rotation_timeout_secs: default_rotation_timeout(),
            rotation_poll_secs: default_rotation_poll(),
        }
    }
}

fn default_rotation_timeout() -> u64 {
    120
}

fn default_rotation_poll() -> u64 {
    15
}

impl SuiteConfig {
    /// Load configuration from the default config file and the environment
    ///
    /// Returns default configuration if no file exists. Environment
    /// variables always win over file values.
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => {
                let content =
                    std::fs::read_to_string(&path).map_err(|e| Error::FileRead {
                        path: path.display().to_string(),
                        error: e.to_string(),
                    })?;
                toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))?
            }
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Overlay environment variable overrides
    fn apply_env(&mut self) {
        if let Ok(bin) = std::env::var("BOSH_BINARY") {
            self.bosh_binary = bin;
        }
        if let Ok(deployment) = std::env::var("BOSH_DEPLOYMENT") {
            self.deployment = deployment;
        }
        if let Ok(instance) = std::env::var("BOSH_INSTANCE") {
            self.instance = instance;
        }
        if let Ok(dir) = std::env::var("STEMCELL_SMOKE_MANIFESTS") {
            self.manifests_dir = PathBuf::from(dir);
        }
        if let Ok(os_name) = std::env::var(OS_NAME_ENV) {
            self.os_name = Some(os_name);
        }
    }

    /// Resolve the bosh binary to an absolute path
    ///
    /// A value containing a path separator is taken as-is; a bare name is
    /// searched on PATH.
    pub fn resolve_bosh_binary(&self) -> Result<PathBuf> {
        if self.bosh_binary.contains(std::path::MAIN_SEPARATOR) {
            return Ok(PathBuf::from(&self.bosh_binary));
        }
        which::which(&self.bosh_binary).map_err(|_| Error::BoshNotFound {
            name: self.bosh_binary.clone(),
        })
    }

    /// Absolute path to an ops file or manifest under the manifests directory
    pub fn manifest_path(&self, name: &str) -> Result<PathBuf> {
        let path = self.manifests_dir.join(name);
        path.canonicalize().map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }
}

/// Get the path to the configuration file
///
/// Uses the directories crate for platform-appropriate locations,
/// e.g. `~/.config/stemcell-smoke/config.toml` on Linux.
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "stemcell-smoke")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SuiteConfig::default();
        assert_eq!(config.bosh_binary, "bosh");
        assert_eq!(config.instance, "default/0");
        assert_eq!(config.timeouts.rotation_timeout_secs, 120);
        assert_eq!(config.timeouts.rotation_poll_secs, 15);
        assert!(config.os_name.is_none());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: SuiteConfig = toml::from_str(
            r#"
            deployment = "xenial-smoke"

            [timeouts]
            rotation_timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.deployment, "xenial-smoke");
        assert_eq!(config.bosh_binary, "bosh");
        assert_eq!(config.timeouts.rotation_timeout_secs, 30);
        assert_eq!(config.timeouts.rotation_poll_secs, 15);
    }

    #[test]
    fn test_resolve_explicit_path_is_not_searched() {
        let config = SuiteConfig {
            bosh_binary: "/opt/does-not-need-to-exist/bosh".to_string(),
            ..SuiteConfig::default()
        };
        let resolved = config.resolve_bosh_binary().unwrap();
        assert_eq!(resolved, PathBuf::from("/opt/does-not-need-to-exist/bosh"));
    }
}
