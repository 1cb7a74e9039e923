//! Agent settings schema
//!
//! The instance's agent writes `/var/vcap/bosh/settings.json`; the blobstore
//! checks read the live endpoint/credentials out of it and feed them back
//! into a deploy as a vars file. The schema is declared up front and decoded
//! in one parse step rather than through ad hoc inline types.

use serde::{Deserialize, Serialize};
use std::io::Write;

use tempfile::NamedTempFile;

use crate::common::{Error, Result};

/// Remote path of the agent settings document
pub const SETTINGS_PATH: &str = "/var/vcap/bosh/settings.json";

/// Top level of the agent settings document
///
/// Only the fields the suite reads are declared; the document carries much
/// more.
#[derive(Debug, Deserialize)]
pub struct AgentSettings {
    pub env: AgentEnv,
}

#[derive(Debug, Deserialize)]
pub struct AgentEnv {
    pub bosh: BoshEnv,
}

#[derive(Debug, Deserialize)]
pub struct BoshEnv {
    #[serde(default)]
    pub blobstores: Vec<Blobstore>,
}

#[derive(Debug, Deserialize)]
pub struct Blobstore {
    pub options: BlobstoreOptions,
}

#[derive(Debug, Deserialize)]
pub struct BlobstoreOptions {
    pub endpoint: String,
    pub password: String,
    #[serde(default)]
    pub tls: Option<Tls>,
}

#[derive(Debug, Deserialize)]
pub struct Tls {
    pub cert: TlsCert,
}

#[derive(Debug, Deserialize)]
pub struct TlsCert {
    pub ca: String,
}

impl AgentSettings {
    /// Decode a settings document in a single schema-validating step
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The first configured blobstore, which the agent treats as primary
    pub fn primary_blobstore(&self) -> Result<&BlobstoreOptions> {
        self.env
            .bosh
            .blobstores
            .first()
            .map(|b| &b.options)
            .ok_or_else(|| {
                Error::Assertion("agent settings declare no blobstores".to_string())
            })
    }
}

/// Variable-substitution document passed to deploy via `--vars-file`
#[derive(Debug, Serialize)]
pub struct BlobstoreVars {
    pub endpoint: String,
    pub blobstore_agent_password: String,
    pub blobstore_ca_certificate: String,
}

impl BlobstoreVars {
    /// Capture the live blobstore configuration from parsed agent settings
    pub fn from_settings(settings: &AgentSettings) -> Result<Self> {
        let options = settings.primary_blobstore()?;
        Ok(Self {
            endpoint: options.endpoint.clone(),
            blobstore_agent_password: options.password.clone(),
            blobstore_ca_certificate: options
                .tls
                .as_ref()
                .map(|tls| tls.cert.ca.clone())
                .unwrap_or_default(),
        })
    }

    /// Write the vars as YAML to a temp file
    ///
    /// The file is deleted when the returned handle drops, on every exit
    /// path of the calling check.
    pub fn write_temp_file(&self) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        let yaml = serde_yaml::to_string(self)?;
        file.write_all(yaml.as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}
