//! GCP Secret Manager driver
//!
//! Descriptor format:
//!
//! ```yaml
//! name: db-pass
//! driver: gcp_secretmanager
//! spec:
//!   gcp_secret_name: projects/acme/secrets/db-pass/versions/latest
//!   secret_data:        # only used by `push`
//!     user: admin
//!     password: hunter2
//! ```
//!
//! `gcp_secret_name` may also be a short id (`db-pass`, `db-pass@3`) when a
//! project is configured.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::descriptor::{decode_spec, parse_descriptor};
use super::traits::{AuthoringStage, DriverError, DriverResult, SecretDriver};
use crate::codec;
use crate::config::Settings;
use crate::editor::{save_template, ExecError, Executor};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::remote::{ReferenceError, RemoteError, SecretManagerClient, SecretRef};
use crate::types::{CancellationToken, SecretFile, SecretValue};
use crate::{log_debug, log_info, log_warn};

/// Routing key of this driver
pub const GCP_SECRETMANAGER_KEY: &str = "gcp_secretmanager";

const SECRET_NAME_FIELD: &str = "spec.gcp_secret_name";
const SECRET_DATA_FIELD: &str = "spec.secret_data";
const PROJECT_FIELD: &str = "gcp.project_id";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SecretManagerSpec {
    #[serde(rename = "gcp_secret_name", default)]
    secret_name: String,
    #[serde(rename = "secret_data", alias = "secretData", default)]
    data: Option<serde_yaml::Value>,
}

/// Driver for descriptors stored in GCP Secret Manager
pub struct GcpSecretManagerDriver {
    client: Arc<dyn SecretManagerClient>,
    settings: Settings,
    interrupt: CancellationToken,
    logger: SharedLogger,
}

impl GcpSecretManagerDriver {
    pub fn new(client: Arc<dyn SecretManagerClient>, settings: Settings) -> Self {
        Self {
            client,
            settings,
            interrupt: CancellationToken::new(),
            logger: NoOpLogger::shared(),
        }
    }

    /// Token that interrupts editor sessions started by this driver
    pub fn with_interrupt(mut self, interrupt: CancellationToken) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Descriptor stages up to field validation
    fn parse(&self, raw: &[u8]) -> DriverResult<(String, SecretManagerSpec, SecretRef)> {
        let descriptor = parse_descriptor(GCP_SECRETMANAGER_KEY, raw)?;
        let name = descriptor.name;
        let spec: SecretManagerSpec = decode_spec(GCP_SECRETMANAGER_KEY, &name, &descriptor.spec)?;

        if spec.secret_name.trim().is_empty() {
            return Err(DriverError::missing_field(GCP_SECRETMANAGER_KEY, &name, SECRET_NAME_FIELD));
        }

        let reference = SecretRef::parse(&spec.secret_name, self.settings.gcp.project_id.as_deref())
            .map_err(|e| match e {
                ReferenceError::MissingProject(_) => {
                    DriverError::missing_field(GCP_SECRETMANAGER_KEY, &name, PROJECT_FIELD)
                }
                ReferenceError::Malformed(_) => {
                    DriverError::invalid_field(GCP_SECRETMANAGER_KEY, &name, SECRET_NAME_FIELD, e)
                }
            })?;

        Ok((name, spec, reference))
    }

    fn executor(&self) -> Result<Executor, ExecError> {
        Executor::new(&self.settings.working_dir, self.interrupt.clone())
    }
}

#[async_trait]
impl SecretDriver for GcpSecretManagerDriver {
    fn key(&self) -> &str {
        GCP_SECRETMANAGER_KEY
    }

    async fn read(&self, raw: &[u8]) -> DriverResult<(String, SecretValue)> {
        let (name, _, reference) = self.parse(raw)?;

        log_debug!(self.logger, "Downloading secret '{}' from {} ({})", name, reference, self.client.name());
        let wire = self.client.access_secret(&reference.version_path()).await?;
        let value = codec::decode(&wire, &name)?;

        Ok((name, value))
    }

    async fn edit(&self, secret: &SecretFile) -> DriverResult<()> {
        let edit_error = |source| DriverError::Edit {
            driver: GCP_SECRETMANAGER_KEY.to_string(),
            name: secret.name.clone(),
            source,
        };

        let executor = self.executor().map_err(edit_error)?;
        executor
            .open_in_editor(self.settings.editor_command(), secret.path())
            .await
            .map_err(edit_error)
    }

    async fn create(&self, files: &BTreeMap<String, Vec<u8>>) -> DriverResult<PathBuf> {
        let (file_name, data) = match files.iter().next() {
            Some(entry) if files.len() == 1 => entry,
            _ => {
                return Err(DriverError::FileCount {
                    driver: GCP_SECRETMANAGER_KEY.to_string(),
                    count: files.len(),
                })
            }
        };

        let executor = self
            .executor()
            .map_err(|e| DriverError::create(GCP_SECRETMANAGER_KEY, AuthoringStage::Executor, e))?;

        let path = save_template(executor.working_dir(), file_name, data)
            .map_err(|e| DriverError::create(GCP_SECRETMANAGER_KEY, AuthoringStage::SaveTemplate, e))?;

        if let Err(e) = executor.open_in_editor(self.settings.editor_command(), &path).await {
            if let Err(rm) = fs::remove_file(&path) {
                log_warn!(self.logger, "Can't remove {}: {}", path.display(), rm);
            }
            return Err(DriverError::create(GCP_SECRETMANAGER_KEY, AuthoringStage::Editor, e));
        }

        log_info!(self.logger, "Secret template saved to {}", path.display());
        Ok(path)
    }

    async fn push(&self, raw: &[u8]) -> DriverResult<()> {
        let (name, spec, reference) = self.parse(raw)?;

        let data = spec
            .data
            .ok_or_else(|| DriverError::missing_field(GCP_SECRETMANAGER_KEY, &name, SECRET_DATA_FIELD))?;
        let wire = codec::encode(&SecretValue::from_yaml(data)?)?;

        let secret_path = match self.client.access_secret(&reference.version_path()).await {
            Ok(_) => reference.secret_path(),
            Err(e) if e.is_not_found() => {
                log_info!(self.logger, "Creating secret {} in project {}", reference.secret, reference.project);
                match self.client.create_secret(&reference.project, &reference.secret).await {
                    Ok(created) => created,
                    // Secret exists but the requested version does not
                    Err(RemoteError::AlreadyExists(_)) => reference.secret_path(),
                    Err(e) => return Err(e.into()),
                }
            }
            Err(e) => return Err(e.into()),
        };

        log_debug!(
            self.logger,
            "Adding version to {} for secret '{}' ({})",
            secret_path,
            name,
            self.client.name()
        );
        self.client.add_secret_version(&secret_path, &wire).await?;
        Ok(())
    }
}
