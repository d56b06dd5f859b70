//! Runtime settings for drivers and clients

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::remote::DEFAULT_ENDPOINT;

/// Editor used when neither the settings nor `EDITOR` name one
pub const DEFAULT_EDITOR: &str = "vi";

/// Settings shared by every driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory where secret templates are materialized and editors run
    pub working_dir: PathBuf,
    /// Editor command; `EDITOR` overrides it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    /// GCP Secret Manager settings
    pub gcp: GcpSettings,
}

/// GCP Secret Manager settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcpSettings {
    /// Project used to expand short secret ids and to create new secrets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// REST endpoint, overridable for emulators
    pub endpoint: String,
    /// Pre-issued OAuth2 access token. Never written back to disk.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            editor: None,
            gcp: GcpSettings::default(),
        }
    }
}

impl Default for GcpSettings {
    fn default() -> Self {
        Self {
            project_id: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: None,
        }
    }
}

impl Settings {
    /// Apply overrides from the process environment
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(dir) = var("CLOUDSECRETS_WORKING_DIR") {
            self.working_dir = PathBuf::from(dir);
        }
        if let Some(editor) = var("EDITOR") {
            self.editor = Some(editor);
        }
        if let Some(project) = var("GCP_PROJECT_ID").or_else(|| var("GOOGLE_CLOUD_PROJECT")) {
            self.gcp.project_id = Some(project);
        }
        if let Some(token) = var("GOOGLE_OAUTH_ACCESS_TOKEN") {
            self.gcp.access_token = Some(token);
        }
        if let Some(endpoint) = var("CLOUDSECRETS_GCP_ENDPOINT") {
            self.gcp.endpoint = endpoint;
        }
        self
    }

    /// Editor command to run, falling back to `vi`
    pub fn editor_command(&self) -> &str {
        self.editor.as_deref().unwrap_or(DEFAULT_EDITOR)
    }
}
