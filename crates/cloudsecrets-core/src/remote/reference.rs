//! Secret Manager resource references
//!
//! Descriptors may name a secret either by its full resource path or by a
//! short id that is expanded with the configured project:
//!
//! - `projects/my-project/secrets/db-pass/versions/3`
//! - `projects/my-project/secrets/db-pass` (latest version)
//! - `db-pass` or `db-pass@3` (needs a default project)

use std::fmt;

use thiserror::Error;

const LATEST: &str = "latest";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("'{0}' is a short secret id but no GCP project is configured")]
    MissingProject(String),

    #[error("'{0}' is not a valid secret reference")]
    Malformed(String),
}

/// Parsed secret reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    pub project: String,
    pub secret: String,
    pub version: String,
}

impl SecretRef {
    /// Parse `reference`, expanding short ids with `default_project`
    pub fn parse(reference: &str, default_project: Option<&str>) -> Result<Self, ReferenceError> {
        let reference = reference.trim();
        let malformed = || ReferenceError::Malformed(reference.to_string());

        if let Some(rest) = reference.strip_prefix("projects/") {
            let parts: Vec<&str> = rest.split('/').collect();
            let (project, secret, version) = match parts.as_slice() {
                [project, "secrets", secret] => (*project, *secret, LATEST),
                [project, "secrets", secret, "versions", version] => (*project, *secret, *version),
                _ => return Err(malformed()),
            };
            if [project, secret, version].iter().any(|part| part.is_empty()) {
                return Err(malformed());
            }
            return Ok(Self::new(project, secret, version));
        }

        if reference.is_empty() || reference.contains('/') {
            return Err(malformed());
        }

        let (secret, version) = match reference.split_once('@') {
            Some((secret, version)) if !secret.is_empty() && !version.is_empty() => (secret, version),
            Some(_) => return Err(malformed()),
            None => (reference, LATEST),
        };

        let project = default_project
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ReferenceError::MissingProject(reference.to_string()))?;

        Ok(Self::new(project, secret, version))
    }

    pub fn new(project: impl Into<String>, secret: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            secret: secret.into(),
            version: version.into(),
        }
    }

    /// `projects/P/secrets/S`
    pub fn secret_path(&self) -> String {
        format!("projects/{}/secrets/{}", self.project, self.secret)
    }

    /// `projects/P/secrets/S/versions/V`
    pub fn version_path(&self) -> String {
        format!("{}/versions/{}", self.secret_path(), self.version)
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version_path())
    }
}
