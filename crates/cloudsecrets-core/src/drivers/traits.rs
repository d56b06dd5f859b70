//! Driver contract and errors

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::codec::CodecError;
use crate::editor::ExecError;
use crate::remote::RemoteError;
use crate::types::{SecretFile, SecretValue};

/// Stages of a descriptor read, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStage {
    ParseDocument,
    ExtractName,
    ExtractSpec,
    DecodeSpec,
    ValidateFields,
    FetchRemote,
    DecodeWire,
}

impl fmt::Display for ReadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadStage::ParseDocument => "parse document",
            ReadStage::ExtractName => "extract name",
            ReadStage::ExtractSpec => "extract spec",
            ReadStage::DecodeSpec => "decode spec",
            ReadStage::ValidateFields => "validate fields",
            ReadStage::FetchRemote => "fetch remote",
            ReadStage::DecodeWire => "decode wire value",
        };
        f.write_str(name)
    }
}

/// Authoring steps that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthoringStage {
    Executor,
    SaveTemplate,
    Editor,
}

impl fmt::Display for AuthoringStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthoringStage::Executor => "prepare executor",
            AuthoringStage::SaveTemplate => "save template",
            AuthoringStage::Editor => "run editor",
        };
        f.write_str(name)
    }
}

/// Errors raised by secret drivers
///
/// Remote and codec failures are transparent: their message and type reach
/// the caller untouched.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("{driver}: can't parse secret document: {detail}")]
    Document { driver: String, detail: String },

    #[error("{driver}: secret must contain string field 'name'")]
    MissingName { driver: String },

    #[error("{driver}: secret '{name}' must contain field 'spec'")]
    MissingSpec { driver: String, name: String },

    #[error("{driver}: can't parse secret '{name}' spec: {detail}")]
    InvalidSpec {
        driver: String,
        name: String,
        detail: String,
    },

    #[error("{driver}: can't parse secret '{name}', field '{field}' is required")]
    MissingField {
        driver: String,
        name: String,
        field: String,
    },

    #[error("{driver}: secret '{name}', field '{field}': {reason}")]
    InvalidField {
        driver: String,
        name: String,
        field: String,
        reason: String,
    },

    #[error("{driver}: expected 1 file, received {count}")]
    FileCount { driver: String, count: usize },

    #[error("{driver}: create secret: {stage}: {source}")]
    Create {
        driver: String,
        stage: AuthoringStage,
        #[source]
        source: AuthoringError,
    },

    #[error("{driver}: edit secret '{name}': {source}")]
    Edit {
        driver: String,
        name: String,
        #[source]
        source: ExecError,
    },

    #[error("{driver}: {operation} is not supported")]
    Unsupported { driver: String, operation: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Underlying cause of a failed authoring step
#[derive(Error, Debug)]
pub enum AuthoringError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl DriverError {
    pub fn missing_field(driver: &str, name: &str, field: &str) -> Self {
        Self::MissingField {
            driver: driver.to_string(),
            name: name.to_string(),
            field: field.to_string(),
        }
    }

    pub fn invalid_field(driver: &str, name: &str, field: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidField {
            driver: driver.to_string(),
            name: name.to_string(),
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn create(driver: &str, stage: AuthoringStage, source: impl Into<AuthoringError>) -> Self {
        Self::Create {
            driver: driver.to_string(),
            stage,
            source: source.into(),
        }
    }

    pub fn unsupported(driver: &str, operation: &str) -> Self {
        Self::Unsupported {
            driver: driver.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Stage of a `read` this error belongs to, when it came from one
    pub fn read_stage(&self) -> Option<ReadStage> {
        match self {
            DriverError::Document { .. } => Some(ReadStage::ParseDocument),
            DriverError::MissingName { .. } => Some(ReadStage::ExtractName),
            DriverError::MissingSpec { .. } => Some(ReadStage::ExtractSpec),
            DriverError::InvalidSpec { .. } => Some(ReadStage::DecodeSpec),
            DriverError::MissingField { .. } | DriverError::InvalidField { .. } => {
                Some(ReadStage::ValidateFields)
            }
            DriverError::Remote(_) => Some(ReadStage::FetchRemote),
            DriverError::Codec(_) => Some(ReadStage::DecodeWire),
            _ => None,
        }
    }
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Contract every secret backend implements
///
/// The host routes a descriptor to the driver whose `key` matches the
/// descriptor's `driver` field.
#[async_trait]
pub trait SecretDriver: Send + Sync {
    /// Unique, stable routing key
    fn key(&self) -> &str;

    /// Parse a descriptor, fetch the secret and decode it
    ///
    /// Returns the secret name and its value. All-or-nothing: any failing
    /// stage aborts the read.
    async fn read(&self, raw: &[u8]) -> DriverResult<(String, SecretValue)>;

    /// Open an existing descriptor in the user's editor
    async fn edit(&self, secret: &SecretFile) -> DriverResult<()>;

    /// Materialize a single template file and open it in the editor
    ///
    /// Returns where the file was written. The file is removed again if the
    /// editor fails.
    async fn create(&self, files: &BTreeMap<String, Vec<u8>>) -> DriverResult<PathBuf>;

    /// Upload the descriptor's `secret_data` to the backend
    async fn push(&self, _raw: &[u8]) -> DriverResult<()> {
        Err(DriverError::unsupported(self.key(), "push"))
    }
}
