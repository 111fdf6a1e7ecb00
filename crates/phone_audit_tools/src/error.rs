#![forbid(unsafe_code)]

use std::path::PathBuf;

use phone_audit_contracts::ContractViolation;
use phone_audit_engines::AuditError;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report")]
    Write(#[from] std::io::Error),

    #[error("invalid JSON feed {path}")]
    FeedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid settings file {path}")]
    SettingsToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to render settings")]
    SettingsRender(#[from] toml::ser::Error),

    #[error("failed to render report")]
    ReportJson(#[from] serde_json::Error),

    #[error("missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("invalid setting: {0}")]
    InvalidSetting(#[from] ContractViolation),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl ToolError {
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, Self::Audit(err) if err.is_resource_exhaustion())
    }
}
