#![forbid(unsafe_code)]

use phone_audit_contracts::phone::PhoneNumber;
use phone_audit_contracts::ContractViolation;

/// A directory query assumed membership that does not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("phone number {phone} is not in the directory ({query})")]
    UnknownNumber {
        phone: PhoneNumber,
        query: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The data set does not fit the configured budget or available memory.
    #[error("{what} exhausted: limit {limit}, needed {needed}")]
    ResourceExhausted {
        what: &'static str,
        limit: usize,
        needed: usize,
    },

    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),
}

impl AuditError {
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, Self::ResourceExhausted { .. })
    }
}
