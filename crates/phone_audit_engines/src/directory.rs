#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use phone_audit_contracts::directory::{DirectoryEntry, DirectoryFeedRow, Role};
use phone_audit_contracts::ingest::{FeedKind, MalformedRecord};
use phone_audit_contracts::phone::{normalize, PhoneNumber};
use phone_audit_contracts::ContractViolation;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AuditError, DirectoryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub max_directory_entries: usize,
}

impl DirectoryConfig {
    pub fn standard_v1() -> Self {
        Self {
            max_directory_entries: 10_000,
        }
    }

    pub fn validate(&self) -> Result<(), ContractViolation> {
        if self.max_directory_entries == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "directory_config.max_directory_entries",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self::standard_v1()
    }
}

/// Immutable snapshot of the organization, keyed by phone number.
///
/// Reloading the organization builds a new snapshot; nothing mutates one
/// after construction.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: BTreeMap<PhoneNumber, DirectoryEntry>,
}

#[derive(Debug, Clone)]
pub struct DirectoryIngest {
    pub directory: Directory,
    pub blank_rows: usize,
    pub malformed: Vec<MalformedRecord>,
}

impl Directory {
    /// Parses feed rows, discarding blank-phone rows and skipping malformed
    /// ones. Only budget exhaustion fails the whole load.
    pub fn ingest(
        config: &DirectoryConfig,
        rows: impl IntoIterator<Item = DirectoryFeedRow>,
    ) -> Result<DirectoryIngest, AuditError> {
        config.validate()?;
        let mut entries = BTreeMap::new();
        let mut blank_rows = 0usize;
        let mut malformed = Vec::new();

        for (i, row) in rows.into_iter().enumerate() {
            if normalize(&row.phone).is_empty() {
                blank_rows += 1;
                continue;
            }
            match DirectoryEntry::from_feed_row(&row) {
                Ok(entry) => {
                    if entries.contains_key(&entry.phone) {
                        debug!(phone = %entry.phone, row = i + 1, "directory entry overwritten");
                    }
                    insert_within_budget(&mut entries, config, entry)?;
                }
                Err(violation) => {
                    let record = MalformedRecord {
                        feed: FeedKind::Directory,
                        row: i + 1,
                        reason: malformed_reason(&violation, &row.role),
                    };
                    warn!(row = record.row, reason = %record.reason, "skipping malformed directory row");
                    malformed.push(record);
                }
            }
        }

        debug!(
            entries = entries.len(),
            blank_rows,
            malformed = malformed.len(),
            "directory loaded"
        );
        Ok(DirectoryIngest {
            directory: Self { entries },
            blank_rows,
            malformed,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, phone: &PhoneNumber) -> Option<&DirectoryEntry> {
        self.entries.get(phone)
    }

    pub fn is_known(&self, phone: &PhoneNumber) -> bool {
        self.entries.contains_key(phone)
    }

    /// Unknown numbers are not special.
    pub fn is_special(&self, phone: &PhoneNumber) -> bool {
        self.lookup(phone).is_some_and(|e| e.role.is_special())
    }

    pub fn is_zone_leader(&self, phone: &PhoneNumber) -> bool {
        self.lookup(phone).is_some_and(DirectoryEntry::is_zone_leader)
    }

    pub fn same_zone(&self, a: &PhoneNumber, b: &PhoneNumber) -> Result<bool, DirectoryError> {
        let a = self.require(a, "same_zone")?;
        let b = self.require(b, "same_zone")?;
        Ok(a.zone == b.zone)
    }

    pub fn role_of(&self, phone: &PhoneNumber) -> Result<Role, DirectoryError> {
        Ok(self.require(phone, "role_of")?.role)
    }

    pub fn label_of(&self, phone: &PhoneNumber) -> Result<String, DirectoryError> {
        Ok(self.require(phone, "label_of")?.label())
    }

    /// Report label for a caller that may sit outside the directory; falls
    /// back to the bare number.
    pub fn label_or_number(&self, phone: &PhoneNumber) -> String {
        self.lookup(phone)
            .map(DirectoryEntry::label)
            .unwrap_or_else(|| phone.to_string())
    }

    fn require(
        &self,
        phone: &PhoneNumber,
        query: &'static str,
    ) -> Result<&DirectoryEntry, DirectoryError> {
        self.lookup(phone).ok_or_else(|| DirectoryError::UnknownNumber {
            phone: phone.clone(),
            query,
        })
    }
}

fn insert_within_budget(
    entries: &mut BTreeMap<PhoneNumber, DirectoryEntry>,
    config: &DirectoryConfig,
    entry: DirectoryEntry,
) -> Result<(), AuditError> {
    if !entries.contains_key(&entry.phone) && entries.len() >= config.max_directory_entries {
        return Err(AuditError::ResourceExhausted {
            what: "directory entry budget",
            limit: config.max_directory_entries,
            needed: entries.len() + 1,
        });
    }
    entries.insert(entry.phone.clone(), entry);
    Ok(())
}

fn malformed_reason(violation: &ContractViolation, raw_role: &str) -> String {
    match violation {
        ContractViolation::InvalidValue {
            field: "directory_feed_row.role",
            ..
        } => format!(
            "unrecognized role '{}'; expected one of: {}",
            raw_role.trim(),
            Role::allowed_names().join(", ")
        ),
        other => other.to_string(),
    }
}
