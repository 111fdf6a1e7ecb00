#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use phone_audit_contracts::clock::TimeOfDay;
use phone_audit_engines::ledger::{LONG_CALL_SECS, PLANNING_CUTOFF, SHORT_CALL_SECS};
use phone_audit_engines::violation::{DayWindow, MinuteLimits, NightWindow};
use phone_audit_engines::{CallLedgerConfig, DirectoryConfig, ViolationConfig};
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Every recognized option of an analysis run, as read from a TOML file.
/// Missing keys take the standard values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporting_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_date: Option<NaiveDate>,
    pub thresholds: Thresholds,
    pub minute_limits: MinuteLimits,
    pub windows: Windows,
    pub budgets: Budgets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    pub short_call_secs: u32,
    pub long_call_secs: u32,
    pub planning_cutoff: TimeOfDay,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            short_call_secs: SHORT_CALL_SECS,
            long_call_secs: LONG_CALL_SECS,
            planning_cutoff: PLANNING_CUTOFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Windows {
    pub proselyting_opens: TimeOfDay,
    pub proselyting_closes: TimeOfDay,
    pub night_begins: TimeOfDay,
    pub night_ends: TimeOfDay,
}

impl Default for Windows {
    fn default() -> Self {
        let standard = ViolationConfig::standard_v1();
        Self {
            proselyting_opens: standard.proselyting_hours.opens,
            proselyting_closes: standard.proselyting_hours.closes,
            night_begins: standard.night.begins,
            night_ends: standard.night.ends,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Budgets {
    pub max_call_rows: usize,
    pub max_directory_entries: usize,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            max_call_rows: 500_000,
            max_directory_entries: DirectoryConfig::standard_v1().max_directory_entries,
        }
    }
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            reporting_year: None,
            transfer_date: None,
            thresholds: Thresholds::default(),
            minute_limits: MinuteLimits::standard_v1(),
            windows: Windows::default(),
            budgets: Budgets::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub directory: DirectoryConfig,
    pub ledger: CallLedgerConfig,
    pub violation: ViolationConfig,
}

impl AuditSettings {
    pub fn from_file(path: &Path) -> Result<Self, ToolError> {
        let text = fs::read_to_string(path).map_err(|source| ToolError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ToolError::SettingsToml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ToolError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Command-line values win over file values.
    pub fn with_overrides(mut self, year: Option<i32>, transfer_date: Option<NaiveDate>) -> Self {
        if year.is_some() {
            self.reporting_year = year;
        }
        if transfer_date.is_some() {
            self.transfer_date = transfer_date;
        }
        self
    }

    /// The transfer date is required; the reporting year defaults to the
    /// transfer date's year.
    pub fn resolve(&self) -> Result<ResolvedConfig, ToolError> {
        let transfer_date = self
            .transfer_date
            .ok_or(ToolError::MissingSetting("transfer_date"))?;
        let reporting_year = self.reporting_year.unwrap_or_else(|| transfer_date.year());

        let directory = DirectoryConfig {
            max_directory_entries: self.budgets.max_directory_entries,
        };
        let ledger = CallLedgerConfig {
            reporting_year,
            transfer_date,
            short_call_secs: self.thresholds.short_call_secs,
            long_call_secs: self.thresholds.long_call_secs,
            planning_cutoff: self.thresholds.planning_cutoff,
            max_call_rows: self.budgets.max_call_rows,
        };
        let violation = ViolationConfig {
            minute_limits: self.minute_limits,
            proselyting_hours: DayWindow {
                opens: self.windows.proselyting_opens,
                closes: self.windows.proselyting_closes,
            },
            night: NightWindow {
                begins: self.windows.night_begins,
                ends: self.windows.night_ends,
            },
        };
        directory.validate()?;
        ledger.validate()?;
        violation.validate()?;
        Ok(ResolvedConfig {
            directory,
            ledger,
            violation,
        })
    }
}
