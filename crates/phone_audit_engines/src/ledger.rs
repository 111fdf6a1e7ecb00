#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use phone_audit_contracts::call::{CallFeedRow, CallRecord};
use phone_audit_contracts::clock::TimeOfDay;
use phone_audit_contracts::ingest::{FeedKind, MalformedRecord};
use phone_audit_contracts::phone::PhoneNumber;
use phone_audit_contracts::ContractViolation;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AuditError;

/// Mission cell numbers all carry this prefix.
pub const CELL_NUMBER_PREFIX: &str = "09";

pub const SHORT_CALL_SECS: u32 = 300;
/// Labelled "nine minutes" in the source policy but enforced at 8m50s.
pub const LONG_CALL_SECS: u32 = 530;
pub const PLANNING_CUTOFF: TimeOfDay = TimeOfDay::at(13, 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLedgerConfig {
    /// Year used to rebuild full timestamps from `MM/DD` feed dates.
    pub reporting_year: i32,
    /// Transfer day; the planning session moves to the Thursday of the week
    /// before it.
    pub transfer_date: NaiveDate,
    pub short_call_secs: u32,
    pub long_call_secs: u32,
    pub planning_cutoff: TimeOfDay,
    pub max_call_rows: usize,
}

impl CallLedgerConfig {
    pub fn standard_v1(reporting_year: i32, transfer_date: NaiveDate) -> Self {
        Self {
            reporting_year,
            transfer_date,
            short_call_secs: SHORT_CALL_SECS,
            long_call_secs: LONG_CALL_SECS,
            planning_cutoff: PLANNING_CUTOFF,
            max_call_rows: 500_000,
        }
    }

    pub fn validate(&self) -> Result<(), ContractViolation> {
        if !(1970..=9999).contains(&self.reporting_year) {
            return Err(ContractViolation::InvalidRange {
                field: "call_ledger_config.reporting_year",
                min: 1970,
                max: 9999,
                got: self.reporting_year as i64,
            });
        }
        if self.short_call_secs == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "call_ledger_config.short_call_secs",
                reason: "must be > 0",
            });
        }
        if self.long_call_secs <= self.short_call_secs {
            return Err(ContractViolation::InvalidValue {
                field: "call_ledger_config.long_call_secs",
                reason: "must be > short_call_secs",
            });
        }
        if self.max_call_rows == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "call_ledger_config.max_call_rows",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

/// Immutable, ordered call set plus the derived facts the rules need.
#[derive(Debug, Clone)]
pub struct CallLedger {
    config: CallLedgerConfig,
    calls: Vec<CallRecord>,
}

#[derive(Debug, Clone)]
pub struct LedgerIngest {
    pub ledger: CallLedger,
    pub non_call_rows: usize,
    pub malformed: Vec<MalformedRecord>,
}

impl CallLedger {
    pub fn new(config: CallLedgerConfig, calls: Vec<CallRecord>) -> Result<Self, AuditError> {
        config.validate()?;
        if calls.len() > config.max_call_rows {
            return Err(AuditError::ResourceExhausted {
                what: "call row budget",
                limit: config.max_call_rows,
                needed: calls.len(),
            });
        }
        Ok(Self { config, calls })
    }

    /// Builds the ledger from raw feed rows. Billing lines without an end
    /// time are dropped; rows that fail to parse are skipped and reported.
    pub fn ingest(
        config: CallLedgerConfig,
        rows: impl IntoIterator<Item = CallFeedRow>,
    ) -> Result<LedgerIngest, AuditError> {
        config.validate()?;
        let rows = rows.into_iter();
        let mut calls: Vec<CallRecord> = Vec::new();
        reserve(&mut calls, rows.size_hint().0.min(config.max_call_rows))?;
        let mut non_call_rows = 0usize;
        let mut malformed = Vec::new();

        for (i, row) in rows.enumerate() {
            if row.is_billing_line() {
                non_call_rows += 1;
                continue;
            }
            match CallRecord::from_feed_row(&row, config.reporting_year) {
                Ok(record) => {
                    if calls.len() >= config.max_call_rows {
                        return Err(AuditError::ResourceExhausted {
                            what: "call row budget",
                            limit: config.max_call_rows,
                            needed: calls.len() + 1,
                        });
                    }
                    reserve(&mut calls, 1)?;
                    calls.push(record);
                }
                Err(violation) => {
                    let record = MalformedRecord {
                        feed: FeedKind::Calls,
                        row: i + 1,
                        reason: violation.to_string(),
                    };
                    warn!(row = record.row, reason = %record.reason, "skipping malformed call row");
                    malformed.push(record);
                }
            }
        }

        debug!(
            calls = calls.len(),
            non_call_rows,
            malformed = malformed.len(),
            "call ledger loaded"
        );
        Ok(LedgerIngest {
            ledger: Self { config, calls },
            non_call_rows,
            malformed,
        })
    }

    pub fn config(&self) -> &CallLedgerConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn duration_seconds(record: &CallRecord) -> u64 {
        (record.end - record.start).num_seconds().unsigned_abs()
    }

    /// Naming-convention check; works for numbers outside the directory.
    pub fn is_cell_number(phone: &PhoneNumber) -> bool {
        phone.starts_with(CELL_NUMBER_PREFIX)
    }

    pub fn day_of_week(timestamp: &NaiveDateTime) -> Weekday {
        timestamp.weekday()
    }

    pub fn time_of_day(timestamp: &NaiveDateTime) -> TimeOfDay {
        TimeOfDay::of(timestamp)
    }

    /// The Thursday within `[transfer_date - 7d, transfer_date - 1d]`.
    pub fn transfer_week_thursday(&self) -> Option<NaiveDate> {
        (1..=7u64)
            .filter_map(|back| self.config.transfer_date.checked_sub_days(Days::new(back)))
            .find(|d| d.weekday() == Weekday::Thu)
    }

    /// Friday mornings, plus the Thursday morning of the transfer week.
    pub fn is_planning_session(&self, start: &NaiveDateTime, end: &NaiveDateTime) -> bool {
        if Self::time_of_day(end) >= self.config.planning_cutoff {
            return false;
        }
        let date = start.date();
        match date.weekday() {
            Weekday::Fri => true,
            Weekday::Thu => self.transfer_week_thursday() == Some(date),
            _ => false,
        }
    }

    pub fn over_duration_threshold(record: &CallRecord, threshold_secs: u32) -> bool {
        Self::duration_seconds(record) > threshold_secs as u64
    }

    /// Total minutes per caller. Seconds are summed first and rounded
    /// half-up to minutes once per caller.
    pub fn total_minutes_by_caller(&self) -> BTreeMap<PhoneNumber, u64> {
        let mut seconds: BTreeMap<&PhoneNumber, u64> = BTreeMap::new();
        for call in &self.calls {
            *seconds.entry(&call.caller).or_default() += Self::duration_seconds(call);
        }
        seconds
            .into_iter()
            .map(|(phone, secs)| (phone.clone(), (secs + 30) / 60))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CallRecord> + '_ {
        self.calls.iter()
    }

    pub fn over_short_threshold(&self) -> impl Iterator<Item = &CallRecord> + '_ {
        let threshold = self.config.short_call_secs;
        self.calls
            .iter()
            .filter(move |c| Self::over_duration_threshold(c, threshold))
    }

    pub fn over_long_threshold(&self) -> impl Iterator<Item = &CallRecord> + '_ {
        let threshold = self.config.long_call_secs;
        self.calls
            .iter()
            .filter(move |c| Self::over_duration_threshold(c, threshold))
    }
}

fn reserve(calls: &mut Vec<CallRecord>, additional: usize) -> Result<(), AuditError> {
    calls
        .try_reserve(additional)
        .map_err(|_| AuditError::ResourceExhausted {
            what: "memory for call records",
            limit: calls.capacity(),
            needed: calls.len() + additional,
        })
}
