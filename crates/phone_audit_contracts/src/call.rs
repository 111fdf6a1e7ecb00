#![forbid(unsafe_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::phone::PhoneNumber;
use crate::{ContractViolation, SchemaVersion, Validate};

pub const CALL_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// One row of the carrier call feed before it is parsed.
///
/// `start`/`end` accept `HH:MM:SS` or the carrier's compact `HHMMSS`.
/// `date` accepts `MM/DD` or `YYYY/MM/DD`; the year is always taken from
/// the reporting year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFeedRow {
    pub caller: String,
    pub receiver: String,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    pub date: String,
}

impl CallFeedRow {
    /// Data-usage and other billing lines carry no end time.
    pub fn is_billing_line(&self) -> bool {
        self.end
            .as_deref()
            .map(|end| end.trim().is_empty())
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub schema_version: SchemaVersion,
    pub caller: PhoneNumber,
    pub receiver: PhoneNumber,
    pub start: NaiveDateTime,
    /// Not guaranteed to be after `start`; carriers log calls spanning
    /// midnight against the start date.
    pub end: NaiveDateTime,
}

impl CallRecord {
    pub fn v1(
        caller: PhoneNumber,
        receiver: PhoneNumber,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: CALL_CONTRACT_VERSION,
            caller,
            receiver,
            start,
            end,
        };
        r.validate()?;
        Ok(r)
    }

    pub fn from_feed_row(row: &CallFeedRow, reporting_year: i32) -> Result<Self, ContractViolation> {
        let end_raw = row.end.as_deref().ok_or(ContractViolation::InvalidValue {
            field: "call_feed_row.end",
            reason: "missing end time",
        })?;
        let caller = PhoneNumber::new(&row.caller).map_err(|_| ContractViolation::InvalidValue {
            field: "call_feed_row.caller",
            reason: "not a usable phone number",
        })?;
        let receiver =
            PhoneNumber::new(&row.receiver).map_err(|_| ContractViolation::InvalidValue {
                field: "call_feed_row.receiver",
                reason: "not a usable phone number",
            })?;
        let date = parse_call_date(&row.date, reporting_year)?;
        let start = parse_clock_time("call_feed_row.start", &row.start)?;
        let end = parse_clock_time("call_feed_row.end", end_raw)?;
        Self::v1(caller, receiver, date.and_time(start), date.and_time(end))
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }
}

impl Validate for CallRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != CALL_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "call_record.schema_version",
                reason: "must match CALL_CONTRACT_VERSION",
            });
        }
        self.caller.validate()?;
        self.receiver.validate()?;
        Ok(())
    }
}

/// Parses `HH:MM:SS` or `HHMMSS`.
pub fn parse_clock_time(field: &'static str, raw: &str) -> Result<NaiveTime, ContractViolation> {
    let raw = raw.trim();
    let digits: String = match raw.len() {
        8 if raw.as_bytes()[2] == b':' && raw.as_bytes()[5] == b':' => {
            raw.chars().filter(|c| *c != ':').collect()
        }
        6 => raw.to_string(),
        _ => {
            return Err(ContractViolation::InvalidValue {
                field,
                reason: "must be HH:MM:SS or HHMMSS",
            })
        }
    };
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must be HH:MM:SS or HHMMSS",
        });
    }
    let part = |i: usize| digits[i..i + 2].parse::<u32>().unwrap_or(u32::MAX);
    NaiveTime::from_hms_opt(part(0), part(2), part(4)).ok_or(ContractViolation::InvalidValue {
        field,
        reason: "clock components out of range",
    })
}

/// Parses `MM/DD` or `YYYY/MM/DD` against the reporting year.
pub fn parse_call_date(raw: &str, reporting_year: i32) -> Result<NaiveDate, ContractViolation> {
    let bad = ContractViolation::InvalidValue {
        field: "call_feed_row.date",
        reason: "must be MM/DD or YYYY/MM/DD",
    };
    let parts: Vec<&str> = raw.trim().split('/').collect();
    let (month, day) = match parts.as_slice() {
        [m, d] => (*m, *d),
        [y, m, d] if y.len() == 4 => (*m, *d),
        _ => return Err(bad),
    };
    let month: u32 = month.parse().map_err(|_| bad.clone())?;
    let day: u32 = day.parse().map_err(|_| bad.clone())?;
    NaiveDate::from_ymd_opt(reporting_year, month, day).ok_or(ContractViolation::InvalidValue {
        field: "call_feed_row.date",
        reason: "no such calendar day in the reporting year",
    })
}
