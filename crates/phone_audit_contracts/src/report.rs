#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::ingest::IngestSummary;
use crate::phone::PhoneNumber;
use crate::{ContractViolation, SchemaVersion, Validate};

pub const REPORT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// The seven audit checks, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    NightCalls,
    ProselytingHours,
    InvestigatorCalls,
    LongCalls,
    OutOfZone,
    LandlineCalls,
    MinuteOverage,
}

impl CheckId {
    pub const fn all() -> &'static [Self] {
        &[
            Self::NightCalls,
            Self::ProselytingHours,
            Self::InvestigatorCalls,
            Self::LongCalls,
            Self::OutOfZone,
            Self::LandlineCalls,
            Self::MinuteOverage,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NightCalls => "night_calls",
            Self::ProselytingHours => "proselyting_hours",
            Self::InvestigatorCalls => "investigator_calls",
            Self::LongCalls => "long_calls",
            Self::OutOfZone => "out_of_zone",
            Self::LandlineCalls => "landline_calls",
            Self::MinuteOverage => "minute_overage",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::NightCalls => "Calls Made at Night",
            Self::ProselytingHours => "Calls Made During Proselyting Hours",
            Self::InvestigatorCalls => "Calls Over 5 Minutes to Investigators",
            Self::LongCalls => "Calls Over 9 Minutes to Missionaries",
            Self::OutOfZone => "Calls Outside of Zone",
            Self::LandlineCalls => "Calls to Land Lines",
            Self::MinuteOverage => "Companionships Over Monthly Minutes",
        }
    }

    pub const fn headers(self) -> &'static [&'static str] {
        match self {
            Self::OutOfZone => &["Caller", "Receiver", "Date"],
            Self::MinuteOverage => &["Companionship", "Minutes"],
            _ => &["Companionship", "Violations"],
        }
    }

    pub const fn produces_events(self) -> bool {
        matches!(self, Self::OutOfZone)
    }

    pub const fn measures_minutes(self) -> bool {
        matches!(self, Self::MinuteOverage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TallyMeasure {
    Count(u32),
    Minutes(u64),
}

/// Per-caller aggregate for one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationTally {
    pub label: String,
    pub measure: TallyMeasure,
}

impl ViolationTally {
    pub fn first_hit(label: String) -> Self {
        Self {
            label,
            measure: TallyMeasure::Count(1),
        }
    }

    pub fn minutes(label: String, minutes: u64) -> Self {
        Self {
            label,
            measure: TallyMeasure::Minutes(minutes),
        }
    }

    pub fn record_hit(&mut self) {
        if let TallyMeasure::Count(n) = &mut self.measure {
            *n = n.saturating_add(1);
        }
    }

    pub fn count(&self) -> Option<u32> {
        match self.measure {
            TallyMeasure::Count(n) => Some(n),
            TallyMeasure::Minutes(_) => None,
        }
    }

    pub fn value(&self) -> u64 {
        match self.measure {
            TallyMeasure::Count(n) => n as u64,
            TallyMeasure::Minutes(m) => m,
        }
    }
}

pub type TallyMap = BTreeMap<PhoneNumber, ViolationTally>;

/// Adds one hit for `caller`, creating the tally with `label` on first sight.
pub fn merge_hit(tallies: &mut TallyMap, caller: &PhoneNumber, label: impl FnOnce() -> String) {
    match tallies.get_mut(caller) {
        Some(tally) => tally.record_hit(),
        None => {
            tallies.insert(caller.clone(), ViolationTally::first_hit(label()));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneCrossingEvent {
    pub caller_label: String,
    pub receiver_label: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionBody {
    Tally(TallyMap),
    Events(Vec<ZoneCrossingEvent>),
}

impl SectionBody {
    pub fn len(&self) -> usize {
        match self {
            Self::Tally(t) => t.len(),
            Self::Events(e) => e.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub check: CheckId,
    pub title: &'static str,
    pub headers: &'static [&'static str],
    pub body: SectionBody,
}

impl ReportSection {
    pub fn v1(check: CheckId, body: SectionBody) -> Result<Self, ContractViolation> {
        let s = Self {
            check,
            title: check.title(),
            headers: check.headers(),
            body,
        };
        s.validate()?;
        Ok(s)
    }

    pub fn tally(&self) -> Option<&TallyMap> {
        match &self.body {
            SectionBody::Tally(t) => Some(t),
            SectionBody::Events(_) => None,
        }
    }

    pub fn events(&self) -> Option<&[ZoneCrossingEvent]> {
        match &self.body {
            SectionBody::Events(e) => Some(e),
            SectionBody::Tally(_) => None,
        }
    }
}

impl Validate for ReportSection {
    fn validate(&self) -> Result<(), ContractViolation> {
        match (&self.body, self.check.produces_events()) {
            (SectionBody::Events(_), true) => Ok(()),
            (SectionBody::Tally(tallies), false) => {
                let minutes = self.check.measures_minutes();
                let mixed = tallies.values().any(|t| match t.measure {
                    TallyMeasure::Minutes(_) => !minutes,
                    TallyMeasure::Count(_) => minutes,
                });
                if mixed {
                    return Err(ContractViolation::InvalidValue {
                        field: "report_section.body",
                        reason: "tally measure does not match the check",
                    });
                }
                Ok(())
            }
            _ => Err(ContractViolation::InvalidValue {
                field: "report_section.body",
                reason: "body shape does not match the check",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationReport {
    pub schema_version: SchemaVersion,
    pub sections: Vec<ReportSection>,
    pub ingest: IngestSummary,
}

impl ViolationReport {
    pub fn v1(sections: Vec<ReportSection>, ingest: IngestSummary) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: REPORT_CONTRACT_VERSION,
            sections,
            ingest,
        };
        r.validate()?;
        Ok(r)
    }

    pub fn section(&self, check: CheckId) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.check == check)
    }

    pub fn tally(&self, check: CheckId) -> Option<&TallyMap> {
        self.section(check).and_then(ReportSection::tally)
    }

    pub fn zone_crossings(&self) -> &[ZoneCrossingEvent] {
        self.section(CheckId::OutOfZone)
            .and_then(ReportSection::events)
            .unwrap_or(&[])
    }

    pub fn total_findings(&self) -> usize {
        self.sections.iter().map(|s| s.body.len()).sum()
    }
}

impl Validate for ViolationReport {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != REPORT_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "violation_report.schema_version",
                reason: "must match REPORT_CONTRACT_VERSION",
            });
        }
        let order: Vec<CheckId> = self.sections.iter().map(|s| s.check).collect();
        if order.as_slice() != CheckId::all() {
            return Err(ContractViolation::InvalidValue {
                field: "violation_report.sections",
                reason: "must hold every check exactly once in report order",
            });
        }
        for s in &self.sections {
            s.validate()?;
        }
        Ok(())
    }
}
