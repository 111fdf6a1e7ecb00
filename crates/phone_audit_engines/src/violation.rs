#![forbid(unsafe_code)]

use phone_audit_contracts::call::CallRecord;
use phone_audit_contracts::clock::TimeOfDay;
use phone_audit_contracts::directory::Role;
use phone_audit_contracts::ingest::IngestSummary;
use phone_audit_contracts::report::{
    merge_hit, CheckId, ReportSection, SectionBody, TallyMap, ViolationReport, ViolationTally,
    ZoneCrossingEvent,
};
use phone_audit_contracts::ContractViolation;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directory::Directory;
use crate::error::{AuditError, DirectoryError};
use crate::ledger::CallLedger;

/// Monthly minute allowance per role. `Special` numbers have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinuteLimits {
    pub elder_companionship: u64,
    pub sister_companionship: u64,
    pub district_leader: u64,
    pub zone_leader: u64,
}

impl MinuteLimits {
    pub fn standard_v1() -> Self {
        Self {
            elder_companionship: 1200,
            sister_companionship: 1200,
            district_leader: 1500,
            zone_leader: 2000,
        }
    }

    pub fn for_role(&self, role: Role) -> Option<u64> {
        match role {
            Role::ElderCompanionship => Some(self.elder_companionship),
            Role::SisterCompanionship => Some(self.sister_companionship),
            Role::DistrictLeader => Some(self.district_leader),
            Role::ZoneLeader => Some(self.zone_leader),
            Role::Special => None,
        }
    }
}

impl Default for MinuteLimits {
    fn default() -> Self {
        Self::standard_v1()
    }
}

/// Daytime window `[opens, closes]`; a call violates it when it starts
/// before `opens` or ends after `closes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub opens: TimeOfDay,
    pub closes: TimeOfDay,
}

impl DayWindow {
    pub fn is_outside(&self, start: TimeOfDay, end: TimeOfDay) -> bool {
        start < self.opens || end > self.closes
    }
}

/// Overnight window running from `begins` past midnight to `ends`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindow {
    pub begins: TimeOfDay,
    pub ends: TimeOfDay,
}

impl NightWindow {
    pub fn touches(&self, start: TimeOfDay, end: TimeOfDay) -> bool {
        start < self.ends || end > self.begins
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationConfig {
    pub minute_limits: MinuteLimits,
    pub proselyting_hours: DayWindow,
    pub night: NightWindow,
}

impl ViolationConfig {
    pub fn standard_v1() -> Self {
        Self {
            minute_limits: MinuteLimits::standard_v1(),
            proselyting_hours: DayWindow {
                opens: TimeOfDay::at(10, 30),
                closes: TimeOfDay::at(21, 0),
            },
            night: NightWindow {
                begins: TimeOfDay::at(22, 30),
                ends: TimeOfDay::at(6, 30),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ContractViolation> {
        if self.proselyting_hours.opens >= self.proselyting_hours.closes {
            return Err(ContractViolation::InvalidValue {
                field: "violation_config.proselyting_hours",
                reason: "opens must be before closes",
            });
        }
        if self.night.ends >= self.night.begins {
            return Err(ContractViolation::InvalidValue {
                field: "violation_config.night",
                reason: "must wrap midnight (ends before begins)",
            });
        }
        Ok(())
    }
}

impl Default for ViolationConfig {
    fn default() -> Self {
        Self::standard_v1()
    }
}

/// Evaluates the seven checks over immutable directory and ledger
/// snapshots. Each check owns its accumulator; a call may land in several.
#[derive(Debug, Clone)]
pub struct ViolationEngine {
    config: ViolationConfig,
}

impl ViolationEngine {
    pub fn new(config: ViolationConfig) -> Result<Self, ContractViolation> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ViolationConfig {
        &self.config
    }

    pub fn report(
        &self,
        directory: &Directory,
        ledger: &CallLedger,
        ingest: IngestSummary,
    ) -> Result<ViolationReport, AuditError> {
        let sections = self.evaluate(directory, ledger)?;
        Ok(ViolationReport::v1(sections, ingest)?)
    }

    /// All sections in report order.
    pub fn evaluate(
        &self,
        directory: &Directory,
        ledger: &CallLedger,
    ) -> Result<Vec<ReportSection>, AuditError> {
        let mut sections = Vec::with_capacity(CheckId::all().len());
        for check in CheckId::all() {
            let body = match check {
                CheckId::NightCalls => SectionBody::Tally(self.night_calls(directory, ledger)),
                CheckId::ProselytingHours => {
                    SectionBody::Tally(self.proselyting_hours_calls(directory, ledger)?)
                }
                CheckId::InvestigatorCalls => {
                    SectionBody::Tally(self.investigator_calls(directory, ledger))
                }
                CheckId::LongCalls => SectionBody::Tally(self.long_calls(directory, ledger)),
                CheckId::OutOfZone => SectionBody::Events(self.out_of_zone_calls(directory, ledger)),
                CheckId::LandlineCalls => SectionBody::Tally(self.landline_calls(directory, ledger)),
                CheckId::MinuteOverage => {
                    SectionBody::Tally(self.minute_overage(directory, ledger)?)
                }
            };
            debug!(check = check.as_str(), findings = body.len(), "check evaluated");
            sections.push(ReportSection::v1(*check, body)?);
        }
        Ok(sections)
    }

    pub fn night_calls(&self, directory: &Directory, ledger: &CallLedger) -> TallyMap {
        let mut out = TallyMap::new();
        for call in ledger.iter() {
            if directory.is_special(&call.caller) {
                continue;
            }
            let (start, end) = clock_span(call);
            if self.config.night.touches(start, end) {
                merge_hit(&mut out, &call.caller, || directory.label_or_number(&call.caller));
            }
        }
        out
    }

    /// Calls to directory numbers outside the permitted hours, unless made
    /// during a planning session or between a zone leader and their own zone.
    pub fn proselyting_hours_calls(
        &self,
        directory: &Directory,
        ledger: &CallLedger,
    ) -> Result<TallyMap, DirectoryError> {
        let mut out = TallyMap::new();
        for call in ledger.iter() {
            if !directory.is_known(&call.receiver)
                || directory.is_special(&call.caller)
                || directory.is_special(&call.receiver)
            {
                continue;
            }
            let (start, end) = clock_span(call);
            if !self.config.proselyting_hours.is_outside(start, end) {
                continue;
            }
            if zone_leader_in_own_zone(directory, call)? {
                continue;
            }
            if ledger.is_planning_session(&call.start, &call.end) {
                continue;
            }
            merge_hit(&mut out, &call.caller, || directory.label_or_number(&call.caller));
        }
        Ok(out)
    }

    /// Over-threshold calls to numbers outside the directory.
    pub fn investigator_calls(&self, directory: &Directory, ledger: &CallLedger) -> TallyMap {
        let mut out = TallyMap::new();
        for call in ledger.over_short_threshold() {
            if directory.is_known(&call.receiver) || either_special(directory, call) {
                continue;
            }
            merge_hit(&mut out, &call.caller, || directory.label_or_number(&call.caller));
        }
        out
    }

    pub fn long_calls(&self, directory: &Directory, ledger: &CallLedger) -> TallyMap {
        let mut out = TallyMap::new();
        for call in ledger.over_long_threshold() {
            if !directory.is_known(&call.receiver) || either_special(directory, call) {
                continue;
            }
            merge_hit(&mut out, &call.caller, || directory.label_or_number(&call.caller));
        }
        out
    }

    /// One event per cross-zone call, in ledger order. Calls whose zones
    /// cannot be compared are skipped.
    pub fn out_of_zone_calls(
        &self,
        directory: &Directory,
        ledger: &CallLedger,
    ) -> Vec<ZoneCrossingEvent> {
        let mut out = Vec::new();
        for call in ledger.iter() {
            if !directory.is_known(&call.receiver) || either_special(directory, call) {
                continue;
            }
            let same_zone = match directory.same_zone(&call.caller, &call.receiver) {
                Ok(same) => same,
                Err(err) => {
                    debug!(%err, "zone comparison skipped");
                    continue;
                }
            };
            if same_zone {
                continue;
            }
            let (Ok(caller_label), Ok(receiver_label)) = (
                directory.label_of(&call.caller),
                directory.label_of(&call.receiver),
            ) else {
                continue;
            };
            out.push(ZoneCrossingEvent {
                caller_label,
                receiver_label,
                date: call.date(),
            });
        }
        out
    }

    pub fn landline_calls(&self, directory: &Directory, ledger: &CallLedger) -> TallyMap {
        let mut out = TallyMap::new();
        for call in ledger.iter() {
            if CallLedger::is_cell_number(&call.receiver) || directory.is_special(&call.caller) {
                continue;
            }
            merge_hit(&mut out, &call.caller, || directory.label_or_number(&call.caller));
        }
        out
    }

    /// Callers whose monthly minutes exceed their role's allowance. Callers
    /// outside the directory have no role and are not evaluated.
    pub fn minute_overage(
        &self,
        directory: &Directory,
        ledger: &CallLedger,
    ) -> Result<TallyMap, DirectoryError> {
        let mut out = TallyMap::new();
        for (phone, minutes) in ledger.total_minutes_by_caller() {
            if !directory.is_known(&phone) {
                debug!(%phone, minutes, "minute total skipped for unlisted caller");
                continue;
            }
            let Some(limit) = self.config.minute_limits.for_role(directory.role_of(&phone)?) else {
                continue;
            };
            if minutes > limit {
                let label = directory.label_of(&phone)?;
                out.insert(phone, ViolationTally::minutes(label, minutes));
            }
        }
        Ok(out)
    }
}

fn clock_span(call: &CallRecord) -> (TimeOfDay, TimeOfDay) {
    (
        CallLedger::time_of_day(&call.start),
        CallLedger::time_of_day(&call.end),
    )
}

fn either_special(directory: &Directory, call: &CallRecord) -> bool {
    directory.is_special(&call.caller) || directory.is_special(&call.receiver)
}

/// Zone leaders may call, and be called by, their own zone at any hour.
fn zone_leader_in_own_zone(directory: &Directory, call: &CallRecord) -> Result<bool, DirectoryError> {
    if !directory.is_known(&call.caller) {
        return Ok(false);
    }
    if !directory.is_zone_leader(&call.caller) && !directory.is_zone_leader(&call.receiver) {
        return Ok(false);
    }
    directory.same_zone(&call.caller, &call.receiver)
}
