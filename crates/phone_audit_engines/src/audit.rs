#![forbid(unsafe_code)]

use phone_audit_contracts::call::CallFeedRow;
use phone_audit_contracts::directory::DirectoryFeedRow;
use phone_audit_contracts::ingest::IngestSummary;
use phone_audit_contracts::report::ViolationReport;
use tracing::info;

use crate::directory::{Directory, DirectoryConfig};
use crate::error::AuditError;
use crate::ledger::{CallLedger, CallLedgerConfig};
use crate::violation::{ViolationConfig, ViolationEngine};

/// Everything one analysis run needs, fully materialized.
#[derive(Debug, Clone)]
pub struct AuditInputs {
    pub directory_config: DirectoryConfig,
    pub ledger_config: CallLedgerConfig,
    pub violation_config: ViolationConfig,
    pub directory_rows: Vec<DirectoryFeedRow>,
    pub call_rows: Vec<CallFeedRow>,
}

/// Loads both feeds into fresh snapshots and evaluates every check.
pub fn run_audit(inputs: AuditInputs) -> Result<ViolationReport, AuditError> {
    let engine = ViolationEngine::new(inputs.violation_config)?;
    let directory = Directory::ingest(&inputs.directory_config, inputs.directory_rows)?;
    let calls = CallLedger::ingest(inputs.ledger_config, inputs.call_rows)?;

    let mut malformed = directory.malformed;
    malformed.extend(calls.malformed);
    let ingest = IngestSummary {
        accepted_calls: calls.ledger.len(),
        non_call_rows: calls.non_call_rows,
        directory_entries: directory.directory.len(),
        blank_directory_rows: directory.blank_rows,
        malformed,
    };

    let report = engine.report(&directory.directory, &calls.ledger, ingest)?;
    info!(
        calls = report.ingest.accepted_calls,
        directory_entries = report.ingest.directory_entries,
        skipped = report.ingest.skipped_records(),
        findings = report.total_findings(),
        "audit complete"
    );
    Ok(report)
}
