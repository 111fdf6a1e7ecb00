#![forbid(unsafe_code)]

use std::path::Path;

use phone_audit_contracts::report::ViolationReport;
use phone_audit_engines::{run_audit, AuditInputs};

use crate::config::AuditSettings;
use crate::error::ToolError;
use crate::feeds::{load_call_feed, load_directory_feed};

/// Reads both feeds from disk and runs the audit with resolved settings.
pub fn audit_files(
    settings: &AuditSettings,
    calls_path: &Path,
    directory_path: &Path,
) -> Result<ViolationReport, ToolError> {
    let resolved = settings.resolve()?;
    let directory_rows = load_directory_feed(directory_path)?;
    let call_rows = load_call_feed(calls_path)?;
    let report = run_audit(AuditInputs {
        directory_config: resolved.directory,
        ledger_config: resolved.ledger,
        violation_config: resolved.violation,
        directory_rows,
        call_rows,
    })?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use phone_audit_contracts::phone::PhoneNumber;
    use phone_audit_contracts::report::CheckId;
    use std::fs;

    fn settings() -> AuditSettings {
        AuditSettings::default().with_overrides(Some(2011), NaiveDate::from_ymd_opt(2011, 6, 1))
    }

    #[test]
    fn at_pipeline_01_tsv_feeds_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let calls = dir.path().join("calls.tsv");
        let directory = dir.path().join("directory.tsv");
        fs::write(
            &calls,
            "caller\tdate\tstart\tend\treceiver\n\
             0911-000-111\t2011/05/25\t213000\t214100\t0911-000-222\n\
             0911-000-111\t2011/05/25\t220000\n",
        )
        .unwrap();
        fs::write(
            &directory,
            "zone\tarea\tmissionaries\tphone\ttype\n\
             A\tBanqiao\tElder Smith / Elder Jones\t0911-000-111\tElders\n\
             B\tXindian\tElder Chen / Elder Lin\t0911-000-222\tElders\n",
        )
        .unwrap();

        let report = audit_files(&settings(), &calls, &directory).unwrap();
        let caller = PhoneNumber::new("0911000111").unwrap();
        assert_eq!(report.ingest.non_call_rows, 1);
        assert_eq!(
            report.tally(CheckId::ProselytingHours).unwrap()[&caller].count(),
            Some(1)
        );
        assert_eq!(report.tally(CheckId::LongCalls).unwrap()[&caller].count(), Some(1));
        assert_eq!(report.zone_crossings().len(), 1);
    }

    #[test]
    fn at_pipeline_02_resource_exhaustion_is_distinguishable() {
        let dir = tempfile::tempdir().unwrap();
        let calls = dir.path().join("calls.tsv");
        let directory = dir.path().join("directory.tsv");
        fs::write(
            &calls,
            "header\n0911000111\t05/25\t100000\t100100\t0911000222\n0911000111\t05/25\t110000\t110100\t0911000222\n",
        )
        .unwrap();
        fs::write(&directory, "header\n").unwrap();
        let mut s = settings();
        s.budgets.max_call_rows = 1;
        let err = audit_files(&s, &calls, &directory).unwrap_err();
        assert!(err.is_resource_exhaustion());
    }
}
