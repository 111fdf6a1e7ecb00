#![forbid(unsafe_code)]

use chrono::NaiveDate;
use phone_audit_contracts::call::CallFeedRow;
use phone_audit_contracts::directory::DirectoryFeedRow;
use phone_audit_contracts::ingest::FeedKind;
use phone_audit_contracts::phone::PhoneNumber;
use phone_audit_contracts::report::CheckId;
use phone_audit_engines::{
    run_audit, AuditInputs, CallLedgerConfig, DirectoryConfig, ViolationConfig,
};

fn dir_row(phone: &str, zone: &str, area: &str, members: &str, role: &str) -> DirectoryFeedRow {
    DirectoryFeedRow {
        phone: phone.to_string(),
        zone: zone.to_string(),
        area: area.to_string(),
        members: members.to_string(),
        role: role.to_string(),
    }
}

fn call_row(caller: &str, receiver: &str, start: &str, end: Option<&str>, date: &str) -> CallFeedRow {
    CallFeedRow {
        caller: caller.to_string(),
        receiver: receiver.to_string(),
        start: start.to_string(),
        end: end.map(str::to_string),
        date: date.to_string(),
    }
}

fn inputs(call_rows: Vec<CallFeedRow>) -> AuditInputs {
    AuditInputs {
        directory_config: DirectoryConfig::standard_v1(),
        ledger_config: CallLedgerConfig::standard_v1(
            2011,
            NaiveDate::from_ymd_opt(2011, 6, 1).unwrap(),
        ),
        violation_config: ViolationConfig::standard_v1(),
        directory_rows: vec![
            dir_row("0911-000-111", "A", "Banqiao", "Elder Smith / Elder Jones", "Elders"),
            dir_row("0911-000-222", "B", "Xindian", "Elder Chen / Elder Lin", "Elders"),
            dir_row("02-2222-0000", "Office", "Mission Office", "", "Office"),
            dir_row("", "", "", "", ""),
        ],
        call_rows,
    }
}

fn phone(raw: &str) -> PhoneNumber {
    PhoneNumber::new(raw).unwrap()
}

#[test]
fn at_scenario_01_late_long_cross_zone_call_hits_three_checks() {
    let report = run_audit(inputs(vec![call_row(
        "0911-000-111",
        "0911-000-222",
        "21:30:00",
        Some("21:41:00"),
        "05/25",
    )]))
    .unwrap();

    let caller = phone("0911-000-111");
    let prosely = report.tally(CheckId::ProselytingHours).unwrap();
    let long = report.tally(CheckId::LongCalls).unwrap();
    assert_eq!(prosely[&caller].count(), Some(1));
    assert_eq!(long[&caller].count(), Some(1));
    assert_eq!(prosely[&caller].label, "Banqiao: Elder Smith / Elder Jones");

    let crossings = report.zone_crossings();
    assert_eq!(crossings.len(), 1);
    assert_eq!(crossings[0].caller_label, "Banqiao: Elder Smith / Elder Jones");
    assert_eq!(crossings[0].receiver_label, "Xindian: Elder Chen / Elder Lin");
    assert_eq!(crossings[0].date, NaiveDate::from_ymd_opt(2011, 5, 25).unwrap());

    assert!(report.tally(CheckId::NightCalls).unwrap().is_empty());
    assert!(report.tally(CheckId::InvestigatorCalls).unwrap().is_empty());
    assert!(report.tally(CheckId::LandlineCalls).unwrap().is_empty());
    assert!(report.tally(CheckId::MinuteOverage).unwrap().is_empty());
}

#[test]
fn at_scenario_02_same_zone_produces_no_crossing() {
    let mut i = inputs(vec![call_row(
        "0911000111",
        "0911000333",
        "12:00:00",
        Some("12:01:00"),
        "05/25",
    )]);
    i.directory_rows
        .push(dir_row("0911000333", "A", "Tucheng", "Sister Wu / Sister Ho", "sisters"));
    let report = run_audit(i).unwrap();
    assert!(report.zone_crossings().is_empty());
    assert_eq!(report.total_findings(), 0);
}

#[test]
fn at_scenario_03_bad_rows_are_counted_not_fatal() {
    let report = run_audit(inputs(vec![
        call_row("0911000111", "0911000222", "12:00:00", Some("12:01:00"), "05/25"),
        call_row("0911000111", "", "12:00:00", None, "05/25"),
        call_row("0911000111", "0911000222", "12:00", Some("12:01:00"), "05/25"),
        call_row("0911000111", "0911000222", "12:00:00", Some("12:01:00"), "13/40"),
    ]))
    .unwrap();
    assert_eq!(report.ingest.accepted_calls, 1);
    assert_eq!(report.ingest.non_call_rows, 1);
    assert_eq!(report.ingest.blank_directory_rows, 1);
    assert_eq!(report.ingest.directory_entries, 3);
    assert_eq!(report.ingest.skipped_records(), 2);
    assert!(report
        .ingest
        .malformed
        .iter()
        .all(|m| m.feed == FeedKind::Calls));
    assert_eq!(report.ingest.malformed[0].row, 3);
    assert_eq!(report.ingest.malformed[1].row, 4);
}

#[test]
fn at_scenario_04_office_line_never_appears() {
    let report = run_audit(inputs(vec![
        call_row("02-2222-0000", "0955-000-000", "23:00:00", Some("23:20:00"), "05/25"),
        call_row("02-2222-0000", "0911-000-222", "05:00:00", Some("05:20:00"), "05/25"),
        call_row("02-2222-0000", "02-8888-0000", "05:00:00", Some("05:20:00"), "05/25"),
    ]))
    .unwrap();
    assert_eq!(report.total_findings(), 0);
}

#[test]
fn at_scenario_05_row_budget_surfaces_as_resource_exhaustion() {
    let mut i = inputs(
        (0..5)
            .map(|_| call_row("0911000111", "0911000222", "12:00:00", Some("12:01:00"), "05/25"))
            .collect(),
    );
    i.ledger_config.max_call_rows = 4;
    let err = run_audit(i).unwrap_err();
    assert!(err.is_resource_exhaustion());
}

#[test]
fn at_scenario_06_report_serializes_in_fixed_order() {
    let report = run_audit(inputs(vec![call_row(
        "0911000111",
        "0277778888",
        "12:00:00",
        Some("12:01:00"),
        "05/25",
    )]))
    .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    let checks: Vec<&str> = json["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["check"].as_str().unwrap())
        .collect();
    assert_eq!(
        checks,
        vec![
            "night_calls",
            "proselyting_hours",
            "investigator_calls",
            "long_calls",
            "out_of_zone",
            "landline_calls",
            "minute_overage"
        ]
    );
    assert_eq!(
        json["sections"][5]["body"]["tally"]["0911000111"]["measure"]["count"],
        1
    );
}

#[test]
fn at_scenario_07_service_code_calls_are_billed_as_landline_minutes() {
    let mut i = inputs(vec![
        call_row("0911000111", "*123", "12:00:00", Some("12:30:00"), "05/25"),
        call_row("0911000111", "#888", "13:00:00", Some("13:30:00"), "05/25"),
    ]);
    i.violation_config.minute_limits.elder_companionship = 59;
    let report = run_audit(i).unwrap();

    let caller = phone("0911000111");
    assert_eq!(report.ingest.accepted_calls, 2);
    assert!(report.ingest.malformed.is_empty());
    assert_eq!(report.tally(CheckId::LandlineCalls).unwrap()[&caller].count(), Some(2));
    assert_eq!(report.tally(CheckId::MinuteOverage).unwrap()[&caller].value(), 60);
}
