#![forbid(unsafe_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use phone_audit_contracts::call::CallRecord;
use phone_audit_contracts::phone::PhoneNumber;
use phone_audit_engines::{CallLedger, CallLedgerConfig};
use proptest::prelude::*;

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2011, 5, 25)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn record(caller: &str, start_offset: i64, signed_secs: i64) -> CallRecord {
    let start = base() + Duration::seconds(start_offset);
    CallRecord::v1(
        PhoneNumber::new(caller).unwrap(),
        PhoneNumber::new("0911999999").unwrap(),
        start,
        start + Duration::seconds(signed_secs),
    )
    .unwrap()
}

fn ledger(calls: Vec<CallRecord>) -> CallLedger {
    let config = CallLedgerConfig::standard_v1(2011, NaiveDate::from_ymd_opt(2011, 6, 1).unwrap());
    CallLedger::new(config, calls).unwrap()
}

proptest! {
    #[test]
    fn prop_duration_is_symmetric(offset in 0i64..86_400, secs in -7_200i64..7_200) {
        let forward = record("0911000111", offset, secs);
        let mut swapped = forward.clone();
        std::mem::swap(&mut swapped.start, &mut swapped.end);
        prop_assert_eq!(
            CallLedger::duration_seconds(&forward),
            CallLedger::duration_seconds(&swapped)
        );
        prop_assert_eq!(CallLedger::duration_seconds(&forward), secs.unsigned_abs());
    }

    #[test]
    fn prop_minute_totals_ignore_call_order(
        calls in prop::collection::vec((0usize..3, 0i64..86_400, 0i64..3_600), 0..40)
    ) {
        let callers = ["0911000111", "0911000222", "0911000333"];
        let records: Vec<CallRecord> = calls
            .iter()
            .map(|(who, offset, secs)| record(callers[*who], *offset, *secs))
            .collect();
        let mut reversed = records.clone();
        reversed.reverse();

        let forward = ledger(records.clone()).total_minutes_by_caller();
        let backward = ledger(reversed).total_minutes_by_caller();
        prop_assert_eq!(&forward, &backward);

        for (phone, minutes) in &forward {
            let secs: u64 = records
                .iter()
                .filter(|r| &r.caller == phone)
                .map(CallLedger::duration_seconds)
                .sum();
            prop_assert_eq!(*minutes, (secs + 30) / 60);
        }
    }
}
