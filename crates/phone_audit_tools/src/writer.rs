#![forbid(unsafe_code)]

use std::io::Write;

use phone_audit_contracts::report::{SectionBody, ViolationReport};

use crate::error::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Json,
    /// Tab-separated blocks, one per check, laid out like the review sheet.
    Sheet,
}

pub fn write_report(
    report: &ViolationReport,
    format: ReportFormat,
    out: &mut impl Write,
) -> Result<(), ToolError> {
    match format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        ReportFormat::Sheet => write_sheet(report, out)?,
    }
    out.flush()?;
    Ok(())
}

fn write_sheet(report: &ViolationReport, out: &mut impl Write) -> Result<(), ToolError> {
    for section in &report.sections {
        writeln!(out)?;
        writeln!(out, "{}", section.title)?;
        writeln!(out, "{}", section.headers.join("\t"))?;
        match &section.body {
            SectionBody::Tally(tallies) => {
                for tally in tallies.values() {
                    writeln!(out, "{}\t{}", tally.label, tally.value())?;
                }
            }
            SectionBody::Events(events) => {
                for event in events {
                    writeln!(
                        out,
                        "{}\t{}\t{}",
                        event.caller_label,
                        event.receiver_label,
                        event.date.format("%m/%d")
                    )?;
                }
            }
        }
    }

    let malformed = &report.ingest.malformed;
    if !malformed.is_empty() {
        writeln!(out)?;
        writeln!(out, "Skipped Records")?;
        writeln!(out, "Feed\tRow\tReason")?;
        for m in malformed {
            writeln!(out, "{}\t{}\t{}", m.feed, m.row, m.reason)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use phone_audit_contracts::ingest::{FeedKind, IngestSummary, MalformedRecord};
    use phone_audit_contracts::phone::PhoneNumber;
    use phone_audit_contracts::report::{
        merge_hit, CheckId, ReportSection, TallyMap, ViolationTally, ZoneCrossingEvent,
    };

    fn report() -> ViolationReport {
        let sections = CheckId::all()
            .iter()
            .map(|check| {
                let body = match check {
                    CheckId::OutOfZone => SectionBody::Events(vec![ZoneCrossingEvent {
                        caller_label: "Banqiao: Elders".to_string(),
                        receiver_label: "Xindian: Elders".to_string(),
                        date: NaiveDate::from_ymd_opt(2011, 5, 25).unwrap(),
                    }]),
                    CheckId::MinuteOverage => {
                        let mut t = TallyMap::new();
                        t.insert(
                            PhoneNumber::new("0911000111").unwrap(),
                            ViolationTally::minutes("Banqiao: Elders".to_string(), 1301),
                        );
                        SectionBody::Tally(t)
                    }
                    CheckId::NightCalls => {
                        let mut t = TallyMap::new();
                        let p = PhoneNumber::new("0911000111").unwrap();
                        merge_hit(&mut t, &p, || "Banqiao: Elders".to_string());
                        merge_hit(&mut t, &p, || "Banqiao: Elders".to_string());
                        SectionBody::Tally(t)
                    }
                    _ => SectionBody::Tally(TallyMap::new()),
                };
                ReportSection::v1(*check, body).unwrap()
            })
            .collect();
        let ingest = IngestSummary {
            malformed: vec![MalformedRecord {
                feed: FeedKind::Calls,
                row: 7,
                reason: "bad clock".to_string(),
            }],
            ..IngestSummary::default()
        };
        ViolationReport::v1(sections, ingest).unwrap()
    }

    #[test]
    fn at_writer_01_sheet_layout() {
        let mut buf = Vec::new();
        write_report(&report(), ReportFormat::Sheet, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "Calls Made at Night");
        assert_eq!(lines[2], "Companionship\tViolations");
        assert_eq!(lines[3], "Banqiao: Elders\t2");
        assert!(text.contains("Caller\tReceiver\tDate\nBanqiao: Elders\tXindian: Elders\t05/25\n"));
        assert!(text.contains("Companionship\tMinutes\nBanqiao: Elders\t1301\n"));
        assert!(text.ends_with("Skipped Records\nFeed\tRow\tReason\ncalls\t7\tbad clock\n"));
    }

    #[test]
    fn at_writer_02_json_is_parseable() {
        let mut buf = Vec::new();
        write_report(&report(), ReportFormat::Json, &mut buf).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["sections"].as_array().unwrap().len(), 7);
        assert_eq!(v["sections"][4]["body"]["events"][0]["date"], "2011-05-25");
        assert_eq!(v["ingest"]["malformed"][0]["row"], 7);
    }
}
