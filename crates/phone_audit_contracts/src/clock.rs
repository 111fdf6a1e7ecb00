#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{ContractViolation, Validate};

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Clock time truncated to the minute (`HH:MM`, 24-hour).
///
/// Ordering is chronological, and the zero-padded `HH:MM` rendering sorts
/// lexicographically in the same order. All window comparisons in the audit
/// go through this type; seconds never take part in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Compile-time constructor for fixed policy boundaries.
    pub const fn at(hour: u8, minute: u8) -> Self {
        assert!(hour < 24 && minute < 60);
        Self(hour as u16 * 60 + minute as u16)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, ContractViolation> {
        if hour >= 24 {
            return Err(ContractViolation::InvalidRange {
                field: "time_of_day.hour",
                min: 0,
                max: 23,
                got: hour as i64,
            });
        }
        if minute >= 60 {
            return Err(ContractViolation::InvalidRange {
                field: "time_of_day.minute",
                min: 0,
                max: 59,
                got: minute as i64,
            });
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    pub fn of_time(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }

    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self::of_time(timestamp.time())
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }
}

impl Validate for TimeOfDay {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0 >= MINUTES_PER_DAY {
            return Err(ContractViolation::InvalidRange {
                field: "time_of_day",
                min: 0,
                max: (MINUTES_PER_DAY - 1) as i64,
                got: self.0 as i64,
            });
        }
        Ok(())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ContractViolation;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let bad = ContractViolation::InvalidValue {
            field: "time_of_day",
            reason: "must be HH:MM",
        };
        let (h, m) = raw.trim().split_once(':').ok_or(bad.clone())?;
        if h.len() != 2 || m.len() != 2 {
            return Err(bad);
        }
        let hour: u32 = h.parse().map_err(|_| bad.clone())?;
        let minute: u32 = m.parse().map_err(|_| bad)?;
        Self::from_hm(hour, minute)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn at_clock_01_seconds_are_truncated() {
        let ts = NaiveDate::from_ymd_opt(2011, 5, 31)
            .unwrap()
            .and_hms_opt(22, 30, 59)
            .unwrap();
        assert_eq!(TimeOfDay::of(&ts), TimeOfDay::at(22, 30));
        assert_eq!(TimeOfDay::of(&ts).to_string(), "22:30");
    }

    #[test]
    fn at_clock_02_display_order_matches_chronological_order() {
        let samples = [
            TimeOfDay::at(0, 5),
            TimeOfDay::at(6, 29),
            TimeOfDay::at(6, 30),
            TimeOfDay::at(10, 0),
            TimeOfDay::at(13, 30),
            TimeOfDay::at(21, 0),
            TimeOfDay::at(23, 59),
        ];
        for a in samples {
            for b in samples {
                assert_eq!(a.cmp(&b), a.to_string().cmp(&b.to_string()));
            }
        }
    }

    #[test]
    fn at_clock_03_parse_requires_fixed_width() {
        assert_eq!("06:30".parse::<TimeOfDay>().unwrap(), TimeOfDay::at(6, 30));
        assert!("6:30".parse::<TimeOfDay>().is_err());
        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("12:60".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn at_clock_04_serde_uses_hhmm_text() {
        let json = serde_json::to_string(&TimeOfDay::at(9, 5)).unwrap();
        assert_eq!(json, "\"09:05\"");
        let back: TimeOfDay = serde_json::from_str("\"21:00\"").unwrap();
        assert_eq!(back, TimeOfDay::at(21, 0));
    }
}
