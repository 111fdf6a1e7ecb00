#![forbid(unsafe_code)]

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Calls,
    Directory,
}

impl FeedKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::Directory => "directory",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A feed row that failed shape validation. Skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{feed} feed row {row}: {reason}")]
pub struct MalformedRecord {
    pub feed: FeedKind,
    /// 1-based position of the row in its feed.
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub accepted_calls: usize,
    pub non_call_rows: usize,
    pub directory_entries: usize,
    pub blank_directory_rows: usize,
    pub malformed: Vec<MalformedRecord>,
}

impl IngestSummary {
    pub fn skipped_records(&self) -> usize {
        self.malformed.len()
    }
}
