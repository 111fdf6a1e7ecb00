#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

use phone_audit_contracts::call::CallFeedRow;
use phone_audit_contracts::directory::DirectoryFeedRow;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::ToolError;

/// `.json` files hold an array of row objects; anything else is read as
/// tab-separated text with one header line, in the carrier/spreadsheet
/// column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Json,
    Tsv,
}

impl FeedFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Tsv,
        }
    }
}

pub fn load_call_feed(path: &Path) -> Result<Vec<CallFeedRow>, ToolError> {
    let text = read(path)?;
    let rows = match FeedFormat::for_path(path) {
        FeedFormat::Json => parse_json(path, &text)?,
        FeedFormat::Tsv => parse_call_tsv(&text),
    };
    info!(path = %path.display(), rows = rows.len(), "call feed read");
    Ok(rows)
}

pub fn load_directory_feed(path: &Path) -> Result<Vec<DirectoryFeedRow>, ToolError> {
    let text = read(path)?;
    let rows = match FeedFormat::for_path(path) {
        FeedFormat::Json => parse_json(path, &text)?,
        FeedFormat::Tsv => parse_directory_tsv(&text),
    };
    info!(path = %path.display(), rows = rows.len(), "directory feed read");
    Ok(rows)
}

/// Columns: caller, date, start, end, receiver. Billing lines stop after
/// the start column.
pub fn parse_call_tsv(text: &str) -> Vec<CallFeedRow> {
    data_lines(text)
        .map(|cells| {
            let end = cell(&cells, 3);
            CallFeedRow {
                caller: cell(&cells, 0),
                date: cell(&cells, 1),
                start: cell(&cells, 2),
                end: (!end.is_empty()).then_some(end),
                receiver: cell(&cells, 4),
            }
        })
        .collect()
}

/// Columns: zone, area, members, phone, role.
pub fn parse_directory_tsv(text: &str) -> Vec<DirectoryFeedRow> {
    data_lines(text)
        .map(|cells| DirectoryFeedRow {
            zone: cell(&cells, 0),
            area: cell(&cells, 1),
            members: cell(&cells, 2),
            phone: cell(&cells, 3),
            role: cell(&cells, 4),
        })
        .collect()
}

fn read(path: &Path) -> Result<String, ToolError> {
    fs::read_to_string(path).map_err(|source| ToolError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json<T: DeserializeOwned>(path: &Path, text: &str) -> Result<Vec<T>, ToolError> {
    serde_json::from_str(text).map_err(|source| ToolError::FeedJson {
        path: path.to_path_buf(),
        source,
    })
}

fn data_lines(text: &str) -> impl Iterator<Item = Vec<&str>> + '_ {
    text.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').collect())
}

fn cell(cells: &[&str], i: usize) -> String {
    cells.get(i).map(|c| c.trim().to_string()).unwrap_or_default()
}
