use std::collections::HashMap;

use crate::dashboard::sink::{AttachmentRate, ChartSeries, TableRow};
use crate::process::Row;

/// Number of rows shown in the recent-activity table.
pub const RECENT_LIMIT: usize = 20;

/// Column names of the tour export.
pub mod columns {
    pub const TIMESTAMP: &str = "Timestamp";
    pub const OFFICER_CLEAN: &str = "Officer_Name_Clean";
    pub const OFFICER: &str = "Name of the Officer";
    pub const DEPARTMENT_CLEAN: &str = "Department_Clean";
    pub const DEPARTMENT: &str = "Department";
    pub const MANDAL: &str = "Mandal Name";
    pub const PANCHAYAT_CLEAN: &str = "Panchayat_Clean";
    pub const PANCHAYAT: &str = "Panchayat Name";
    pub const PURPOSE: &str = "Purpose of Visit";
    pub const OBSERVATIONS: &str = "Key observations/Outcomes";
    pub const ATTACHMENTS: &str = "Attachments";
}

/// Everything one render pushes to the sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregates {
    pub officers: ChartSeries,
    pub coverage: ChartSeries,
    pub total: usize,
    pub attachment_rate: AttachmentRate,
    pub recent: Vec<TableRow>,
}

impl Aggregates {
    pub fn compute(rows: &[Row]) -> Self {
        Self {
            officers: officer_counts(rows),
            coverage: coverage_counts(rows),
            total: rows.len(),
            attachment_rate: attachment_rate(rows),
            recent: recent_rows(rows, RECENT_LIMIT),
        }
    }
}

/// Counts by label, labels kept in first-seen order.
#[derive(Default)]
struct Tally {
    index: HashMap<String, usize>,
    series: ChartSeries,
}

impl Tally {
    fn bump(&mut self, label: &str) {
        match self.index.get(label) {
            Some(&i) => self.series.values[i] += 1,
            None => {
                self.index
                    .insert(label.to_string(), self.series.labels.len());
                self.series.labels.push(label.to_string());
                self.series.values.push(1);
            }
        }
    }
}

fn officer(row: &Row) -> &str {
    row.value_or(columns::OFFICER_CLEAN, columns::OFFICER)
}

fn panchayat(row: &Row) -> &str {
    row.value_or(columns::PANCHAYAT_CLEAN, columns::PANCHAYAT)
}

/// Tours per officer.
pub fn officer_counts(rows: &[Row]) -> ChartSeries {
    let mut tally = Tally::default();
    for row in rows {
        tally.bump(officer(row));
    }
    tally.series
}

/// Tours per `Mandal–Panchayat` pair.
pub fn coverage_counts(rows: &[Row]) -> ChartSeries {
    let mut tally = Tally::default();
    for row in rows {
        let key = format!("{}–{}", row.value(columns::MANDAL), panchayat(row));
        tally.bump(&key);
    }
    tally.series
}

/// Percentage of rows with a non-empty `Attachments` cell, rounded half-up.
pub fn attachment_rate(rows: &[Row]) -> AttachmentRate {
    let total = rows.len() as u64;
    if total == 0 {
        return AttachmentRate(None);
    }
    let attached = rows
        .iter()
        .filter(|r| !r.value(columns::ATTACHMENTS).is_empty())
        .count() as u64;
    AttachmentRate(Some(((200 * attached + total) / (2 * total)) as u32))
}

/// The last `limit` rows, newest first.
pub fn recent_rows(rows: &[Row], limit: usize) -> Vec<TableRow> {
    rows.iter()
        .rev()
        .take(limit)
        .map(|row| TableRow {
            timestamp: row.value(columns::TIMESTAMP).to_string(),
            officer: officer(row).to_string(),
            department: row
                .value_or(columns::DEPARTMENT_CLEAN, columns::DEPARTMENT)
                .to_string(),
            mandal: row.value(columns::MANDAL).to_string(),
            panchayat: panchayat(row).to_string(),
            purpose: row.value(columns::PURPOSE).to_string(),
            observations: row.value(columns::OBSERVATIONS).to_string(),
        })
        .collect()
}
