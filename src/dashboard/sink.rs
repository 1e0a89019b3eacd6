use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label/value arrays handed to a chart widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

impl ChartSeries {
    pub fn total(&self) -> usize {
        self.values.iter().sum()
    }

    /// Count recorded for `label`, if the label is present.
    pub fn get(&self, label: &str) -> Option<usize> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.values[i])
    }
}

/// The summary counters shown above the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    TotalTours,
    AttachmentRate,
}

impl Counter {
    /// Element id of the counter on the page.
    pub fn element_id(&self) -> &'static str {
        match self {
            Counter::TotalTours => "total-tours",
            Counter::AttachmentRate => "perc-attachments",
        }
    }
}

/// Share of rows carrying attachments, as a whole percent.
///
/// `None` when there are no rows; displayed as `N/A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentRate(pub Option<u32>);

impl fmt::Display for AttachmentRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(pct) => write!(f, "{}%", pct),
            None => f.write_str("N/A"),
        }
    }
}

/// One line of the recent-activity table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub timestamp: String,
    pub officer: String,
    pub department: String,
    pub mandal: String,
    pub panchayat: String,
    pub purpose: String,
    pub observations: String,
}

/// A chart widget: replace its labels/data and redraw.
pub trait ChartSink: Send {
    fn update(&mut self, series: &ChartSeries) -> Result<()>;
}

/// The summary counter elements.
pub trait CounterSink: Send {
    fn set(&mut self, counter: Counter, text: &str) -> Result<()>;
}

/// The recent-activity table body. `replace_rows` clears whatever was there.
pub trait TableSink: Send {
    fn replace_rows(&mut self, rows: &[TableRow]) -> Result<()>;
}
