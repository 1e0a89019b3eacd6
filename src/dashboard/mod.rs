// src/dashboard/mod.rs

pub mod aggregate;
pub mod board;
pub mod sink;

pub use aggregate::Aggregates;
pub use board::{Board, BoardState};
pub use sink::{AttachmentRate, ChartSeries, ChartSink, Counter, CounterSink, TableRow, TableSink};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::process::Row;

/// The presentation targets one render pushes to.
///
/// Charts are optional and independent: a missing chart is skipped and a
/// failing chart is logged without stopping the rest. The counters and the
/// table are required.
pub struct Dashboard {
    officer_chart: Option<Box<dyn ChartSink>>,
    coverage_chart: Option<Box<dyn ChartSink>>,
    counters: Box<dyn CounterSink>,
    table: Box<dyn TableSink>,
}

impl Dashboard {
    pub fn new(counters: Box<dyn CounterSink>, table: Box<dyn TableSink>) -> Self {
        Self {
            officer_chart: None,
            coverage_chart: None,
            counters,
            table,
        }
    }

    pub fn with_officer_chart(mut self, chart: Box<dyn ChartSink>) -> Self {
        self.officer_chart = Some(chart);
        self
    }

    pub fn with_coverage_chart(mut self, chart: Box<dyn ChartSink>) -> Self {
        self.coverage_chart = Some(chart);
        self
    }

    /// Recompute every aggregate from `rows` and push them to the sinks.
    ///
    /// An empty `rows` renders a zero total and an `N/A` attachment rate.
    /// The poller never does this itself: an export with a header but no
    /// data rows yields `CheckOutcome::NoData` and leaves the board as it was.
    pub fn render(&mut self, rows: &[Row]) -> Result<Aggregates> {
        let agg = Aggregates::compute(rows);

        if let Some(chart) = self.officer_chart.as_mut() {
            if let Err(e) = chart.update(&agg.officers) {
                warn!("officer chart update failed: {:#}", e);
            }
        }
        if let Some(chart) = self.coverage_chart.as_mut() {
            if let Err(e) = chart.update(&agg.coverage) {
                warn!("coverage chart update failed: {:#}", e);
            }
        }

        self.counters
            .set(Counter::TotalTours, &agg.total.to_string())
            .context("updating total-tours counter")?;
        self.counters
            .set(Counter::AttachmentRate, &agg.attachment_rate.to_string())
            .context("updating attachment-rate counter")?;
        self.table
            .replace_rows(&agg.recent)
            .context("replacing recent-activity rows")?;

        info!(
            rows = agg.total,
            officers = agg.officers.labels.len(),
            coverage = agg.coverage.labels.len(),
            attachments = %agg.attachment_rate,
            "dashboard rendered"
        );
        Ok(agg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::parse;

    const EXPORT: &str = "\
Timestamp,Officer_Name_Clean,Name of the Officer,Mandal Name,Panchayat_Clean,Panchayat Name,Attachments
2024-01-01,Alice,,North,Kota,,scan.pdf
2024-01-02,,Bob,South,,Peta,
2024-01-03,Alice,,North,Kota,,
";

    struct FailingChart;

    impl ChartSink for FailingChart {
        fn update(&mut self, _: &ChartSeries) -> Result<()> {
            anyhow::bail!("canvas not ready")
        }
    }

    struct FailingTable;

    impl TableSink for FailingTable {
        fn replace_rows(&mut self, _: &[TableRow]) -> Result<()> {
            anyhow::bail!("table body missing")
        }
    }

    #[test]
    fn render_pushes_every_sink() {
        let board = Board::new();
        let mut dashboard = board.dashboard();
        dashboard.render(&parse(EXPORT, ',')).unwrap();

        let state = board.state();
        let officers = state.officer_chart.unwrap();
        assert_eq!(officers.get("Alice"), Some(2));
        assert_eq!(officers.get("Bob"), Some(1));
        let coverage = state.coverage_chart.unwrap();
        assert_eq!(coverage.get("North–Kota"), Some(2));
        assert_eq!(coverage.get("South–Peta"), Some(1));
        assert_eq!(state.counters["total-tours"], "3");
        assert_eq!(state.counters["perc-attachments"], "33%");
        assert_eq!(state.table.len(), 3);
        assert_eq!(state.table[0].timestamp, "2024-01-03");
        assert_eq!(state.table[1].officer, "Bob");
    }

    #[test]
    fn render_twice_gives_the_same_state() {
        let board = Board::new();
        let mut dashboard = board.dashboard();
        let rows = parse(EXPORT, ',');

        dashboard.render(&rows).unwrap();
        let mut first = board.state();
        dashboard.render(&rows).unwrap();
        let mut second = board.state();

        first.rendered_at = None;
        second.rendered_at = None;
        assert_eq!(first, second);
        assert_eq!(second.table.len(), 3);
    }

    #[test]
    fn missing_charts_are_skipped() {
        let board = Board::new();
        let mut dashboard = Dashboard::new(Box::new(board.counters()), Box::new(board.table()));
        dashboard.render(&parse(EXPORT, ',')).unwrap();

        let state = board.state();
        assert!(state.officer_chart.is_none());
        assert!(state.coverage_chart.is_none());
        assert_eq!(state.counters["total-tours"], "3");
    }

    #[test]
    fn failing_chart_does_not_block_other_sinks() {
        let board = Board::new();
        let mut dashboard = Dashboard::new(Box::new(board.counters()), Box::new(board.table()))
            .with_officer_chart(Box::new(FailingChart))
            .with_coverage_chart(Box::new(board.coverage_chart()));
        dashboard.render(&parse(EXPORT, ',')).unwrap();

        let state = board.state();
        assert!(state.coverage_chart.is_some());
        assert_eq!(state.table.len(), 3);
    }

    #[test]
    fn failing_table_is_an_error() {
        let board = Board::new();
        let mut dashboard = Dashboard::new(Box::new(board.counters()), Box::new(FailingTable));
        let err = dashboard.render(&parse(EXPORT, ',')).unwrap_err();
        assert!(format!("{:#}", err).contains("table body missing"));
    }

    #[test]
    fn empty_rows_render_not_available_rate() {
        let board = Board::new();
        let mut dashboard = board.dashboard();
        dashboard.render(&[]).unwrap();

        let state = board.state();
        assert_eq!(state.counters["total-tours"], "0");
        assert_eq!(state.counters["perc-attachments"], "N/A");
        assert!(state.table.is_empty());
    }
}
