use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::debug;

use super::sink::{ChartSeries, ChartSink, Counter, CounterSink, TableRow, TableSink};
use super::Dashboard;

/// What the page currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub officer_chart: Option<ChartSeries>,
    pub coverage_chart: Option<ChartSeries>,
    /// Counter element id → text content.
    pub counters: BTreeMap<String, String>,
    pub table: Vec<TableRow>,
    pub rendered_at: Option<DateTime<Utc>>,
}

/// Shared presentation state. Its sink handles write into one `BoardState`;
/// with a snapshot path every update is mirrored to disk as JSON.
#[derive(Debug, Clone, Default)]
pub struct Board {
    state: Arc<Mutex<BoardState>>,
    snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
enum ChartSlot {
    Officer,
    Coverage,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// A board that rewrites `path` after every sink update.
    pub fn with_snapshot(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating snapshot directory {}", parent.display()))?;
        }
        Ok(Self {
            state: Arc::default(),
            snapshot: Some(path),
        })
    }

    pub fn state(&self) -> BoardState {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn officer_chart(&self) -> BoardChart {
        BoardChart {
            board: self.clone(),
            slot: ChartSlot::Officer,
        }
    }

    pub fn coverage_chart(&self) -> BoardChart {
        BoardChart {
            board: self.clone(),
            slot: ChartSlot::Coverage,
        }
    }

    pub fn counters(&self) -> BoardCounters {
        BoardCounters {
            board: self.clone(),
        }
    }

    pub fn table(&self) -> BoardTable {
        BoardTable {
            board: self.clone(),
        }
    }

    /// A dashboard wired to all four sinks of this board.
    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(Box::new(self.counters()), Box::new(self.table()))
            .with_officer_chart(Box::new(self.officer_chart()))
            .with_coverage_chart(Box::new(self.coverage_chart()))
    }

    fn apply(&self, f: impl FnOnce(&mut BoardState)) -> Result<()> {
        let snapshot = {
            let mut state = self
                .state
                .lock()
                .map_err(|_| anyhow::anyhow!("board state lock poisoned"))?;
            f(&mut state);
            state.rendered_at = Some(Utc::now());
            state.clone()
        };
        self.persist(&snapshot)
    }

    fn persist(&self, state: &BoardState) -> Result<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(state).context("serialising board snapshot")?;
        fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("renaming `{}` → `{}`", tmp.display(), path.display()))?;
        debug!(path = %path.display(), "board snapshot written");
        Ok(())
    }
}

pub struct BoardChart {
    board: Board,
    slot: ChartSlot,
}

impl ChartSink for BoardChart {
    fn update(&mut self, series: &ChartSeries) -> Result<()> {
        let slot = self.slot;
        self.board.apply(|state| {
            let target = match slot {
                ChartSlot::Officer => &mut state.officer_chart,
                ChartSlot::Coverage => &mut state.coverage_chart,
            };
            *target = Some(series.clone());
        })
    }
}

pub struct BoardCounters {
    board: Board,
}

impl CounterSink for BoardCounters {
    fn set(&mut self, counter: Counter, text: &str) -> Result<()> {
        self.board.apply(|state| {
            state
                .counters
                .insert(counter.element_id().to_string(), text.to_string());
        })
    }
}

pub struct BoardTable {
    board: Board,
}

impl TableSink for BoardTable {
    fn replace_rows(&mut self, rows: &[TableRow]) -> Result<()> {
        self.board.apply(|state| {
            state.table.clear();
            state.table.extend_from_slice(rows);
        })
    }
}
