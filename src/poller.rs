// src/poller.rs

use anyhow::Context;
use std::time::Duration;
use thiserror::Error;
use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    dashboard::Dashboard,
    fetch::Source,
    history::MarkerStore,
    process::{latest_marker, parse, ParseError, DEFAULT_DELIMITER},
};

/// How often the export is checked unless configured otherwise.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Result of one successful check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Newer data was rendered and its marker stored.
    Updated { marker: String, rows: usize },
    /// The export's marker is not newer than the stored one.
    Unchanged { marker: String, stored: String },
    /// The export has a header but no data rows yet.
    NoData,
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("fetch failed: {0:#}")]
    Fetch(anyhow::Error),
    #[error("unusable export: {0}")]
    Parse(#[from] ParseError),
    #[error("marker store failed: {0:#}")]
    Store(anyhow::Error),
    #[error("render failed: {0:#}")]
    Render(anyhow::Error),
}

/// Receives the result of every scheduled check.
pub trait OutcomePolicy: Send {
    fn on_outcome(&mut self, result: &Result<CheckOutcome, CheckError>);
}

impl<F> OutcomePolicy for F
where
    F: FnMut(&Result<CheckOutcome, CheckError>) + Send,
{
    fn on_outcome(&mut self, result: &Result<CheckOutcome, CheckError>) {
        self(result)
    }
}

/// Logs each result and otherwise waits for the next tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOutcome;

impl OutcomePolicy for LogOutcome {
    fn on_outcome(&mut self, result: &Result<CheckOutcome, CheckError>) {
        match result {
            Ok(CheckOutcome::Updated { marker, rows }) => {
                info!(%marker, rows, "🔄 new data detected, dashboard updated");
            }
            Ok(CheckOutcome::Unchanged { marker, stored }) => {
                debug!(%marker, %stored, "no new data");
            }
            Ok(CheckOutcome::NoData) => info!("export has no data rows yet"),
            Err(e) => warn!("polling failed: {}", e),
        }
    }
}

/// Fetches the export, compares its change marker with the stored one and
/// re-renders the dashboard when it moved forward.
pub struct Poller<S, M> {
    source: S,
    store: M,
    dashboard: Dashboard,
    delimiter: char,
    policy: Box<dyn OutcomePolicy>,
}

impl<S: Source, M: MarkerStore> Poller<S, M> {
    pub fn new(source: S, store: M, dashboard: Dashboard) -> Self {
        Self {
            source,
            store,
            dashboard,
            delimiter: DEFAULT_DELIMITER,
            policy: Box::new(LogOutcome),
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_policy(mut self, policy: impl OutcomePolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn store(&self) -> &M {
        &self.store
    }

    /// One check: fetch, compare markers, render and persist if newer.
    ///
    /// The marker is only stored after the dashboard rendered successfully.
    pub async fn check_for_updates(&mut self) -> Result<CheckOutcome, CheckError> {
        let text = self.source.fetch_text().await.map_err(CheckError::Fetch)?;

        let Some(marker) = latest_marker(&text, self.delimiter)? else {
            return Ok(CheckOutcome::NoData);
        };

        let stored = self.store.load().map_err(CheckError::Store)?;
        if let Some(stored) = stored {
            if marker <= stored {
                return Ok(CheckOutcome::Unchanged { marker, stored });
            }
        }

        let rows = parse(&text, self.delimiter);
        self.dashboard.render(&rows).map_err(CheckError::Render)?;
        self.store
            .save(&marker)
            .with_context(|| format!("saving marker {}", marker))
            .map_err(CheckError::Store)?;

        Ok(CheckOutcome::Updated {
            marker,
            rows: rows.len(),
        })
    }
}

impl<S, M> Poller<S, M>
where
    S: Source + 'static,
    M: MarkerStore + 'static,
{
    /// Check now and then every `every`, on a background task.
    ///
    /// Checks run one after another; a slow check delays the next tick
    /// instead of overlapping it.
    pub fn start(mut self, every: Duration) -> PollerHandle<S, M> {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(interval = ?every, "poller started");

            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let result = self.check_for_updates().await;
                        self.policy.on_outcome(&result);
                    }
                }
            }

            info!("poller stopped");
            self
        });

        PollerHandle {
            stop: stop_tx,
            task,
        }
    }
}

/// Running poller. Dropping the handle also ends the loop.
pub struct PollerHandle<S, M> {
    stop: oneshot::Sender<()>,
    task: JoinHandle<Poller<S, M>>,
}

impl<S, M> PollerHandle<S, M> {
    /// Stop ticking, wait for an in-flight check to finish and get the
    /// poller back.
    pub async fn stop(self) -> anyhow::Result<Poller<S, M>> {
        let _ = self.stop.send(());
        self.task.await.context("poller task failed")
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
