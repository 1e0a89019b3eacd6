// src/history/mod.rs

pub mod store;

pub use store::FileMarkerStore;

use anyhow::Result;
use std::sync::{Arc, Mutex};

/// Key under which the last-seen change marker is stored.
pub const MARKER_KEY: &str = "lastDashboardUpdate";

/// Persistence for the single "last seen" change marker.
pub trait MarkerStore: Send {
    /// The stored marker, or `None` if nothing has been rendered yet.
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, marker: &str) -> Result<()>;
}

/// Marker kept in memory only. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryMarkerStore {
    marker: Arc<Mutex<Option<String>>>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: Arc::new(Mutex::new(Some(marker.into()))),
        }
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn load(&self) -> Result<Option<String>> {
        let guard = self
            .marker
            .lock()
            .map_err(|_| anyhow::anyhow!("marker lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, marker: &str) -> Result<()> {
        let mut guard = self
            .marker
            .lock()
            .map_err(|_| anyhow::anyhow!("marker lock poisoned"))?;
        *guard = Some(marker.to_string());
        Ok(())
    }
}
