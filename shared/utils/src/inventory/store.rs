//! Snapshot store with last-load-wins semantics.
//!
//! Every load takes a ticket before its asynchronous work starts. Only the
//! most recently issued ticket may commit; results of superseded loads are
//! discarded when they resolve. Readers always see one complete snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use stockboard_models::NormalizedInventory;

/// Where the data of a snapshot came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataOrigin {
    /// Nothing has been loaded yet.
    Empty,
    File { path: String },
    Upload { filename: String },
    Tables { count: usize },
    Placeholder { reason: String },
}

impl DataOrigin {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::File { .. } => "file",
            Self::Upload { .. } => "upload",
            Self::Tables { .. } => "tables",
            Self::Placeholder { .. } => "placeholder",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub origin: DataOrigin,
    pub inventory: NormalizedInventory,
}

/// Permission to commit the result of one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug, Clone)]
pub enum CommitOutcome {
    Committed(Arc<Snapshot>),
    /// A newer load was started after this ticket was issued.
    Stale { generation: u64, latest: u64 },
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

#[derive(Clone)]
pub struct InventoryStore {
    issued: Arc<AtomicU64>,
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl InventoryStore {
    /// Create a store holding `inventory` as generation 0.
    pub fn new(inventory: NormalizedInventory, origin: DataOrigin) -> Self {
        let snapshot = Snapshot {
            generation: 0,
            loaded_at: Utc::now(),
            origin,
            inventory,
        };

        Self {
            issued: Arc::new(AtomicU64::new(0)),
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    pub fn begin_load(&self) -> LoadTicket {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Load started");
        LoadTicket { generation }
    }

    pub fn latest_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Replace the current snapshot unless `ticket` has been superseded.
    pub async fn commit(
        &self,
        ticket: LoadTicket,
        inventory: NormalizedInventory,
        origin: DataOrigin,
    ) -> CommitOutcome {
        let mut current = self.current.write().await;

        // Checked under the write lock so two commits cannot interleave.
        let latest = self.latest_issued();
        if ticket.generation != latest {
            warn!(
                generation = ticket.generation,
                latest, "Discarding result of superseded load"
            );
            return CommitOutcome::Stale {
                generation: ticket.generation,
                latest,
            };
        }

        let snapshot = Arc::new(Snapshot {
            generation: ticket.generation,
            loaded_at: Utc::now(),
            origin,
            inventory,
        });
        *current = Arc::clone(&snapshot);
        debug!(generation = ticket.generation, "Load committed");

        CommitOutcome::Committed(snapshot)
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read().await)
    }
}
