//! Inventory Service
//!
//! Runs loads against the snapshot store: every load takes a ticket, decodes
//! and normalizes off the async runtime, then commits unless a newer load
//! superseded it. Unreadable sources are reported once and, when configured,
//! replaced by the placeholder dataset.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use stockboard_models::{AggregateSummary, NormalizedInventory, RawTable};
use stockboard_utils::{
    CommitOutcome, DataOrigin, InventoryLoader, InventoryStore, LoadTicket, NormalizerConfig,
    Snapshot, SourceFormat, StockboardError, StockboardResult,
};

use crate::metrics::InventoryMetrics;

/// Result of a load that produced data.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub generation: u64,
    pub committed: bool,
    pub origin: DataOrigin,
    pub summary: AggregateSummary,
}

#[derive(Clone)]
pub struct InventoryService {
    store: InventoryStore,
    loader: Arc<InventoryLoader>,
    metrics: Arc<InventoryMetrics>,
    fallback_to_placeholder: bool,
}

impl InventoryService {
    pub fn new(
        normalizer: NormalizerConfig,
        metrics: Arc<InventoryMetrics>,
        fallback_to_placeholder: bool,
    ) -> Self {
        Self {
            store: InventoryStore::new(NormalizedInventory::default(), DataOrigin::Empty),
            loader: Arc::new(InventoryLoader::new(normalizer)),
            metrics,
            fallback_to_placeholder,
        }
    }

    pub fn metrics(&self) -> &InventoryMetrics {
        &self.metrics
    }

    pub fn low_stock_threshold(&self) -> u64 {
        self.loader.normalizer().config().low_stock_threshold
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot().await
    }

    pub async fn load_file(&self, path: PathBuf) -> StockboardResult<LoadReport> {
        let ticket = self.store.begin_load();
        let loader = Arc::clone(&self.loader);
        let origin = DataOrigin::File {
            path: path.display().to_string(),
        };

        let result = run_blocking(move || loader.load_path(&path)).await;
        self.finish(ticket, result, origin).await
    }

    pub async fn load_upload(
        &self,
        filename: String,
        data: Vec<u8>,
        format: Option<SourceFormat>,
    ) -> StockboardResult<LoadReport> {
        let ticket = self.store.begin_load();
        let loader = Arc::clone(&self.loader);
        let origin = DataOrigin::Upload {
            filename: filename.clone(),
        };

        let result = run_blocking(move || loader.load_bytes(&filename, &data, format)).await;
        self.finish(ticket, result, origin).await
    }

    pub async fn load_tables(&self, tables: Vec<RawTable>) -> StockboardResult<LoadReport> {
        let ticket = self.store.begin_load();
        let loader = Arc::clone(&self.loader);
        let origin = DataOrigin::Tables {
            count: tables.len(),
        };

        let result = run_blocking(move || Ok(loader.load_tables(&tables))).await;
        self.finish(ticket, result, origin).await
    }

    async fn finish(
        &self,
        ticket: LoadTicket,
        result: StockboardResult<NormalizedInventory>,
        origin: DataOrigin,
    ) -> StockboardResult<LoadReport> {
        let kind = origin.kind();

        let inventory = match result {
            Ok(inventory) => inventory,
            Err(error) => {
                warn!(origin = kind, error = %error, "Inventory load failed");
                self.metrics.record_load(kind, "failed");

                if self.fallback_to_placeholder && error.is_load_failure() {
                    let placeholder = DataOrigin::Placeholder {
                        reason: error.to_string(),
                    };
                    let outcome = self
                        .store
                        .commit(ticket, self.loader.placeholder(), placeholder)
                        .await;
                    if let CommitOutcome::Committed(snapshot) = &outcome {
                        self.metrics.observe(&snapshot.inventory);
                    }
                }
                return Err(error);
            }
        };

        let summary = inventory.summary.clone();
        match self.store.commit(ticket, inventory, origin.clone()).await {
            CommitOutcome::Committed(snapshot) => {
                self.metrics.record_load(kind, "committed");
                self.metrics.observe(&snapshot.inventory);
                info!(
                    generation = snapshot.generation,
                    origin = kind,
                    records = summary.record_count,
                    "Inventory snapshot replaced"
                );
                Ok(LoadReport {
                    generation: snapshot.generation,
                    committed: true,
                    origin,
                    summary,
                })
            }
            CommitOutcome::Stale { generation, .. } => {
                self.metrics.record_load(kind, "stale");
                Ok(LoadReport {
                    generation,
                    committed: false,
                    origin,
                    summary,
                })
            }
        }
    }
}

async fn run_blocking<F>(task: F) -> StockboardResult<NormalizedInventory>
where
    F: FnOnce() -> StockboardResult<NormalizedInventory> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| StockboardError::internal(format!("Load task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockboard_models::RawRow;

    fn service(fallback: bool) -> InventoryService {
        let config = NormalizerConfig::spreadsheet_layout(1000).with_skip_rows(0);
        let metrics = Arc::new(InventoryMetrics::new().unwrap());
        InventoryService::new(config, metrics, fallback)
    }

    fn bolts() -> Vec<RawTable> {
        vec![RawTable::new(
            "Bolts",
            vec![RawRow::from(vec!["1", "Bolt", "M6x20", "Steel", "", "", "1500", "pcs"])],
        )]
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let service = service(true);
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.origin, DataOrigin::Empty);
        assert!(snapshot.inventory.is_empty());
    }

    #[tokio::test]
    async fn test_load_tables_commits() {
        let service = service(true);
        let report = service.load_tables(bolts()).await.unwrap();

        assert!(report.committed);
        assert_eq!(report.generation, 1);
        assert_eq!(report.summary.total_quantity, 1500);
        assert_eq!(service.metrics().load_count("tables", "committed"), 1);
        assert_eq!(service.snapshot().await.inventory.records.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_upload_falls_back_to_placeholder() {
        let service = service(true);
        service.load_tables(bolts()).await.unwrap();

        let error = service
            .load_upload("data.xlsx".to_string(), b"garbage".to_vec(), None)
            .await
            .unwrap_err();
        assert!(error.is_load_failure());

        let snapshot = service.snapshot().await;
        assert!(snapshot.origin.is_placeholder());
        assert!(snapshot.inventory.source("Bolts").is_none());
        assert!(!snapshot.inventory.is_empty());
        assert_eq!(service.metrics().load_count("upload", "failed"), 1);
    }

    #[tokio::test]
    async fn test_unreadable_upload_keeps_snapshot_without_fallback() {
        let service = service(false);
        service.load_tables(bolts()).await.unwrap();

        assert!(service
            .load_upload("data.xlsx".to_string(), b"garbage".to_vec(), None)
            .await
            .is_err());
        assert!(service.snapshot().await.inventory.source("Bolts").is_some());
    }

    #[tokio::test]
    async fn test_missing_file_falls_back() {
        let service = service(true);
        let result = service
            .load_file(PathBuf::from("/nonexistent/stockboard/data.xlsx"))
            .await;

        assert!(result.is_err());
        assert!(service.snapshot().await.origin.is_placeholder());
    }
}
