//! Prometheus metrics for inventory loads.

use prometheus::{IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use stockboard_models::NormalizedInventory;

pub struct InventoryMetrics {
    registry: Registry,
    loads: IntCounterVec,
    records: IntGauge,
    total_quantity: IntGauge,
    low_stock: IntGauge,
}

impl InventoryMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("stockboard".to_string()), None)?;

        let loads = IntCounterVec::new(
            Opts::new("inventory_loads_total", "Inventory loads by origin and outcome"),
            &["origin", "outcome"],
        )?;
        let records = IntGauge::new("inventory_records", "In-stock records in the current snapshot")?;
        let total_quantity =
            IntGauge::new("inventory_total_quantity", "Summed stock of the current snapshot")?;
        let low_stock =
            IntGauge::new("inventory_low_stock_records", "Low-stock records in the current snapshot")?;

        registry.register(Box::new(loads.clone()))?;
        registry.register(Box::new(records.clone()))?;
        registry.register(Box::new(total_quantity.clone()))?;
        registry.register(Box::new(low_stock.clone()))?;

        Ok(Self {
            registry,
            loads,
            records,
            total_quantity,
            low_stock,
        })
    }

    pub fn record_load(&self, origin: &str, outcome: &str) {
        self.loads.with_label_values(&[origin, outcome]).inc();
    }

    pub fn load_count(&self, origin: &str, outcome: &str) -> u64 {
        self.loads.with_label_values(&[origin, outcome]).get()
    }

    /// Point the gauges at the committed snapshot.
    pub fn observe(&self, inventory: &NormalizedInventory) {
        let summary = &inventory.summary;
        self.records.set(to_gauge(summary.record_count as u64));
        self.total_quantity.set(to_gauge(summary.total_quantity));
        self.low_stock.set(to_gauge(summary.low_stock_count as u64));
    }

    pub fn encode(&self) -> String {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .unwrap_or_else(|_| "Error encoding metrics".to_string())
    }
}

fn to_gauge(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
