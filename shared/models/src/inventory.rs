//! Inventory domain models for the Stockboard system.
//!
//! This module defines normalized stock records and the aggregates derived
//! from them. Both are rebuilt from scratch on every data load and are never
//! mutated once a load has completed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// One normalized row of stock data.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct InventoryRecord {
    /// Display-order label copied from the sheet; not unique.
    pub sequence: Option<String>,
    #[validate(length(min = 1, message = "Category must not be empty"))]
    pub category: String,
    #[validate(length(min = 1, message = "Specification must not be empty"))]
    pub specification: String,
    pub material: Option<String>,
    pub quantity: u64,
    #[validate(length(min = 1, message = "Unit must not be empty"))]
    pub unit: String,
    /// Name of the sheet the record was read from.
    pub source: String,
}

impl InventoryRecord {
    pub fn new(
        category: impl Into<String>,
        specification: impl Into<String>,
        quantity: u64,
        unit: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            sequence: None,
            category: category.into(),
            specification: specification.into(),
            material: None,
            quantity,
            unit: unit.into(),
            source: source.into(),
        }
    }

    pub fn with_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = Some(sequence.into());
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Stocked, but below `threshold`. A quantity equal to the threshold is
    /// not low.
    pub fn is_low_stock(&self, threshold: u64) -> bool {
        self.quantity > 0 && self.quantity < threshold
    }

    /// Lowercased text used by keyword search.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.category,
            self.specification,
            self.material.as_deref().unwrap_or("")
        )
        .to_lowercase()
    }
}

/// Scalar aggregates over the in-stock records of one load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregateSummary {
    pub total_quantity: u64,
    pub record_count: usize,
    pub group_count: usize,
    pub low_stock_count: usize,
    pub low_stock_threshold: u64,
    pub category_totals: BTreeMap<String, u64>,
}

impl AggregateSummary {
    pub fn new(low_stock_threshold: u64) -> Self {
        Self {
            low_stock_threshold,
            ..Self::default()
        }
    }

    /// Fold one record into the running totals. Records without stock are
    /// ignored.
    pub fn add(&mut self, record: &InventoryRecord) {
        if !record.in_stock() {
            return;
        }

        self.total_quantity = self.total_quantity.saturating_add(record.quantity);
        self.record_count += 1;
        if record.is_low_stock(self.low_stock_threshold) {
            self.low_stock_count += 1;
        }

        let total = self
            .category_totals
            .entry(record.category.clone())
            .or_insert(0);
        *total = total.saturating_add(record.quantity);
    }
}

/// Complete, immutable result of normalizing one workbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedInventory {
    /// Source name to every retained record of that source, in row order.
    /// Sources without retained records are absent.
    pub groups: BTreeMap<String, Vec<InventoryRecord>>,
    /// In-stock records in table order, then row order.
    pub records: Vec<InventoryRecord>,
    pub summary: AggregateSummary,
}

impl NormalizedInventory {
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn source(&self, name: &str) -> Option<&[InventoryRecord]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_boundary() {
        let record = InventoryRecord::new("Bolt", "M6", 1000, "pcs", "Bolts");
        assert!(!record.is_low_stock(1000));
        assert!(record.is_low_stock(1001));

        let empty = InventoryRecord::new("Bolt", "M6", 0, "pcs", "Bolts");
        assert!(!empty.is_low_stock(1000));
    }

    #[test]
    fn test_summary_ignores_out_of_stock() {
        let mut summary = AggregateSummary::new(10);
        summary.add(&InventoryRecord::new("Nut", "M4", 0, "pcs", "Nuts"));
        summary.add(&InventoryRecord::new("Nut", "M5", 5, "pcs", "Nuts"));
        summary.add(&InventoryRecord::new("Nut", "M6", 10, "pcs", "Nuts"));

        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.total_quantity, 15);
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.category_totals.get("Nut"), Some(&15));
    }

    #[test]
    fn test_record_validation() {
        let record = InventoryRecord::new("Bolt", "", 1, "pcs", "Bolts");
        assert!(record.validate().is_err());

        let record = InventoryRecord::new("Bolt", "M6", 1, "pcs", "Bolts");
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_search_text_includes_material() {
        let record = InventoryRecord::new("Bolt", "M6x20", 1, "pcs", "Bolts").with_material("Steel");
        assert_eq!(record.search_text(), "bolt m6x20 steel");
    }
}
