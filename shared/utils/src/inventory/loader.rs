//! Inventory Loader
//!
//! Decodes a stock file and normalizes it in one step. A source that cannot
//! be decoded is a single load-level failure; callers may serve
//! [`InventoryLoader::placeholder`] instead of exposing partial data.

use std::path::Path;

use stockboard_models::{NormalizedInventory, RawTable};

use super::normalizer::{InventoryNormalizer, NormalizerConfig};
use super::placeholder::placeholder_tables;
use super::reader::{SourceFormat, WorkbookReader};
use crate::error::StockboardResult;
use crate::log_info;

pub struct InventoryLoader {
    reader: WorkbookReader,
    normalizer: InventoryNormalizer,
    placeholder: InventoryNormalizer,
}

impl InventoryLoader {
    pub fn new(config: NormalizerConfig) -> Self {
        // Placeholder tables always use the stock workbook layout.
        let mut placeholder = NormalizerConfig::spreadsheet_layout(config.low_stock_threshold);
        placeholder.default_unit = config.default_unit.clone();

        Self {
            reader: WorkbookReader::new(),
            normalizer: InventoryNormalizer::new(config),
            placeholder: InventoryNormalizer::new(placeholder),
        }
    }

    pub fn normalizer(&self) -> &InventoryNormalizer {
        &self.normalizer
    }

    pub fn load_bytes(
        &self,
        filename: &str,
        data: &[u8],
        format: Option<SourceFormat>,
    ) -> StockboardResult<NormalizedInventory> {
        let tables = self.reader.read_bytes(filename, data, format)?;
        Ok(self.load_tables(&tables))
    }

    pub fn load_path(&self, path: &Path) -> StockboardResult<NormalizedInventory> {
        let tables = self.reader.read_path(path)?;
        Ok(self.load_tables(&tables))
    }

    pub fn load_tables(&self, tables: &[RawTable]) -> NormalizedInventory {
        let inventory = self.normalizer.normalize(tables);
        log_info!(
            "Normalized inventory",
            tables = tables.len(),
            sources = inventory.summary.group_count,
            records = inventory.summary.record_count,
            total_quantity = inventory.summary.total_quantity
        );
        inventory
    }

    pub fn placeholder(&self) -> NormalizedInventory {
        self.placeholder.normalize(&placeholder_tables())
    }
}
