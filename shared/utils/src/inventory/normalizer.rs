//! Inventory Normalizer
//!
//! Turns raw spreadsheet tables into validated inventory records plus the
//! aggregates the dashboard displays. Malformed quantities default to zero
//! and rows without a specification are dropped; neither is an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use validator::Validate;

use stockboard_models::{
    AggregateSummary, ColumnRef, InventoryRecord, NormalizedInventory, RawRow, RawTable,
};

/// Where each record field lives in a raw row.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ColumnLayout {
    pub specification: ColumnRef,
    #[serde(default)]
    pub sequence: Option<ColumnRef>,
    #[serde(default)]
    pub category: Option<ColumnRef>,
    #[serde(default)]
    pub material: Option<ColumnRef>,
    /// Tried in order; the first cell holding a non-negative integer wins.
    #[validate(length(min = 1, message = "At least one quantity column is required"))]
    pub quantity: Vec<ColumnRef>,
    #[serde(default)]
    pub unit: Option<ColumnRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct NormalizerConfig {
    #[validate]
    pub columns: ColumnLayout,
    /// Header rows skipped at the top of every table.
    #[serde(default)]
    pub skip_rows: usize,
    /// Case-insensitive substrings; matching sources are ignored entirely.
    #[serde(default)]
    pub exclude_sources: Vec<String>,
    pub low_stock_threshold: u64,
    #[serde(default = "default_unit")]
    #[validate(length(min = 1, message = "Default unit must not be empty"))]
    pub default_unit: String,
}

fn default_unit() -> String {
    "pcs".to_string()
}

impl NormalizerConfig {
    /// Layout of the stock workbook: sequence, category, specification and
    /// material in the first four columns, stock in column 6 (falling back to
    /// 7 then 5), unit in column 5 and four header rows per sheet.
    pub fn spreadsheet_layout(low_stock_threshold: u64) -> Self {
        Self {
            columns: ColumnLayout {
                specification: ColumnRef::Index(2),
                sequence: Some(ColumnRef::Index(0)),
                category: Some(ColumnRef::Index(1)),
                material: Some(ColumnRef::Index(3)),
                quantity: vec![ColumnRef::Index(6), ColumnRef::Index(7), ColumnRef::Index(5)],
                unit: Some(ColumnRef::Index(5)),
            },
            skip_rows: 4,
            exclude_sources: vec!["总汇".to_string(), "Sheet1".to_string(), "空白".to_string()],
            low_stock_threshold,
            default_unit: default_unit(),
        }
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    pub fn with_exclusions(mut self, patterns: Vec<String>) -> Self {
        self.exclude_sources = patterns;
        self
    }

    pub fn with_quantity_columns(mut self, columns: Vec<ColumnRef>) -> Self {
        self.columns.quantity = columns;
        self
    }
}

/// Parse a cell as a non-negative integer.
///
/// Whitespace and `,`/`_` digit separators are ignored and an optional `+`
/// sign is accepted. The leading run of digits is used, so `"1500.0"` and
/// `"12pcs"` parse to 1500 and 12. Negative, digit-less and overflowing
/// values are rejected.
pub fn parse_quantity(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    let unsigned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    let digits: &str = {
        let end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        &unsigned[..end]
    };

    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Table normalizer.
pub struct InventoryNormalizer {
    config: NormalizerConfig,
    exclusions: Vec<String>,
}

impl InventoryNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        let exclusions = config
            .exclude_sources
            .iter()
            .map(|p| p.to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        Self { config, exclusions }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn is_excluded(&self, source: &str) -> bool {
        let source = source.to_lowercase();
        self.exclusions.iter().any(|p| source.contains(p.as_str()))
    }

    /// Normalize every table into one immutable result.
    pub fn normalize(&self, tables: &[RawTable]) -> NormalizedInventory {
        let mut groups = BTreeMap::new();
        let mut records = Vec::new();
        let mut summary = AggregateSummary::new(self.config.low_stock_threshold);

        for table in tables {
            if self.is_excluded(&table.name) {
                debug!(source = %table.name, "Skipping excluded source");
                continue;
            }

            let mut retained = Vec::new();
            for row in table.rows.iter().skip(self.config.skip_rows) {
                let Some(record) = self.normalize_row(&table.name, row) else {
                    continue;
                };

                if record.in_stock() {
                    summary.add(&record);
                    records.push(record.clone());
                }
                retained.push(record);
            }

            debug!(
                source = %table.name,
                rows = table.rows.len(),
                retained = retained.len(),
                "Normalized source"
            );

            // Tables sharing a name merge into one source.
            if !retained.is_empty() {
                groups
                    .entry(table.name.clone())
                    .or_insert_with(Vec::new)
                    .extend(retained);
            }
        }

        summary.group_count = groups.len();

        NormalizedInventory {
            groups,
            records,
            summary,
        }
    }

    /// Build one record, or `None` when the row has no specification.
    pub fn normalize_row(&self, source: &str, row: &RawRow) -> Option<InventoryRecord> {
        let columns = &self.config.columns;
        let specification = non_empty(row.get(&columns.specification))?;

        let category = self
            .optional_text(row, columns.category.as_ref())
            .unwrap_or_else(|| source.trim().to_string());
        let unit = self
            .optional_text(row, columns.unit.as_ref())
            .unwrap_or_else(|| self.config.default_unit.clone());

        Some(InventoryRecord {
            sequence: self.optional_text(row, columns.sequence.as_ref()),
            category,
            specification,
            material: self.optional_text(row, columns.material.as_ref()),
            quantity: self.resolve_quantity(row),
            unit,
            source: source.to_string(),
        })
    }

    /// First candidate column that parses wins; otherwise zero.
    pub fn resolve_quantity(&self, row: &RawRow) -> u64 {
        self.config
            .columns
            .quantity
            .iter()
            .find_map(|column| row.get(column).and_then(parse_quantity))
            .unwrap_or(0)
    }

    fn optional_text(&self, row: &RawRow, column: Option<&ColumnRef>) -> Option<String> {
        column.and_then(|c| non_empty(row.get(c)))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
