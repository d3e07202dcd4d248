//! Read-side views over a normalized inventory: keyword search, quantity
//! ranking, per-source listings and the category breakdown.

use serde::Serialize;

use stockboard_models::{AggregateSummary, InventoryRecord, NormalizedInventory};

/// Default number of rows in the stock ranking.
pub const DEFAULT_RANKING_LIMIT: usize = 100;
/// Rows shown in the top-stock chart.
pub const TOP_CHART_LIMIT: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOverview {
    pub source: String,
    pub record_count: usize,
}

/// Records matching every whitespace-separated keyword, case-insensitively,
/// against category, specification and material. A blank query matches all.
pub fn search<'a>(records: &'a [InventoryRecord], query: &str) -> Vec<&'a InventoryRecord> {
    let keywords: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if keywords.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|record| {
            let text = record.search_text();
            keywords.iter().all(|k| text.contains(k.as_str()))
        })
        .collect()
}

/// Highest quantity first; equal quantities keep their input order.
pub fn rank_by_quantity<'a, I>(records: I, limit: usize) -> Vec<&'a InventoryRecord>
where
    I: IntoIterator<Item = &'a InventoryRecord>,
{
    let mut ranked: Vec<&InventoryRecord> = records.into_iter().collect();
    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    ranked.truncate(limit);
    ranked
}

/// Category totals, largest first, ties broken by name.
pub fn category_breakdown(summary: &AggregateSummary) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = summary
        .category_totals
        .iter()
        .map(|(category, quantity)| CategoryTotal {
            category: category.clone(),
            quantity: *quantity,
        })
        .collect();
    totals.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.category.cmp(&b.category)));
    totals
}

/// Every source with its retained record count, sorted by name.
pub fn source_overview(inventory: &NormalizedInventory) -> Vec<SourceOverview> {
    inventory
        .groups
        .iter()
        .map(|(source, records)| SourceOverview {
            source: source.clone(),
            record_count: records.len(),
        })
        .collect()
}

/// Detail-view filter: the needle must occur in the specification
/// (case-insensitive) or the sequence label.
pub fn filter_source<'a>(records: &'a [InventoryRecord], needle: &str) -> Vec<&'a InventoryRecord> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|record| {
            record.specification.to_lowercase().contains(&needle)
                || record
                    .sequence
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
        })
        .collect()
}
