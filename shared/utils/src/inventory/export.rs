//! Delimited-text export of inventory records.

use stockboard_models::InventoryRecord;

use crate::error::{StockboardError, StockboardResult};

/// UTF-8 byte-order mark so spreadsheet applications pick the right encoding.
pub const BYTE_ORDER_MARK: char = '\u{FEFF}';

pub const EXPORT_HEADER: [&str; 6] = [
    "sequence",
    "category",
    "specification",
    "material",
    "quantity",
    "unit",
];

/// What an export covers; decides the download file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope<'a> {
    All,
    Source(&'a str),
}

pub fn export_file_name(scope: ExportScope<'_>) -> String {
    match scope {
        ExportScope::All => "inventory-export.csv".to_string(),
        ExportScope::Source(source) => {
            let safe: String = source
                .chars()
                .map(|c| match c {
                    '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                    c if c.is_control() => '_',
                    c => c,
                })
                .collect();
            format!("{}-inventory.csv", safe.trim())
        }
    }
}

/// Render records as comma-separated text, one line per record, prefixed by
/// the byte-order mark and the fixed header.
pub fn to_delimited_text(records: &[InventoryRecord]) -> StockboardResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER)?;
    for record in records {
        let quantity = record.quantity.to_string();
        writer.write_record([
            record.sequence.as_deref().unwrap_or(""),
            record.category.as_str(),
            record.specification.as_str(),
            record.material.as_deref().unwrap_or(""),
            quantity.as_str(),
            record.unit.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StockboardError::internal(format!("Failed to flush export: {}", e)))?;
    let body = String::from_utf8(bytes)
        .map_err(|e| StockboardError::internal(format!("Export is not UTF-8: {}", e)))?;

    let mut text = String::with_capacity(body.len() + BYTE_ORDER_MARK.len_utf8());
    text.push(BYTE_ORDER_MARK);
    text.push_str(&body);
    Ok(text)
}
