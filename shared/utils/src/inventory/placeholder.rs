//! Placeholder dataset served when no real stock file can be loaded.
//!
//! The tables follow the stock workbook layout (four header rows, then
//! sequence, category, specification, material, two blank columns, stock and
//! unit) so they go through the same normalizer as real data.

use stockboard_models::{RawRow, RawTable};

const FAMILIES: &[(&str, &str, &[&str], &[&str])] = &[
    ("六角螺栓", "Bolt", &["M6x20", "M8x25", "M10x30", "M12x40", "M16x50"], &["Steel", "Stainless"]),
    ("六角螺母", "Nut", &["M6", "M8", "M10", "M12"], &["Steel", "Brass"]),
    ("平垫圈", "Washer", &["W6", "W8", "W10"], &["Zinc", "Stainless"]),
    ("自攻螺钉", "Screw", &["ST3.5x16", "ST4.2x19", "ST4.8x25"], &["Steel"]),
];

fn header_rows() -> Vec<RawRow> {
    vec![
        RawRow::from(vec!["Stock list"]),
        RawRow::from(vec![""]),
        RawRow::from(vec!["Updated", "placeholder"]),
        RawRow::from(vec!["No.", "Type", "Specification", "Material", "", "Unit", "Stock", "Reserve"]),
    ]
}

/// Deterministic stock quantity. The fifth item of a family is out of stock
/// and the third one sits below a thousand.
fn quantity_for(family: usize, item: usize) -> u64 {
    let seed = (family as u64 + 1) * 7919 + (item as u64 + 1) * 104_729;
    match item % 5 {
        4 => 0,
        n if n % 3 == 2 => seed % 900 + 10,
        _ => seed % 20_000 + 1_000,
    }
}

/// Build the placeholder workbook, including a summary sheet and blank rows
/// that normalization is expected to drop.
pub fn placeholder_tables() -> Vec<RawTable> {
    let mut tables = Vec::with_capacity(FAMILIES.len() + 1);

    for (family_index, (sheet, category, specs, materials)) in FAMILIES.iter().enumerate() {
        let mut rows = header_rows();
        for (item_index, spec) in specs.iter().enumerate() {
            let material = materials[item_index % materials.len()];
            let quantity = quantity_for(family_index, item_index).to_string();
            rows.push(RawRow::from(vec![
                (item_index + 1).to_string(),
                category.to_string(),
                spec.to_string(),
                material.to_string(),
                String::new(),
                "pcs".to_string(),
                quantity,
            ]));
        }
        rows.push(RawRow::from(vec!["", "", "", "", "", "", ""]));
        tables.push(RawTable::new(*sheet, rows));
    }

    let mut summary = header_rows();
    summary.push(RawRow::from(vec!["1", "All", "Total", "", "", "pcs", "999999"]));
    tables.push(RawTable::new("总汇", summary));

    tables
}
