//! Inventory Processing Module
//!
//! Decoding, normalization, export and querying of spreadsheet stock data.
//! Supports CSV and Excel (XLSX/XLS) input.

pub mod export;
pub mod loader;
pub mod normalizer;
pub mod placeholder;
pub mod query;
pub mod reader;
pub mod store;

pub use export::{export_file_name, to_delimited_text, ExportScope, BYTE_ORDER_MARK, EXPORT_HEADER};
pub use loader::InventoryLoader;
pub use normalizer::{parse_quantity, ColumnLayout, InventoryNormalizer, NormalizerConfig};
pub use placeholder::placeholder_tables;
pub use query::{
    category_breakdown, filter_source, rank_by_quantity, search, source_overview, CategoryTotal,
    SourceOverview, DEFAULT_RANKING_LIMIT, TOP_CHART_LIMIT,
};
pub use reader::{SourceFormat, WorkbookReader};
pub use store::{CommitOutcome, DataOrigin, InventoryStore, LoadTicket, Snapshot};
