//! # Stockboard Core Domain Models
//!
//! Data types shared by the normalization core and the inventory service.
//! All models implement serialization/deserialization with serde.
//!
//! ## Key Models
//!
//! - **RawTable / RawRow**: spreadsheet data before normalization
//! - **ColumnRef**: positional or named reference to a column
//! - **InventoryRecord**: one normalized stock row
//! - **AggregateSummary**: totals derived from the in-stock records of a load
//! - **NormalizedInventory**: grouped records, flat records and summary

pub mod inventory;
pub mod table;


pub use inventory::*;
pub use table::*;
